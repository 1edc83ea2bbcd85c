/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::database::definitions::Record;
use crate::prelude::*;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};
use chrono::{DateTime, Utc};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use validator::Validate;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Getters)]
#[serde(rename_all = "camelCase")]
#[get = "pub"]
pub struct User {
    id: Id,
    username: String,
    full_name: String,
    email: Option<String>,
    #[serde(skip_serializing, default)]
    password: String,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    is_manager: bool,
    #[serde(default)]
    is_inspector: bool,
    created_at: DateTime<Utc>,
}

impl Record for User {
    const TABLE: &'static str = "account";
}

/// The public part of a user, as embedded into schedules and requests.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Id,
    pub username: String,
    pub full_name: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

impl User {
    #[instrument(skip(connection))]
    pub async fn from_username(
        username: &str,
        connection: &DatabaseConnection,
    ) -> Result<Option<User>> {
        let users: Vec<User> = sql_span!(
            connection
                .query("SELECT * FROM account WHERE username = $username LIMIT 1")
                .bind(("username", username))
                .await?
                .check()?
                .take(0)?,
            "user by username"
        );

        Ok(users.into_iter().next())
    }

    /// All users flagged as inspector, ordered by name.
    #[instrument(skip_all)]
    pub async fn inspectors(connection: &DatabaseConnection) -> Result<Vec<User>> {
        Ok(sql_span!(
            connection
                .query("SELECT * FROM account WHERE isInspector = true ORDER BY fullName ASC")
                .await?
                .check()?
                .take(0)?,
            "inspectors"
        ))
    }

    #[instrument(skip_all)]
    pub async fn has_admin(connection: &DatabaseConnection) -> Result<bool> {
        let admins: Vec<User> = sql_span!(
            connection
                .query("SELECT * FROM account WHERE isAdmin = true LIMIT 1")
                .await?
                .check()?
                .take(0)?,
            "admins"
        );

        Ok(!admins.is_empty())
    }
}

#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 64, message = "username must have 3 to 64 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "fullName must not be empty"))]
    pub full_name: String,
    #[validate(email(message = "email is invalid"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "password must have at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_manager: bool,
    #[serde(default)]
    pub is_inspector: bool,
}

#[derive(Deserialize, Debug, Clone, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditUserRequest {
    #[validate(length(min = 1, message = "fullName must not be empty"))]
    pub full_name: Option<String>,
    #[validate(email(message = "email is invalid"))]
    pub email: Option<String>,
    pub is_admin: Option<bool>,
    pub is_manager: Option<bool>,
    pub is_inspector: Option<bool>,
}

#[derive(Clone, Debug, Serialize, Setters)]
#[serde(rename_all = "camelCase")]
pub struct WriteAccount<'a> {
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<String>,
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    is_admin: Option<bool>,
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    is_manager: Option<bool>,
    #[set = "pub"]
    #[serde(skip_serializing_if = "Option::is_none")]
    is_inspector: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    connection: &'a DatabaseConnection,
    #[serde(skip)]
    #[set = "pub"]
    target: Option<&'a Id>,
}

impl<'a> From<&'a DatabaseConnection> for WriteAccount<'a> {
    fn from(connection: &'a DatabaseConnection) -> Self {
        Self {
            username: None,
            full_name: None,
            email: None,
            password: None,
            is_admin: None,
            is_manager: None,
            is_inspector: None,
            created_at: None,
            connection,
            target: None,
        }
    }
}

impl<'a> WriteAccount<'a> {
    pub fn with_request(&mut self, request: CreateUserRequest) -> &mut Self {
        self.username = Some(request.username);
        self.full_name = Some(request.full_name);
        self.email = request.email;
        self.password = Some(request.password);
        self.is_admin = Some(request.is_admin);
        self.is_manager = Some(request.is_manager);
        self.is_inspector = Some(request.is_inspector);

        self
    }

    pub fn with_edit(&mut self, request: EditUserRequest) -> &mut Self {
        self.full_name = request.full_name;
        self.email = request.email;
        self.is_admin = request.is_admin;
        self.is_manager = request.is_manager;
        self.is_inspector = request.is_inspector;

        self
    }
}

impl<'a> IntoFuture for WriteAccount<'a> {
    type Output = Result<User>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    fn into_future(mut self) -> Self::IntoFuture {
        Box::pin(async move {
            // only the phc string of the password is stored
            if let Some(password) = self.password {
                let hash = Argon2::default()
                    .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))?
                    .to_string();
                self.password = Some(hash);
            }

            let connection = self.connection;
            let account: Option<User> = if let Some(target) = self.target {
                sql_span!(
                    connection.update(target.to_thing()).merge(self).await?,
                    "update account"
                )
            } else {
                // usernames are unique, report it before the index does
                if let Some(username) = self.username.as_deref() {
                    if User::from_username(username, connection).await?.is_some() {
                        return Err(ApplicationError::Conflict(format!(
                            "username {username} is already taken"
                        )));
                    }
                }
                self.created_at = Some(crate::database::now());

                sql_span!(
                    connection
                        .create(User::TABLE)
                        .content(self)
                        .await?
                        .into_iter()
                        .next(),
                    "create account"
                )
            };

            account.ok_or_else(|| ApplicationError::NotFound("account not found".to_owned()))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::Authenticate;
    use crate::database::definitions::account::{User, WriteAccount};
    use crate::prelude::*;
    use axum::BoxError;

    #[tokio::test]
    async fn test_write() -> std::result::Result<(), BoxError> {
        let connection = crate::database::connect(&Config::default()).await?;

        let account = WriteAccount::from(&connection)
            .set_username(Some("jdoe".to_owned()))
            .set_full_name(Some("Jane Doe".to_owned()))
            .set_email(Some("jane@example.com".to_owned()))
            .set_password(Some("password".to_owned()))
            .set_is_inspector(Some(true))
            .to_owned()
            .await?;

        assert_eq!(account.username(), "jdoe");
        assert_eq!(account.full_name(), "Jane Doe");
        assert!(*account.is_inspector());
        assert!(!*account.is_admin());
        assert_ne!(account.password(), "password");
        assert!(account.verify_password("password").is_ok());

        // the hash never leaves the service
        let serialized = serde_json::to_value(&account)?;
        assert!(serialized.get("password").is_none());

        let duplicate = WriteAccount::from(&connection)
            .set_username(Some("jdoe".to_owned()))
            .set_full_name(Some("John Doe".to_owned()))
            .set_password(Some("password".to_owned()))
            .to_owned()
            .await;
        assert!(matches!(duplicate, Err(ApplicationError::Conflict(_))));

        let updated = WriteAccount::from(&connection)
            .set_target(Some(account.id()))
            .set_is_manager(Some(true))
            .to_owned()
            .await?;
        assert!(*updated.is_manager());
        assert!(*updated.is_inspector());
        assert_eq!(account.password(), updated.password());

        let fetched = User::from_username("jdoe", &connection).await?;
        assert_eq!(Some(updated), fetched);
        assert_eq!(1, User::inspectors(&connection).await?.len());
        assert!(!User::has_admin(&connection).await?);

        Ok(())
    }
}
