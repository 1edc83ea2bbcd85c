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

use crate::database::definitions::account::User;
use crate::prelude::*;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

/// The authenticated user of a request, handed to every handler as an explicit argument.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: Id,
    pub username: String,
    pub full_name: String,
    pub is_admin: bool,
    pub is_manager: bool,
    pub is_inspector: bool,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().clone(),
            username: user.username().clone(),
            full_name: user.full_name().clone(),
            is_admin: *user.is_admin(),
            is_manager: *user.is_manager(),
            is_inspector: *user.is_inspector(),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApplicationError;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(ApplicationError::Unauthorized)
    }
}

pub trait Authorize {
    fn require_admin(&self) -> Result<()>;
    fn require_non_admin(&self) -> Result<()>;
}

impl Authorize for Principal {
    fn require_admin(&self) -> Result<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(ApplicationError::Forbidden(
                "administrator privileges required".to_owned(),
            ))
        }
    }

    fn require_non_admin(&self) -> Result<()> {
        if self.is_admin {
            Err(ApplicationError::Forbidden(
                "administrators can not file requests".to_owned(),
            ))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(is_admin: bool) -> Principal {
        Principal {
            id: Id::new(("account", "anna")),
            username: "anna".to_owned(),
            full_name: "Anna".to_owned(),
            is_admin,
            is_manager: false,
            is_inspector: true,
        }
    }

    #[test]
    fn test_roles() {
        let inspector = principal(false);
        let admin = principal(true);

        assert!(matches!(
            inspector.require_admin(),
            Err(ApplicationError::Forbidden(_))
        ));
        assert!(admin.require_admin().is_ok());
        assert!(inspector.require_non_admin().is_ok());
        assert!(admin.require_non_admin().is_err());
    }
}
