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

use crate::auth::middleware::SESSION_COOKIE;
use crate::auth::Authenticate;
use crate::database::definitions::account::{CreateUserRequest, User, WriteAccount};
use crate::database::definitions::fetch;
use crate::prelude::*;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use validator::Validate;

pub fn public_router() -> Router<ApplicationState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn protected_router() -> Router<ApplicationState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64, message = "username must have 3 to 64 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "fullName must not be empty"))]
    pub full_name: String,
    #[validate(email(message = "email is invalid"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "password must have at least 8 characters"))]
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, Validate)]
pub struct LoginRequest {
    username: String,
    password: String,
}

async fn register(
    State(state): State<ApplicationState>,
    Json(data): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    // registration never grants a role
    let user = WriteAccount::from(state.connection())
        .with_request(CreateUserRequest {
            username: data.username,
            full_name: data.full_name,
            email: data.email,
            password: data.password,
            is_admin: false,
            is_manager: false,
            is_inspector: false,
        })
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(state): State<ApplicationState>,
    jar: CookieJar,
    Json(data): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Principal>)> {
    let connection = state.connection();
    let user = crate::auth::login(data.username.as_str(), data.password.as_str(), connection).await?;

    // start a new session, this ends the previous ones
    let session = user
        .start_session(*state.config().session_length(), connection)
        .await?;
    let cookie = Cookie::build(SESSION_COOKIE, session.key().to_owned())
        .path("/")
        .same_site(SameSite::Strict)
        .http_only(true)
        .secure(*state.config().secure_cookies())
        .finish();

    Ok((jar.add(cookie), Json(Principal::from(&user))))
}

async fn logout(
    State(state): State<ApplicationState>,
    principal: Principal,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    let user = fetch::<User>(&principal.id, state.connection()).await?;
    user.logout(state.connection()).await?;

    let cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();

    Ok((jar.remove(cookie), StatusCode::NO_CONTENT))
}

async fn me(principal: Principal) -> Json<Principal> {
    Json(principal)
}

#[cfg(test)]
mod tests {
    use crate::tests::prelude::*;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_register_and_login() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite
            .client()
            .post("/api/auth/register")
            .json(&json!({
                "username": "newbie",
                "fullName": "New Bie",
                "password": "password"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());
        let user = response.json::<serde_json::Value>().await;
        assert_eq!(json!(false), user["isAdmin"]);
        assert!(user.get("password").is_none());

        let response = suite
            .client()
            .post("/api/auth/register")
            .json(&json!({
                "username": "newbie",
                "fullName": "Other",
                "password": "password"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::CONFLICT, response.status());

        let response = suite
            .client()
            .post("/api/auth/register")
            .json(&json!({
                "username": "x",
                "fullName": "",
                "password": "short"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let response = suite
            .client()
            .post("/api/auth/login")
            .json(&json!({"username": "newbie", "password": "wrong-password"}))
            .send()
            .await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());

        let cookie = suite.login("newbie").await;
        let response = suite
            .client()
            .get("/api/auth/me")
            .header("cookie", cookie.as_str())
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let me = response.json::<serde_json::Value>().await;
        assert_eq!(json!("newbie"), me["username"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_session_required() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;

        let response = suite.client().get("/api/auth/me").send().await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());

        let response = suite
            .client()
            .get("/api/auth/me")
            .header("cookie", "session=invalid")
            .send()
            .await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());

        let cookie = suite.login(INSPECTOR).await;
        let response = suite
            .client()
            .post("/api/auth/logout")
            .header("cookie", cookie.as_str())
            .send()
            .await;
        assert_eq!(StatusCode::NO_CONTENT, response.status());

        let response = suite
            .client()
            .get("/api/auth/me")
            .header("cookie", cookie.as_str())
            .send()
            .await;
        assert_eq!(StatusCode::UNAUTHORIZED, response.status());

        Ok(())
    }
}
