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

use crate::database::definitions::account::{CreateUserRequest, EditUserRequest, User, WriteAccount};
use crate::database::definitions::{fetch, fetch_all};
use crate::prelude::*;
use crate::routes::path_id;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::Router;

pub fn router() -> Router<ApplicationState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", put(edit_user))
}

async fn list_users(
    State(state): State<ApplicationState>,
    principal: Principal,
) -> Result<Json<Vec<User>>> {
    principal.require_admin()?;

    Ok(Json(fetch_all::<User>("username ASC", state.connection()).await?))
}

async fn create_user(
    State(state): State<ApplicationState>,
    principal: Principal,
    Json(data): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    principal.require_admin()?;

    let user = WriteAccount::from(state.connection())
        .with_request(data)
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

async fn edit_user(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(data): Json<EditUserRequest>,
) -> Result<Json<User>> {
    principal.require_admin()?;
    let id = path_id(User::TABLE, id.as_str())?;
    fetch::<User>(&id, state.connection()).await?;

    let user = WriteAccount::from(state.connection())
        .set_target(Some(&id))
        .with_edit(data)
        .to_owned()
        .await?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use crate::tests::prelude::*;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_user_administration() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let admin = suite.login(ADMIN).await;
        let inspector = suite.login(INSPECTOR).await;

        let response = suite
            .client()
            .get("/api/admin/users")
            .header("cookie", inspector.as_str())
            .send()
            .await;
        assert_eq!(StatusCode::FORBIDDEN, response.status());

        let response = suite
            .client()
            .post("/api/admin/users")
            .header("cookie", admin.as_str())
            .json(&json!({
                "username": "walter",
                "fullName": "Walter",
                "password": "password",
                "isInspector": true
            }))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());
        let created = response.json::<serde_json::Value>().await;
        assert_eq!(json!(true), created["isInspector"]);

        let id = created["id"].as_str().unwrap_or_default().to_owned();
        let response = suite
            .client()
            .put(format!("/api/admin/users/{id}").as_str())
            .header("cookie", admin.as_str())
            .json(&json!({"isManager": true}))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let edited = response.json::<serde_json::Value>().await;
        assert_eq!(json!(true), edited["isManager"]);
        assert_eq!(json!(true), edited["isInspector"]);

        let response = suite
            .client()
            .put("/api/admin/users/account:nobody")
            .header("cookie", admin.as_str())
            .json(&json!({"isManager": true}))
            .send()
            .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        let response = suite
            .client()
            .get("/api/admin/users")
            .header("cookie", admin.as_str())
            .send()
            .await;
        assert_eq!(4, response.json::<Vec<serde_json::Value>>().await.len());

        Ok(())
    }
}
