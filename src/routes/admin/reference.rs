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

use crate::database::definitions::fetch_all;
use crate::database::definitions::role::{Role, WriteRole, WriteRoleRequest};
use crate::database::definitions::shift_type::{ShiftType, WriteShiftType, WriteShiftTypeRequest};
use crate::database::definitions::task::{TaskType, WriteTaskType, WriteTaskTypeRequest};
use crate::prelude::*;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

pub fn router() -> Router<ApplicationState> {
    Router::new()
        .route("/shift-types", get(list_shift_types).post(create_shift_type))
        .route("/roles", get(list_roles).post(create_role))
        .route("/task-types", get(list_task_types).post(create_task_type))
}

async fn list_shift_types(
    State(state): State<ApplicationState>,
    principal: Principal,
) -> Result<Json<Vec<ShiftType>>> {
    principal.require_admin()?;

    Ok(Json(
        fetch_all::<ShiftType>("startTime ASC", state.connection()).await?,
    ))
}

async fn create_shift_type(
    State(state): State<ApplicationState>,
    principal: Principal,
    Json(data): Json<WriteShiftTypeRequest>,
) -> Result<(StatusCode, Json<ShiftType>)> {
    principal.require_admin()?;
    ShiftType::check_window(&data.start_time, &data.end_time)?;

    let shift_type = WriteShiftType::from(state.connection())
        .with_request(data)
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(shift_type)))
}

async fn list_roles(
    State(state): State<ApplicationState>,
    principal: Principal,
) -> Result<Json<Vec<Role>>> {
    principal.require_admin()?;

    Ok(Json(fetch_all::<Role>("name ASC", state.connection()).await?))
}

async fn create_role(
    State(state): State<ApplicationState>,
    principal: Principal,
    Json(data): Json<WriteRoleRequest>,
) -> Result<(StatusCode, Json<Role>)> {
    principal.require_admin()?;
    if Role::from_name(data.name.as_str(), state.connection())
        .await?
        .is_some()
    {
        return Err(ApplicationError::Conflict(format!(
            "role {} already exists",
            data.name
        )));
    }

    let role = WriteRole::from(state.connection())
        .with_request(data)
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(role)))
}

async fn list_task_types(
    State(state): State<ApplicationState>,
    principal: Principal,
) -> Result<Json<Vec<TaskType>>> {
    principal.require_admin()?;

    Ok(Json(fetch_all::<TaskType>("name ASC", state.connection()).await?))
}

async fn create_task_type(
    State(state): State<ApplicationState>,
    principal: Principal,
    Json(data): Json<WriteTaskTypeRequest>,
) -> Result<(StatusCode, Json<TaskType>)> {
    principal.require_admin()?;

    let task_type = WriteTaskType::from(state.connection())
        .with_request(data)
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(task_type)))
}

#[cfg(test)]
mod tests {
    use crate::tests::prelude::*;
    use axum::http::StatusCode;
    use axum::BoxError;

    #[tokio::test]
    async fn test_shift_types() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let admin = suite.login(ADMIN).await;

        let create = |body: serde_json::Value| {
            suite
                .client()
                .post("/api/admin/shift-types")
                .header("cookie", admin.as_str())
                .json(&body)
                .send()
        };

        let response = create(json!({"name": "Morning", "startTime": "06:00:00", "endTime": "14:00:00"})).await;
        assert_eq!(StatusCode::CREATED, response.status());
        let response = create(json!({"name": "Night", "startTime": "22:00:00", "endTime": "06:00:00"})).await;
        assert_eq!(StatusCode::CREATED, response.status());
        let response = create(json!({"name": "Empty", "startTime": "08:00:00", "endTime": "08:00:00"})).await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        let response = create(json!({"name": "Broken", "startTime": "25:00:00", "endTime": "08:00:00"})).await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let response = suite
            .client()
            .get("/api/admin/shift-types")
            .header("cookie", admin.as_str())
            .send()
            .await;
        let names = response
            .json::<Vec<serde_json::Value>>()
            .await
            .into_iter()
            .map(|shift_type| shift_type["name"].as_str().unwrap_or_default().to_owned())
            .collect::<Vec<String>>();
        assert_eq!(vec!["Morning", "Night"], names);

        Ok(())
    }

    #[tokio::test]
    async fn test_unique_roles() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let admin = suite.login(ADMIN).await;

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let response = suite
                .client()
                .post("/api/admin/roles")
                .header("cookie", admin.as_str())
                .json(&json!({"name": "Lead"}))
                .send()
                .await;
            assert_eq!(expected, response.status());
        }

        let response = suite
            .client()
            .post("/api/admin/task-types")
            .header("cookie", admin.as_str())
            .json(&json!({"name": "Fire safety walk"}))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());

        Ok(())
    }
}
