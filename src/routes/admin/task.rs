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
use crate::database::definitions::shift_type::ShiftType;
use crate::database::definitions::task::{CreateTaskRequest, EditTask, Task, TaskType, WriteTask};
use crate::database::definitions::{fetch, remove};
use crate::prelude::*;
use crate::routes::path_id;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{post, put};
use axum::Router;

pub fn router() -> Router<ApplicationState> {
    Router::new()
        .route("/tasks", post(create_task))
        .route("/tasks/:id", put(edit_task).delete(delete_task))
}

/// Every referenced record has to exist, the inspector has to be one.
async fn require_references(
    inspector: Option<&Id>,
    shift_type: Option<&Id>,
    task_type: Option<&Id>,
    assignee: Option<&Id>,
    connection: &DatabaseConnection,
) -> Result<()> {
    if let Some(inspector) = inspector {
        let user = fetch::<User>(inspector, connection).await?;
        if !*user.is_inspector() {
            return Err(ApplicationError::BadRequest(format!(
                "{inspector} is not an inspector"
            )));
        }
    }
    if let Some(shift_type) = shift_type {
        fetch::<ShiftType>(shift_type, connection).await?;
    }
    if let Some(task_type) = task_type {
        fetch::<TaskType>(task_type, connection).await?;
    }
    if let Some(assignee) = assignee {
        fetch::<User>(assignee, connection).await?;
    }

    Ok(())
}

async fn create_task(
    State(state): State<ApplicationState>,
    principal: Principal,
    Json(data): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>)> {
    principal.require_admin()?;
    let connection = state.connection();
    require_references(
        Some(&data.inspector_id),
        Some(&data.shift_type_id),
        Some(&data.task_type_id),
        data.assigned_to.as_ref(),
        connection,
    )
    .await?;

    let task = WriteTask::from(connection)
        .with_request(data)
        .to_owned()
        .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

async fn edit_task(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(data): Json<EditTask>,
) -> Result<Json<Task>> {
    principal.require_admin()?;
    let connection = state.connection();
    let id = path_id(Task::TABLE, id.as_str())?;
    fetch::<Task>(&id, connection).await?;
    require_references(
        data.inspector_id.as_ref(),
        data.shift_type_id.as_ref(),
        data.task_type_id.as_ref(),
        data.assigned_to.as_ref().and_then(Option::as_ref),
        connection,
    )
    .await?;

    let task = data
        .to_writer(connection)
        .set_target(Some(&id))
        .to_owned()
        .await?;

    Ok(Json(task))
}

async fn delete_task(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    principal.require_admin()?;
    let id = path_id(Task::TABLE, id.as_str())?;
    fetch::<Task>(&id, state.connection()).await?;
    remove(&id, state.connection()).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::task::WriteTaskType;
    use crate::tests::prelude::*;
    use axum::http::StatusCode;
    use axum::BoxError;
    use serde_json::Value;

    #[tokio::test]
    async fn test_task_administration() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let admin = suite.login(ADMIN).await;
        let morning = suite.shift_type("Morning", 6, 14).await?;
        let walk = WriteTaskType::from(suite.connection())
            .set_name(Some("Walk".to_owned()))
            .to_owned()
            .await?;

        let create = |inspector: Value| {
            suite
                .client()
                .post("/api/admin/tasks")
                .header("cookie", admin.as_str())
                .json(&json!({
                    "inspectorId": inspector,
                    "shiftTypeId": morning.id(),
                    "taskTypeId": walk.id(),
                    "date": "2025-03-12"
                }))
                .send()
        };

        assert_eq!(
            StatusCode::BAD_REQUEST,
            create(json!(suite.manager().id())).await.status()
        );
        assert_eq!(StatusCode::NOT_FOUND, create(json!("account:ghost")).await.status());

        let response = create(json!(suite.inspector().id())).await;
        assert_eq!(StatusCode::CREATED, response.status());
        let task = response.json::<Value>().await;
        assert_eq!(json!("PENDING"), task["status"]);
        assert_eq!(json!(false), task["isFollowupNeeded"]);
        let id = task["id"].as_str().unwrap_or_default();

        let response = suite
            .client()
            .put(format!("/api/admin/tasks/{id}").as_str())
            .header("cookie", admin.as_str())
            .json(&json!({"assignedTo": suite.manager().id(), "notes": "Check exits"}))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let edited = response.json::<Value>().await;
        assert_eq!(json!(suite.manager().id()), edited["assignedTo"]);
        assert_eq!(task["date"], edited["date"]);

        let response = suite
            .client()
            .delete(format!("/api/admin/tasks/{id}").as_str())
            .header("cookie", admin.as_str())
            .send()
            .await;
        assert_eq!(StatusCode::NO_CONTENT, response.status());
        let response = suite
            .client()
            .delete(format!("/api/admin/tasks/{id}").as_str())
            .header("cookie", admin.as_str())
            .send()
            .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        Ok(())
    }
}
