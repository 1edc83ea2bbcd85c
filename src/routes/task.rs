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

use crate::database::definitions::task::{Task, TaskStatusRequest, WriteTask};
use crate::database::definitions::fetch;
use crate::database::page::PagingOptions;
use crate::prelude::*;
use crate::routes::path_id;
use axum::extract::{Path, Query, State};
use axum::routing::{get, put};
use axum::Router;

pub fn router() -> Router<ApplicationState> {
    Router::new()
        .route("/", get(list))
        .route("/:id/status", put(update_status))
}

/// Admins see every task, everybody else the ones they work on.
async fn list(
    State(state): State<ApplicationState>,
    principal: Principal,
    Query(paging): Query<PagingOptions>,
) -> Result<Json<Page<Task>>> {
    let bindings = [("principal", json!(principal.id))];
    let condition = (!principal.is_admin).then_some("inspectorId = $principal OR assignedTo = $principal");

    Ok(Json(
        paging
            .execute::<Task>(Task::TABLE, condition, "date DESC", &bindings, state.connection())
            .await?,
    ))
}

async fn update_status(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(data): Json<TaskStatusRequest>,
) -> Result<Json<Task>> {
    let connection = state.connection();
    let id = path_id(Task::TABLE, id.as_str())?;
    let task = fetch::<Task>(&id, connection).await?;
    if !task.involves(&principal.id) {
        return Err(ApplicationError::Forbidden(
            "only the inspector and the assignee can update the task".to_owned(),
        ));
    }

    let task = WriteTask::from(connection)
        .set_target(Some(&id))
        .set_status(Some(data.status))
        .set_is_followup_needed(data.is_followup_needed)
        .to_owned()
        .await?;

    Ok(Json(task))
}
