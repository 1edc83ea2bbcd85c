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

use crate::database::definitions::building::Building;
use crate::database::definitions::role::Role;
use crate::database::definitions::shift::{Shift, WriteShift, WriteShiftRequest};
use crate::database::definitions::shift_type::ShiftType;
use crate::database::definitions::task_assignment::TaskAssignment;
use crate::database::definitions::inspector_group::InspectorGroup;
use crate::database::definitions::fetch;
use crate::prelude::*;
use crate::routes::{path_id, WeekQuery};
use crate::schedule::aggregate::{assignment_summary, TaskAssignmentSummary};
use crate::schedule::availability::{availability, InspectorAvailability};
use crate::schedule::compose::{self, ComposeGroupRequest, Composition, EditGroupRequest};
use crate::schedule::week::Week;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::Router;

pub fn router() -> Router<ApplicationState> {
    Router::new()
        .route("/shifts", get(list_shifts).post(create_shift))
        .route("/shifts/inspectors/availability", get(inspector_availability))
        .route("/shifts/:shift_id/assignments", post(compose_group))
        .route("/inspector-groups/:id", put(edit_group))
        .route("/task-assignments/:id", delete(dissolve_assignment))
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct AvailabilityQuery {
    shift_type_id: Option<String>,
    week: Option<String>,
}

async fn list_shifts(
    State(state): State<ApplicationState>,
    principal: Principal,
    Query(query): Query<WeekQuery>,
) -> Result<Json<Vec<Shift>>> {
    principal.require_admin()?;

    Ok(Json(
        Shift::list(query.week()?.as_ref(), state.connection()).await?,
    ))
}

async fn create_shift(
    State(state): State<ApplicationState>,
    principal: Principal,
    Json(data): Json<WriteShiftRequest>,
) -> Result<(StatusCode, Json<Shift>)> {
    principal.require_admin()?;
    let connection = state.connection();
    fetch::<Building>(&data.building_id, connection).await?;
    if Shift::find(&data.building_id, &data.week, connection)
        .await?
        .is_some()
    {
        return Err(ApplicationError::Conflict(format!(
            "{} already has a shift in week {}",
            data.building_id, data.week
        )));
    }

    let shift = WriteShift::from(connection)
        .with_request(data)
        .to_owned()
        .await?;
    info!("Created {} for week {}", shift.id(), shift.week());

    Ok((StatusCode::CREATED, Json(shift)))
}

async fn inspector_availability(
    State(state): State<ApplicationState>,
    principal: Principal,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<InspectorAvailability>>> {
    principal.require_admin()?;
    let (Some(shift_type), Some(week)) = (query.shift_type_id, query.week) else {
        return Err(ApplicationError::BadRequest(
            "shiftTypeId and week are required".to_owned(),
        ));
    };
    let shift_type = path_id(ShiftType::TABLE, shift_type.as_str())?;
    let week = week.parse::<Week>()?;

    Ok(Json(
        availability(&shift_type, &week, state.connection()).await?,
    ))
}

/// Tells every newly added inspector about the assignment. The composition is stored already,
/// so a failure here only ends up in the log.
async fn announce(composition: &Composition, state: &ApplicationState) {
    if let Err(error) = notify_added(composition, state).await {
        error!(
            "Failed to announce {} to its inspectors: {}",
            composition.assignment.id(),
            error
        );
    }
}

async fn notify_added(composition: &Composition, state: &ApplicationState) -> Result<()> {
    if composition.added.is_empty() {
        return Ok(());
    }
    let connection = state.connection();
    let building = fetch::<Building>(composition.shift.building_id(), connection).await?;
    let role = fetch::<Role>(composition.assignment.role_id(), connection).await?;
    let week = composition.shift.week().to_string();

    for inspector in composition.added.iter() {
        state.notifier().shift_assignment(
            inspector.clone(),
            building.name(),
            week.as_str(),
            role.name(),
        );
    }

    Ok(())
}

async fn compose_group(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(shift_id): Path<String>,
    Json(data): Json<ComposeGroupRequest>,
) -> Result<(StatusCode, Json<TaskAssignmentSummary>)> {
    principal.require_admin()?;
    let shift = path_id(Shift::TABLE, shift_id.as_str())?;

    let composition = compose::compose(&shift, data, state.connection()).await?;
    announce(&composition, &state).await;
    let summary = assignment_summary(composition.assignment.id(), state.connection()).await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

async fn edit_group(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(data): Json<EditGroupRequest>,
) -> Result<Json<TaskAssignmentSummary>> {
    principal.require_admin()?;
    let group = path_id(InspectorGroup::TABLE, id.as_str())?;

    let composition = compose::edit(&group, data, state.connection()).await?;
    announce(&composition, &state).await;

    Ok(Json(
        assignment_summary(composition.assignment.id(), state.connection()).await?,
    ))
}

async fn dissolve_assignment(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    principal.require_admin()?;
    let assignment = path_id(TaskAssignment::TABLE, id.as_str())?;
    compose::dissolve(&assignment, state.connection()).await?;

    Ok(StatusCode::NO_CONTENT)
}
