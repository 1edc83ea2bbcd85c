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
use crate::prelude::*;
use crate::routes::{path_id, WeekQuery};
use crate::schedule::aggregate::{building_schedule, schedules, BuildingSchedule};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Router;

pub fn router() -> Router<ApplicationState> {
    Router::new()
        .route("/with-shifts", get(with_shifts))
        .route("/:id", get(single))
}

/// The nested schedules of every building visible to the principal.
async fn with_shifts(
    State(state): State<ApplicationState>,
    principal: Principal,
    Query(query): Query<WeekQuery>,
) -> Result<Json<Vec<BuildingSchedule>>> {
    let week = query.week()?;
    let buildings = Building::visible_to(&principal, state.connection()).await?;

    Ok(Json(
        schedules(&buildings, week.as_ref(), state.connection()).await?,
    ))
}

async fn single(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<BuildingSchedule>> {
    let id = path_id(Building::TABLE, id.as_str())?;

    Ok(Json(
        building_schedule(&id, &principal, state.connection()).await?,
    ))
}
