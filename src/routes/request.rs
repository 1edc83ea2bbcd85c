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

use crate::database::definitions::request::{Request, RequestStatus};
use crate::database::page::PagingOptions;
use crate::prelude::*;
use crate::routes::path_id;
use crate::workflow::{self, CreateRequestBody, RequestFilter};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

pub fn router() -> Router<ApplicationState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(single))
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
struct RequestQuery {
    status: Option<RequestStatus>,
    page: Option<u64>,
    page_size: Option<u64>,
}

impl RequestQuery {
    fn split(self) -> (RequestFilter, PagingOptions) {
        let defaults = PagingOptions::default();

        (
            RequestFilter {
                status: self.status,
            },
            PagingOptions {
                page: self.page.unwrap_or(defaults.page),
                page_size: self.page_size.unwrap_or(defaults.page_size),
            },
        )
    }
}

async fn create(
    State(state): State<ApplicationState>,
    principal: Principal,
    Json(data): Json<CreateRequestBody>,
) -> Result<(StatusCode, Json<Request>)> {
    let request = workflow::create(&principal, data, state.connection()).await?;
    info!("{} filed {}", principal.username, request.id());

    Ok((StatusCode::CREATED, Json(request)))
}

async fn list(
    State(state): State<ApplicationState>,
    principal: Principal,
    Query(query): Query<RequestQuery>,
) -> Result<Json<Page<Request>>> {
    let (filter, paging) = query.split();

    Ok(Json(
        workflow::list(&principal, filter, paging, state.connection()).await?,
    ))
}

async fn single(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Request>> {
    let id = path_id(Request::TABLE, id.as_str())?;

    Ok(Json(workflow::get(&id, &principal, state.connection()).await?))
}
