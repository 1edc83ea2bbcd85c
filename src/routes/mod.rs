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

use crate::auth::middleware::require_session;
use crate::prelude::*;
use crate::schedule::week::Week;
use axum::{middleware, Router};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod building;
pub mod extractor;
pub mod notification;
pub mod request;
pub mod shift;
pub mod task;

pub fn router(state: ApplicationState) -> Router {
    let protected = Router::new()
        .merge(auth::protected_router())
        .nest("/admin", admin::router())
        .nest("/buildings", building::router())
        .nest("/shifts", shift::router())
        .nest("/requests", request::router())
        .nest("/tasks", task::router())
        .nest("/notifications", notification::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .nest("/api", auth::public_router().merge(protected))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new().gzip(true))
        .with_state(state)
}

/// `?week=YYYY-WW`, parsed by hand so a malformed week is reported like every other bad input.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct WeekQuery {
    week: Option<String>,
}

impl WeekQuery {
    pub fn week(&self) -> Result<Option<Week>> {
        self.week.as_deref().map(str::parse).transpose()
    }
}

/// Parses a path segment as id of the given table.
pub fn path_id(table: &str, raw: &str) -> Result<Id> {
    Id::try_from((table, raw))
}
