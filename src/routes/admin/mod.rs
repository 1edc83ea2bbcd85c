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

use crate::prelude::*;
use axum::Router;

pub mod building;
pub mod reference;
pub mod request;
pub mod shift;
pub mod task;
pub mod user;

/// Every handler below checks the principal itself, request reviews are open to managers too.
pub fn router() -> Router<ApplicationState> {
    Router::new()
        .merge(user::router())
        .merge(building::router())
        .merge(reference::router())
        .merge(shift::router())
        .merge(request::router())
        .merge(task::router())
}
