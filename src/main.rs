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

#[macro_use]
extern crate serde;
#[macro_use]
extern crate thiserror;
#[macro_use]
extern crate getset;
#[macro_use]
extern crate tracing;
#[macro_use]
extern crate serde_json;
#[macro_use]
extern crate rust_i18n;

i18n!("locales");

mod auth;
mod config;
mod database;
mod error;
mod hook;
mod notify;
mod routes;
mod schedule;
mod server;
#[cfg(test)]
mod tests;
mod workflow;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    server::init()
}

pub mod prelude {
    pub use crate::auth::authz::{Authorize, Principal};
    pub use crate::config::Config;
    pub use crate::database::definitions::*;
    pub use crate::database::id::Id;
    pub use crate::database::page::{Page, PagingOptions};
    pub use crate::database::DatabaseConnection;
    pub use crate::error::*;
    pub use crate::routes::extractor::Json;
    pub use crate::server::state::ApplicationState;
    pub use crate::sql_span;
}
