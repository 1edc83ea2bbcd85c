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

use crate::notify::Notifier;
use crate::prelude::{Config, DatabaseConnection};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ApplicationState {
    connection: DatabaseConnection,
    config: Arc<Config>,
    notifier: Notifier,
}

impl ApplicationState {
    pub fn new(connection: DatabaseConnection, config: Arc<Config>, notifier: Notifier) -> Self {
        Self {
            connection,
            config,
            notifier,
        }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
