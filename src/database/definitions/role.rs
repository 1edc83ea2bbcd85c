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

use crate::database::definitions::Record;
use crate::prelude::*;
use shiftboard_codegen::DataWriter;

/// The duty a group fulfils within a week, e.g. "Fire watch".
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Getters, DataWriter)]
#[serde(rename_all = "camelCase")]
#[writer(table = "role", impl_full_request)]
#[get = "pub"]
pub struct Role {
    #[writer(skip)]
    id: Id,
    #[validate(length(min = 1, message = "name must not be empty"))]
    name: String,
}

impl Record for Role {
    const TABLE: &'static str = "role";
}

impl Role {
    #[instrument(skip(connection))]
    pub async fn from_name(name: &str, connection: &DatabaseConnection) -> Result<Option<Role>> {
        let roles: Vec<Role> = sql_span!(
            connection
                .query("SELECT * FROM role WHERE name = $name LIMIT 1")
                .bind(("name", name))
                .await?
                .check()?
                .take(0)?,
            "role by name"
        );

        Ok(roles.into_iter().next())
    }
}
