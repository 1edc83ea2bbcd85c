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

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Getters, DataWriter)]
#[serde(rename_all = "camelCase")]
#[writer(table = "building", impl_full_request)]
#[get = "pub"]
pub struct Building {
    #[writer(skip)]
    id: Id,
    #[writer(editable)]
    #[validate(length(min = 1, message = "name must not be empty"))]
    name: String,
    #[writer(editable)]
    #[validate(length(min = 1, max = 16, message = "code must have 1 to 16 characters"))]
    code: String,
    #[writer(editable)]
    area: Option<String>,
    #[writer(editable)]
    supervisor_id: Option<Id>,
}

impl Record for Building {
    const TABLE: &'static str = "building";
}

impl Building {
    /// Admins see every building, everybody else only the ones they supervise.
    pub fn is_visible_to(&self, principal: &Principal) -> bool {
        principal.is_admin || self.supervisor_id.as_ref().eq(&Some(&principal.id))
    }

    #[instrument(skip(connection))]
    pub async fn visible_to(
        principal: &Principal,
        connection: &DatabaseConnection,
    ) -> Result<Vec<Building>> {
        let buildings: Vec<Building> = if principal.is_admin {
            crate::database::definitions::fetch_all("name ASC", connection).await?
        } else {
            sql_span!(
                connection
                    .query("SELECT * FROM building WHERE supervisorId = $supervisor ORDER BY name ASC")
                    .bind(("supervisor", principal.id.to_string()))
                    .await?
                    .check()?
                    .take(0)?,
                "supervised buildings"
            )
        };

        Ok(buildings)
    }

    #[instrument(skip(connection))]
    pub async fn from_code(code: &str, connection: &DatabaseConnection) -> Result<Option<Building>> {
        let buildings: Vec<Building> = sql_span!(
            connection
                .query("SELECT * FROM building WHERE code = $code LIMIT 1")
                .bind(("code", code))
                .await?
                .check()?
                .take(0)?,
            "building by code"
        );

        Ok(buildings.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::building::{Building, WriteBuilding};
    use crate::prelude::*;
    use axum::BoxError;

    fn principal(id: &str, is_admin: bool) -> Principal {
        Principal {
            id: Id::new(("account", id)),
            username: id.to_owned(),
            full_name: id.to_owned(),
            is_admin,
            is_manager: false,
            is_inspector: false,
        }
    }

    #[tokio::test]
    async fn test_visibility() -> std::result::Result<(), BoxError> {
        let connection = crate::database::connect(&Config::default()).await?;
        let supervisor = principal("supervisor", false);

        let north = WriteBuilding::from(&connection)
            .set_name(Some("North".to_owned()))
            .set_code(Some("N".to_owned()))
            .set_supervisor_id(Some(Some(supervisor.id.clone())))
            .to_owned()
            .await?;
        WriteBuilding::from(&connection)
            .set_name(Some("South".to_owned()))
            .set_code(Some("S".to_owned()))
            .set_area(Some(Some("Harbour".to_owned())))
            .to_owned()
            .await?;

        let admin = Building::visible_to(&principal("admin", true), &connection).await?;
        assert_eq!(2, admin.len());
        assert_eq!("North", admin[0].name());

        let supervised = Building::visible_to(&supervisor, &connection).await?;
        assert_eq!(vec![north.clone()], supervised);
        assert!(north.is_visible_to(&supervisor));
        assert!(!north.is_visible_to(&principal("other", false)));

        let empty = Building::visible_to(&principal("other", false), &connection).await?;
        assert!(empty.is_empty());

        assert_eq!(Some(north), Building::from_code("N", &connection).await?);

        Ok(())
    }
}
