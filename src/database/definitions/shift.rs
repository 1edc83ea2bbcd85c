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
use crate::schedule::week::Week;
use chrono::{DateTime, Utc};
use shiftboard_codegen::DataWriter;

/// One week of work at one building.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Getters, DataWriter)]
#[serde(rename_all = "camelCase")]
#[writer(table = "shift", impl_full_request)]
#[get = "pub"]
pub struct Shift {
    #[writer(skip)]
    id: Id,
    building_id: Id,
    week: Week,
    #[writer(full = "crate::database::now")]
    created_at: DateTime<Utc>,
}

impl Record for Shift {
    const TABLE: &'static str = "shift";
}

impl Shift {
    #[instrument(skip(connection))]
    pub async fn in_week(week: &Week, connection: &DatabaseConnection) -> Result<Vec<Shift>> {
        Ok(sql_span!(
            connection
                .query("SELECT * FROM shift WHERE week = $week")
                .bind(("week", week))
                .await?
                .check()?
                .take(0)?,
            "shifts in week"
        ))
    }

    #[instrument(skip(connection))]
    pub async fn find(
        building: &Id,
        week: &Week,
        connection: &DatabaseConnection,
    ) -> Result<Option<Shift>> {
        let shifts: Vec<Shift> = sql_span!(
            connection
                .query("SELECT * FROM shift WHERE buildingId = $building AND week = $week LIMIT 1")
                .bind(("building", building.to_string()))
                .bind(("week", week))
                .await?
                .check()?
                .take(0)?,
            "shift by building and week"
        );

        Ok(shifts.into_iter().next())
    }

    /// Shifts of the given buildings ordered by week, optionally restricted to one week.
    #[instrument(skip(connection))]
    pub async fn of_buildings(
        buildings: &[Id],
        week: Option<&Week>,
        connection: &DatabaseConnection,
    ) -> Result<Vec<Shift>> {
        if buildings.is_empty() {
            return Ok(Vec::new());
        }
        let keys = buildings.iter().map(Id::to_string).collect::<Vec<String>>();

        let query = match week {
            Some(_) => "SELECT * FROM shift WHERE buildingId IN $buildings AND week = $week ORDER BY week ASC",
            None => "SELECT * FROM shift WHERE buildingId IN $buildings ORDER BY week ASC",
        };

        Ok(sql_span!(
            connection
                .query(query)
                .bind(("buildings", keys))
                .bind(("week", week))
                .await?
                .check()?
                .take(0)?,
            "shifts of buildings"
        ))
    }

    #[instrument(skip(connection))]
    pub async fn list(week: Option<&Week>, connection: &DatabaseConnection) -> Result<Vec<Shift>> {
        match week {
            Some(week) => Shift::in_week(week, connection).await,
            None => {
                crate::database::definitions::fetch_all("week ASC", connection).await
            }
        }
    }
}
