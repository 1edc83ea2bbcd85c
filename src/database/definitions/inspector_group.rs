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

use crate::database::definitions::{fetch_referencing, Record};
use crate::prelude::*;
use chrono::{DateTime, Utc};
use shiftboard_codegen::DataWriter;
use strum::{AsRefStr, EnumString};
use validator::Validate;

/// A named cluster of inspectors working together within one week.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Getters, DataWriter)]
#[serde(rename_all = "camelCase")]
#[writer(table = "inspector_group")]
#[get = "pub"]
pub struct InspectorGroup {
    #[writer(skip)]
    id: Id,
    name: String,
}

impl Record for InspectorGroup {
    const TABLE: &'static str = "inspector_group";
}

/// The shift type a group works on one day of its week, `None` meaning no shift that day.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Getters)]
#[serde(rename_all = "camelCase")]
#[get = "pub"]
pub struct ShiftDay {
    id: Id,
    inspector_group_id: Id,
    day_of_week: u8,
    shift_type_id: Option<Id>,
}

impl Record for ShiftDay {
    const TABLE: &'static str = "shift_day";
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    #[validate(range(max = 6, message = "dayOfWeek must be between 0 and 6"))]
    pub day_of_week: u8,
    pub shift_type_id: Option<String>,
}

impl ShiftDay {
    #[instrument(skip(connection))]
    pub async fn of_groups(groups: &[Id], connection: &DatabaseConnection) -> Result<Vec<ShiftDay>> {
        fetch_referencing("inspectorGroupId", groups, connection).await
    }

    /// Replaces the whole week plan of the group. Days must already be validated.
    #[instrument(skip(connection))]
    pub async fn replace(
        group: &Id,
        days: &[(u8, Option<Id>)],
        connection: &DatabaseConnection,
    ) -> Result<Vec<ShiftDay>> {
        sql_span!(
            connection
                .query("DELETE shift_day WHERE inspectorGroupId = $group")
                .bind(("group", group.to_string()))
                .await?
                .check()?,
            "clear shift days"
        );

        let mut created = Vec::with_capacity(days.len());
        for (day_of_week, shift_type_id) in days {
            let day: Vec<ShiftDay> = sql_span!(
                connection
                    .create(ShiftDay::TABLE)
                    .content(json!({
                        "inspectorGroupId": group,
                        "dayOfWeek": day_of_week,
                        "shiftTypeId": shift_type_id,
                    }))
                    .await?,
                "create shift day"
            );
            created.extend(day);
        }

        Ok(created)
    }
}

#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Pending,
    Accepted,
    Rejected,
}

/// Membership of one inspector in one group together with the inspector's answer.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Getters)]
#[serde(rename_all = "camelCase")]
#[get = "pub"]
pub struct ShiftInspector {
    id: Id,
    inspector_group_id: Id,
    inspector_id: Id,
    #[serde(default)]
    is_backup: bool,
    status: ResponseStatus,
    rejection_reason: Option<String>,
    response_at: Option<DateTime<Utc>>,
}

impl Record for ShiftInspector {
    const TABLE: &'static str = "shift_inspector";
}

impl ShiftInspector {
    #[instrument(skip(connection))]
    pub async fn create_pending(
        group: &Id,
        inspector: &Id,
        is_backup: bool,
        connection: &DatabaseConnection,
    ) -> Result<ShiftInspector> {
        let created: Vec<ShiftInspector> = sql_span!(
            connection
                .create(ShiftInspector::TABLE)
                .content(json!({
                    "inspectorGroupId": group,
                    "inspectorId": inspector,
                    "isBackup": is_backup,
                    "status": ResponseStatus::Pending,
                }))
                .await?,
            "create shift inspector"
        );

        created
            .into_iter()
            .next()
            .ok_or(ApplicationError::InternalServerError)
    }

    #[instrument(skip(connection))]
    pub async fn of_groups(
        groups: &[Id],
        connection: &DatabaseConnection,
    ) -> Result<Vec<ShiftInspector>> {
        fetch_referencing("inspectorGroupId", groups, connection).await
    }

    #[instrument(skip(connection))]
    pub async fn of_inspector(
        inspector: &Id,
        connection: &DatabaseConnection,
    ) -> Result<Vec<ShiftInspector>> {
        fetch_referencing("inspectorId", std::slice::from_ref(inspector), connection).await
    }

    /// Drops the rows of the given inspectors from the group.
    #[instrument(skip(connection))]
    pub async fn remove_from_group(
        group: &Id,
        inspectors: &[Id],
        connection: &DatabaseConnection,
    ) -> Result<()> {
        if inspectors.is_empty() {
            return Ok(());
        }
        let keys = inspectors.iter().map(Id::to_string).collect::<Vec<String>>();

        sql_span!(
            connection
                .query("DELETE shift_inspector WHERE inspectorGroupId = $group AND inspectorId IN $inspectors")
                .bind(("group", group.to_string()))
                .bind(("inspectors", keys))
                .await?
                .check()?,
            "remove shift inspectors"
        );

        Ok(())
    }

    /// Switches the backup flag of members which stay in the group with another role.
    #[instrument(skip(connection))]
    pub async fn set_backup(
        group: &Id,
        inspectors: &[Id],
        is_backup: bool,
        connection: &DatabaseConnection,
    ) -> Result<()> {
        if inspectors.is_empty() {
            return Ok(());
        }
        let keys = inspectors.iter().map(Id::to_string).collect::<Vec<String>>();

        sql_span!(
            connection
                .query("UPDATE shift_inspector SET isBackup = $backup WHERE inspectorGroupId = $group AND inspectorId IN $inspectors")
                .bind(("group", group.to_string()))
                .bind(("inspectors", keys))
                .bind(("backup", is_backup))
                .await?
                .check()?,
            "update backup flags"
        );

        Ok(())
    }
}
