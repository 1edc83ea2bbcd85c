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

/// Links the shift of a week to a role and the group fulfilling it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Getters)]
#[serde(rename_all = "camelCase")]
#[get = "pub"]
pub struct TaskAssignment {
    id: Id,
    shift_id: Id,
    role_id: Id,
    inspector_group_id: Id,
}

impl Record for TaskAssignment {
    const TABLE: &'static str = "task_assignment";
}

impl TaskAssignment {
    /// Creates the assignment, `Conflict` if the shift already has one for the role.
    #[instrument(skip(connection))]
    pub async fn create(
        shift: &Id,
        role: &Id,
        group: &Id,
        connection: &DatabaseConnection,
    ) -> Result<TaskAssignment> {
        if TaskAssignment::find(shift, role, connection).await?.is_some() {
            return Err(ApplicationError::Conflict(format!(
                "{shift} already has an assignment for {role}"
            )));
        }

        let created: Vec<TaskAssignment> = sql_span!(
            connection
                .create(TaskAssignment::TABLE)
                .content(json!({
                    "shiftId": shift,
                    "roleId": role,
                    "inspectorGroupId": group,
                }))
                .await?,
            "create task assignment"
        );

        created
            .into_iter()
            .next()
            .ok_or(ApplicationError::InternalServerError)
    }

    #[instrument(skip(connection))]
    pub async fn find(
        shift: &Id,
        role: &Id,
        connection: &DatabaseConnection,
    ) -> Result<Option<TaskAssignment>> {
        let found: Vec<TaskAssignment> = sql_span!(
            connection
                .query("SELECT * FROM task_assignment WHERE shiftId = $shift AND roleId = $role LIMIT 1")
                .bind(("shift", shift.to_string()))
                .bind(("role", role.to_string()))
                .await?
                .check()?
                .take(0)?,
            "task assignment by shift and role"
        );

        Ok(found.into_iter().next())
    }

    #[instrument(skip(connection))]
    pub async fn of_shifts(
        shifts: &[Id],
        connection: &DatabaseConnection,
    ) -> Result<Vec<TaskAssignment>> {
        fetch_referencing("shiftId", shifts, connection).await
    }

    #[instrument(skip(connection))]
    pub async fn of_groups(
        groups: &[Id],
        connection: &DatabaseConnection,
    ) -> Result<Vec<TaskAssignment>> {
        fetch_referencing("inspectorGroupId", groups, connection).await
    }

    /// Deletes the assignment together with its group, shift days and shift inspectors.
    #[instrument(skip(connection))]
    pub async fn remove_cascade(&self, connection: &DatabaseConnection) -> Result<()> {
        let group = self.inspector_group_id.to_string();

        sql_span!(
            connection
                .query("BEGIN TRANSACTION")
                .query("DELETE shift_inspector WHERE inspectorGroupId = $group")
                .query("DELETE shift_day WHERE inspectorGroupId = $group")
                .query("DELETE $group_thing")
                .query("DELETE $assignment")
                .query("COMMIT TRANSACTION")
                .bind(("group", group))
                .bind(("group_thing", self.inspector_group_id.to_thing()))
                .bind(("assignment", self.id.to_thing()))
                .await?
                .check()?,
            "delete task assignment"
        );

        Ok(())
    }
}
