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

use crate::database::definitions::fetch;
use crate::database::definitions::inspector_group::{ResponseStatus, ShiftInspector};
use crate::database::definitions::shift::Shift;
use crate::database::definitions::task_assignment::TaskAssignment;
use crate::prelude::*;
use validator::Validate;

#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShiftResponseRequest {
    pub status: ResponseStatus,
    #[validate(length(max = 1000, message = "rejectionReason must not exceed 1000 characters"))]
    pub rejection_reason: Option<String>,
}

impl ShiftResponseRequest {
    /// The target status and the reason to store. A rejection needs a reason, an acceptance
    /// drops it.
    pub fn decision(&self) -> Result<(ResponseStatus, Option<String>)> {
        match self.status {
            ResponseStatus::Pending => Err(ApplicationError::BadRequest(
                "status must be ACCEPTED or REJECTED".to_owned(),
            )),
            ResponseStatus::Accepted => Ok((ResponseStatus::Accepted, None)),
            ResponseStatus::Rejected => {
                let reason = self
                    .rejection_reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|reason| !reason.is_empty())
                    .ok_or_else(|| {
                        ApplicationError::BadRequest(
                            "rejectionReason is required when rejecting".to_owned(),
                        )
                    })?;

                Ok((ResponseStatus::Rejected, Some(reason.to_owned())))
            }
        }
    }
}

/// Answers the assignment of `inspector` within the shift. Only the inspector may answer, and
/// only once: the row moves out of `PENDING` in a single conditional update.
#[instrument(skip(request, connection))]
pub async fn respond(
    shift: &Id,
    inspector: &Id,
    principal: &Principal,
    request: &ShiftResponseRequest,
    connection: &DatabaseConnection,
) -> Result<(Shift, ShiftInspector)> {
    if !principal.id.eq(inspector) {
        return Err(ApplicationError::Forbidden(
            "only the assigned inspector can respond".to_owned(),
        ));
    }
    let (status, reason) = request.decision()?;

    let shift = fetch::<Shift>(shift, connection).await?;
    let groups = TaskAssignment::of_shifts(std::slice::from_ref(shift.id()), connection)
        .await?
        .into_iter()
        .map(|assignment| assignment.inspector_group_id().to_string())
        .collect::<Vec<String>>();

    let mut response = sql_span!(
        connection
            .query("SELECT * FROM shift_inspector WHERE inspectorId = $inspector AND inspectorGroupId IN $groups")
            .query(
                "UPDATE shift_inspector SET status = $status, rejectionReason = $reason, responseAt = $now \
                 WHERE inspectorId = $inspector AND inspectorGroupId IN $groups AND status = 'PENDING' \
                 RETURN AFTER",
            )
            .bind(("inspector", inspector.to_string()))
            .bind(("groups", groups))
            .bind(("status", status))
            .bind(("reason", reason))
            .bind(("now", crate::database::now()))
            .await?
            .check()?,
        "shift response"
    );
    let rows: Vec<ShiftInspector> = response.take(0)?;
    let updated: Vec<ShiftInspector> = response.take(1)?;

    if rows.is_empty() {
        return Err(ApplicationError::NotFound(format!(
            "{inspector} is not assigned to {}",
            shift.id()
        )));
    }

    match updated.into_iter().next() {
        Some(row) => Ok((shift, row)),
        None => Err(ApplicationError::Conflict(
            "the assignment has already been answered".to_owned(),
        )),
    }
}
