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

use crate::database::definitions::account::{User, UserSummary};
use crate::database::definitions::inspector_group::ShiftInspector;
use crate::database::definitions::shift::Shift;
use crate::database::definitions::shift_type::ShiftType;
use crate::database::definitions::task_assignment::TaskAssignment;
use crate::database::definitions::fetch;
use crate::prelude::*;
use crate::schedule::week::Week;
use std::collections::HashSet;

pub const CONFLICTING_SHIFT: &str = "Has conflicting shift this week";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InspectorAvailability {
    #[serde(flatten)]
    pub inspector: UserSummary,
    pub is_available: bool,
    pub reason: Option<String>,
}

/// Marks every inspector committed to some group of the week as unavailable.
///
/// The check is coarse: any membership in the week counts, whatever shift type the other group
/// works and whatever the inspector answered.
pub fn annotate(inspectors: &[User], committed: &HashSet<Id>) -> Vec<InspectorAvailability> {
    inspectors
        .iter()
        .map(|inspector| {
            let is_available = !committed.contains(inspector.id());

            InspectorAvailability {
                inspector: UserSummary::from(inspector),
                is_available,
                reason: (!is_available).then(|| CONFLICTING_SHIFT.to_owned()),
            }
        })
        .collect()
}

/// Inspectors holding a row in any group assigned within the week. Rows of `ignore` are left out,
/// so a group can be edited without conflicting with itself.
#[instrument(skip(connection))]
pub async fn committed_inspectors(
    week: &Week,
    ignore: Option<&Id>,
    connection: &DatabaseConnection,
) -> Result<HashSet<Id>> {
    let shifts = Shift::in_week(week, connection)
        .await?
        .into_iter()
        .map(|shift| shift.id().clone())
        .collect::<Vec<Id>>();
    let groups = TaskAssignment::of_shifts(&shifts, connection)
        .await?
        .into_iter()
        .map(|assignment| assignment.inspector_group_id().clone())
        .filter(|group| Some(group) != ignore)
        .collect::<Vec<Id>>();

    Ok(ShiftInspector::of_groups(&groups, connection)
        .await?
        .into_iter()
        .map(|row| row.inspector_id().clone())
        .collect())
}

/// Every registered inspector annotated with whether they can still be assigned in the week.
#[instrument(skip(connection))]
pub async fn availability(
    shift_type: &Id,
    week: &Week,
    connection: &DatabaseConnection,
) -> Result<Vec<InspectorAvailability>> {
    // the shift type has to exist even though conflicts are decided per week
    fetch::<ShiftType>(shift_type, connection).await?;

    let inspectors = User::inspectors(connection).await?;
    let committed = committed_inspectors(week, None, connection).await?;

    Ok(annotate(&inspectors, &committed))
}
