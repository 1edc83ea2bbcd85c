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

use crate::database::definitions::account::User;
use crate::database::definitions::inspector_group::{
    DayPlan, InspectorGroup, ShiftDay, ShiftInspector, WriteInspectorGroup,
};
use crate::database::definitions::role::Role;
use crate::database::definitions::shift::Shift;
use crate::database::definitions::shift_type::ShiftType;
use crate::database::definitions::task_assignment::TaskAssignment;
use crate::database::definitions::{fetch, fetch_many, remove};
use crate::prelude::*;
use crate::schedule::availability::committed_inspectors;
use crate::schedule::week::Week;
use std::collections::HashSet;
use validator::Validate;

#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ComposeGroupRequest {
    pub role_id: String,
    #[validate(length(min = 1, message = "groupName must not be empty"))]
    pub group_name: String,
    #[serde(default)]
    pub inspectors: Vec<String>,
    #[serde(default)]
    pub backups: Vec<String>,
    #[serde(default)]
    #[validate]
    pub days: Vec<DayPlan>,
}

#[derive(Deserialize, Debug, Clone, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditGroupRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub inspectors: Option<Vec<String>>,
    pub backups: Option<Vec<String>>,
    #[validate]
    pub days: Option<Vec<DayPlan>>,
}

/// The members of a group split by role. Nobody appears twice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Roster {
    pub primaries: Vec<Id>,
    pub backups: Vec<Id>,
}

impl Roster {
    pub fn parse(primaries: &[String], backups: &[String]) -> Result<Roster> {
        let parse = |raw: &[String]| {
            raw.iter()
                .map(|id| Id::try_from(("account", id.as_str())))
                .collect::<Result<Vec<Id>>>()
        };
        let roster = Roster {
            primaries: parse(primaries)?,
            backups: parse(backups)?,
        };

        let mut seen = HashSet::new();
        for id in roster.members() {
            if !seen.insert(id) {
                return Err(ApplicationError::BadRequest(format!(
                    "{id} is listed more than once"
                )));
            }
        }

        Ok(roster)
    }

    pub fn members(&self) -> impl Iterator<Item = &Id> {
        self.primaries.iter().chain(self.backups.iter())
    }

    pub fn is_backup(&self, id: &Id) -> bool {
        self.backups.contains(id)
    }

    fn from_rows(rows: &[ShiftInspector]) -> Roster {
        let (backups, primaries): (Vec<&ShiftInspector>, Vec<&ShiftInspector>) =
            rows.iter().partition(|row| *row.is_backup());

        Roster {
            primaries: primaries
                .into_iter()
                .map(|row| row.inspector_id().clone())
                .collect(),
            backups: backups
                .into_iter()
                .map(|row| row.inspector_id().clone())
                .collect(),
        }
    }
}

/// Turns the day plans into `(dayOfWeek, shiftTypeId)` pairs, rejecting days outside the week
/// and days planned twice.
pub fn parse_days(days: &[DayPlan]) -> Result<Vec<(u8, Option<Id>)>> {
    let mut seen = HashSet::new();

    days.iter()
        .map(|day| {
            if day.day_of_week > 6 {
                return Err(ApplicationError::BadRequest(
                    "dayOfWeek must be between 0 and 6".to_owned(),
                ));
            }
            if !seen.insert(day.day_of_week) {
                return Err(ApplicationError::BadRequest(format!(
                    "dayOfWeek {} is planned more than once",
                    day.day_of_week
                )));
            }
            let shift_type = day
                .shift_type_id
                .as_deref()
                .map(|id| Id::try_from(("shift_type", id)))
                .transpose()?;

            Ok((day.day_of_week, shift_type))
        })
        .collect()
}

/// The result of a composition: the assignment and the inspectors who got a new row.
#[derive(Debug, Clone)]
pub struct Composition {
    pub assignment: TaskAssignment,
    pub shift: Shift,
    pub added: Vec<Id>,
}

#[instrument(skip(connection))]
async fn require_shift_types(days: &[(u8, Option<Id>)], connection: &DatabaseConnection) -> Result<()> {
    let ids = days
        .iter()
        .filter_map(|(_, shift_type)| shift_type.clone())
        .collect::<HashSet<Id>>()
        .into_iter()
        .collect::<Vec<Id>>();
    let found = fetch_many::<ShiftType>(&ids, connection)
        .await?
        .into_iter()
        .map(|shift_type| shift_type.id().clone())
        .collect::<HashSet<Id>>();

    match ids.into_iter().find(|id| !found.contains(id)) {
        Some(missing) => Err(ApplicationError::NotFound(format!("{missing} not found"))),
        None => Ok(()),
    }
}

/// Every member must be a registered inspector without another group in the week.
#[instrument(skip(connection))]
async fn require_available(
    roster: &Roster,
    week: &Week,
    ignore: Option<&Id>,
    connection: &DatabaseConnection,
) -> Result<()> {
    let members = roster.members().cloned().collect::<Vec<Id>>();
    let inspectors = fetch_many::<User>(&members, connection)
        .await?
        .into_iter()
        .filter(|user| *user.is_inspector())
        .map(|user| user.id().clone())
        .collect::<HashSet<Id>>();
    if let Some(id) = members.iter().find(|id| !inspectors.contains(id)) {
        return Err(ApplicationError::BadRequest(format!(
            "{id} is not an inspector"
        )));
    }

    let committed = committed_inspectors(week, ignore, connection).await?;
    let conflicting = members
        .iter()
        .filter(|id| committed.contains(id))
        .map(Id::to_string)
        .collect::<Vec<String>>();
    if !conflicting.is_empty() {
        return Err(ApplicationError::Conflict(format!(
            "already assigned in week {week}: {}",
            conflicting.join(", ")
        )));
    }

    Ok(())
}

/// Creates a group with its days and members and assigns it to the shift for the role.
#[instrument(skip(request, connection))]
pub async fn compose(
    shift: &Id,
    request: ComposeGroupRequest,
    connection: &DatabaseConnection,
) -> Result<Composition> {
    let shift = fetch::<Shift>(shift, connection).await?;
    let role = fetch::<Role>(&Id::try_from(("role", request.role_id.as_str()))?, connection).await?;
    let roster = Roster::parse(&request.inspectors, &request.backups)?;
    let days = parse_days(&request.days)?;

    require_shift_types(&days, connection).await?;
    if TaskAssignment::find(shift.id(), role.id(), connection).await?.is_some() {
        return Err(ApplicationError::Conflict(format!(
            "{} already has an assignment for {}",
            shift.id(),
            role.name()
        )));
    }
    require_available(&roster, shift.week(), None, connection).await?;

    let group = WriteInspectorGroup::from(connection)
        .set_name(Some(request.group_name))
        .to_owned()
        .await?;
    let assignment = match TaskAssignment::create(shift.id(), role.id(), group.id(), connection).await {
        Ok(assignment) => assignment,
        Err(error) => {
            remove(group.id(), connection).await?;
            return Err(error);
        }
    };

    ShiftDay::replace(group.id(), &days, connection).await?;
    for inspector in roster.members() {
        ShiftInspector::create_pending(group.id(), inspector, roster.is_backup(inspector), connection)
            .await?;
    }
    info!("Composed {} for {} in {}", group.id(), role.name(), shift.week());

    Ok(Composition {
        assignment,
        shift,
        added: roster.members().cloned().collect(),
    })
}

/// Renames the group, replaces its roster and replaces its days; each part only when given.
/// Retained members keep their answer, removed members lose their row.
#[instrument(skip(request, connection))]
pub async fn edit(
    group: &Id,
    request: EditGroupRequest,
    connection: &DatabaseConnection,
) -> Result<Composition> {
    let group = fetch::<InspectorGroup>(group, connection).await?;
    let assignment = TaskAssignment::of_groups(std::slice::from_ref(group.id()), connection)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApplicationError::NotFound(format!("{} has no assignment", group.id())))?;
    let shift = fetch::<Shift>(assignment.shift_id(), connection).await?;

    let days = request.days.as_deref().map(parse_days).transpose()?;
    if let Some(days) = days.as_ref() {
        require_shift_types(days, connection).await?;
    }

    let mut added = Vec::new();
    if request.inspectors.is_some() || request.backups.is_some() {
        let rows = ShiftInspector::of_groups(std::slice::from_ref(group.id()), connection).await?;
        let current = Roster::from_rows(&rows);
        let roster = Roster {
            primaries: match request.inspectors.as_deref() {
                Some(raw) => Roster::parse(raw, &[])?.primaries,
                None => current.primaries.clone(),
            },
            backups: match request.backups.as_deref() {
                Some(raw) => Roster::parse(&[], raw)?.backups,
                None => current.backups.clone(),
            },
        };
        // reject duplicates across both lists
        let roster = Roster::parse(
            &roster.primaries.iter().map(Id::to_string).collect::<Vec<String>>(),
            &roster.backups.iter().map(Id::to_string).collect::<Vec<String>>(),
        )?;
        require_available(&roster, shift.week(), Some(group.id()), connection).await?;

        let existing = current.members().cloned().collect::<HashSet<Id>>();
        let removed = current
            .members()
            .filter(|id| !roster.members().any(|member| member.eq(id)))
            .cloned()
            .collect::<Vec<Id>>();
        ShiftInspector::remove_from_group(group.id(), &removed, connection).await?;

        let (became_backup, became_primary): (Vec<Id>, Vec<Id>) = roster
            .members()
            .filter(|id| existing.contains(id) && current.is_backup(id) != roster.is_backup(id))
            .cloned()
            .partition(|id| roster.is_backup(id));
        ShiftInspector::set_backup(group.id(), &became_backup, true, connection).await?;
        ShiftInspector::set_backup(group.id(), &became_primary, false, connection).await?;

        for inspector in roster.members().filter(|id| !existing.contains(id)) {
            ShiftInspector::create_pending(group.id(), inspector, roster.is_backup(inspector), connection)
                .await?;
            added.push(inspector.clone());
        }
    }

    if let Some(days) = days {
        ShiftDay::replace(group.id(), &days, connection).await?;
    }
    if let Some(name) = request.name {
        WriteInspectorGroup::from(connection)
            .set_target(Some(group.id()))
            .set_name(Some(name))
            .to_owned()
            .await?;
    }

    Ok(Composition {
        assignment,
        shift,
        added,
    })
}

/// Removes the assignment with everything below it.
#[instrument(skip(connection))]
pub async fn dissolve(assignment: &Id, connection: &DatabaseConnection) -> Result<()> {
    fetch::<TaskAssignment>(assignment, connection)
        .await?
        .remove_cascade(connection)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_roster() {
        let roster = Roster::parse(&ids(&["account:anna", "ben"]), &ids(&["account:cem"])).unwrap();
        assert_eq!(3, roster.members().count());
        assert!(roster.is_backup(&Id::new(("account", "cem"))));
        assert!(!roster.is_backup(&Id::new(("account", "ben"))));

        // a primary can never be its own backup
        assert!(matches!(
            Roster::parse(&ids(&["anna"]), &ids(&["account:anna"])),
            Err(ApplicationError::BadRequest(_))
        ));
        assert!(Roster::parse(&ids(&["anna", "anna"]), &[]).is_err());
        assert!(Roster::parse(&ids(&["building:anna"]), &[]).is_err());
    }

    #[test]
    fn test_parse_days() {
        let plan = |day_of_week: u8, shift_type: Option<&str>| DayPlan {
            day_of_week,
            shift_type_id: shift_type.map(str::to_owned),
        };

        let days = parse_days(&[plan(0, Some("morning")), plan(6, None)]).unwrap();
        assert_eq!(
            vec![(0, Some(Id::new(("shift_type", "morning")))), (6, None)],
            days
        );

        assert!(parse_days(&[plan(7, None)]).is_err());
        assert!(parse_days(&[plan(1, None), plan(1, Some("morning"))]).is_err());
        assert!(parse_days(&[plan(1, Some("role:morning"))]).is_err());
        assert!(parse_days(&[]).unwrap().is_empty());
    }
}
