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
use crate::database::definitions::building::Building;
use crate::database::definitions::inspector_group::{
    InspectorGroup, ResponseStatus, ShiftDay, ShiftInspector,
};
use crate::database::definitions::role::Role;
use crate::database::definitions::shift::Shift;
use crate::database::definitions::shift_type::ShiftType;
use crate::database::definitions::task_assignment::TaskAssignment;
use crate::database::definitions::{fetch, fetch_all, fetch_many};
use crate::prelude::*;
use crate::schedule::week::Week;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildingSchedule {
    pub id: Id,
    pub name: String,
    pub code: String,
    pub area: Option<String>,
    pub supervisor: Option<UserSummary>,
    pub shifts: Vec<ShiftSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSummary {
    pub id: Id,
    pub week: Week,
    pub task_assignments: Vec<TaskAssignmentSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignmentSummary {
    pub id: Id,
    pub role: Role,
    pub inspector_group: InspectorGroupSummary,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InspectorGroupSummary {
    pub id: Id,
    pub name: String,
    /// Always seven entries, monday first.
    pub days: Vec<DaySchedule>,
    pub inspectors: Vec<GroupInspector>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub day_of_week: u8,
    pub date: NaiveDate,
    /// `None` means no shift on that day.
    pub shift_type: Option<ShiftType>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupInspector {
    /// id of the shift inspector row
    pub id: Id,
    pub inspector: UserSummary,
    pub is_backup: bool,
    pub status: ResponseStatus,
    pub rejection_reason: Option<String>,
    pub response_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildingReference {
    pub id: Id,
    pub name: String,
    pub code: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupReference {
    pub id: Id,
    pub name: String,
}

/// One assignment of an inspector, seen from the inspector.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MyAssignment {
    pub id: Id,
    pub shift_id: Id,
    pub week: Week,
    pub building: BuildingReference,
    pub role: Role,
    pub inspector_group: GroupReference,
    pub is_backup: bool,
    pub status: ResponseStatus,
    pub rejection_reason: Option<String>,
    pub days: Vec<DaySchedule>,
}

/// The rows below the shift level, indexed by id.
#[derive(Debug, Default)]
pub struct ScheduleRecords {
    pub assignments: Vec<TaskAssignment>,
    pub roles: HashMap<Id, Role>,
    pub groups: HashMap<Id, InspectorGroup>,
    pub days: HashMap<Id, Vec<ShiftDay>>,
    pub members: HashMap<Id, Vec<ShiftInspector>>,
    pub users: HashMap<Id, User>,
    pub shift_types: HashMap<Id, ShiftType>,
}

fn index_by_id<T, F>(records: Vec<T>, id: F) -> HashMap<Id, T>
where
    F: Fn(&T) -> &Id,
{
    records
        .into_iter()
        .map(|record| (id(&record).clone(), record))
        .collect()
}

fn group_by<T, F>(records: Vec<T>, key: F) -> HashMap<Id, Vec<T>>
where
    F: Fn(&T) -> &Id,
{
    let mut grouped = HashMap::<Id, Vec<T>>::new();
    for record in records {
        grouped.entry(key(&record).clone()).or_default().push(record);
    }

    grouped
}

impl ScheduleRecords {
    pub fn new(
        assignments: Vec<TaskAssignment>,
        roles: Vec<Role>,
        groups: Vec<InspectorGroup>,
        days: Vec<ShiftDay>,
        members: Vec<ShiftInspector>,
        users: Vec<User>,
        shift_types: Vec<ShiftType>,
    ) -> Self {
        Self {
            assignments,
            roles: index_by_id(roles, |role| role.id()),
            groups: index_by_id(groups, |group| group.id()),
            days: group_by(days, |day| day.inspector_group_id()),
            members: group_by(members, |member| member.inspector_group_id()),
            users: index_by_id(users, |user| user.id()),
            shift_types: index_by_id(shift_types, |shift_type| shift_type.id()),
        }
    }

    /// Loads everything hanging below the given assignments with one query per level.
    #[instrument(skip_all)]
    pub async fn load(
        assignments: Vec<TaskAssignment>,
        connection: &DatabaseConnection,
    ) -> Result<Self> {
        let role_ids = unique(assignments.iter().map(|assignment| assignment.role_id()));
        let group_ids = unique(
            assignments
                .iter()
                .map(|assignment| assignment.inspector_group_id()),
        );

        let roles = fetch_many::<Role>(&role_ids, connection).await?;
        let groups = fetch_many::<InspectorGroup>(&group_ids, connection).await?;
        let days = ShiftDay::of_groups(&group_ids, connection).await?;
        let members = ShiftInspector::of_groups(&group_ids, connection).await?;
        let user_ids = unique(members.iter().map(|member| member.inspector_id()));
        let users = fetch_many::<User>(&user_ids, connection).await?;
        let shift_types = fetch_all::<ShiftType>("name ASC", connection).await?;

        Ok(Self::new(
            assignments,
            roles,
            groups,
            days,
            members,
            users,
            shift_types,
        ))
    }

    /// The seven days of the group within the week.
    pub fn days_of(&self, group: &Id, week: &Week) -> Vec<DaySchedule> {
        let planned = self.days.get(group);

        (0..7u8)
            .filter_map(|day_of_week| {
                let shift_type = planned
                    .and_then(|days| days.iter().find(|day| *day.day_of_week() == day_of_week))
                    .and_then(|day| day.shift_type_id().as_ref())
                    .and_then(|shift_type| self.shift_types.get(shift_type))
                    .cloned();

                week.day(day_of_week).map(|date| DaySchedule {
                    day_of_week,
                    date,
                    shift_type,
                })
            })
            .collect()
    }

    /// Primaries before backups, each by name. Rows of unknown users are left out.
    pub fn members_of(&self, group: &Id) -> Vec<GroupInspector> {
        let mut members = self
            .members
            .get(group)
            .map(|members| {
                members
                    .iter()
                    .filter_map(|member| {
                        let user = self.users.get(member.inspector_id())?;

                        Some(GroupInspector {
                            id: member.id().clone(),
                            inspector: UserSummary::from(user),
                            is_backup: *member.is_backup(),
                            status: *member.status(),
                            rejection_reason: member.rejection_reason().clone(),
                            response_at: *member.response_at(),
                        })
                    })
                    .collect::<Vec<GroupInspector>>()
            })
            .unwrap_or_default();
        members.sort_by(|a, b| {
            (a.is_backup, &a.inspector.full_name).cmp(&(b.is_backup, &b.inspector.full_name))
        });

        members
    }

    /// `None` if the role or the group of the assignment vanished.
    pub fn summarize(&self, assignment: &TaskAssignment, week: &Week) -> Option<TaskAssignmentSummary> {
        let role = self.roles.get(assignment.role_id())?;
        let group = self.groups.get(assignment.inspector_group_id())?;

        Some(TaskAssignmentSummary {
            id: assignment.id().clone(),
            role: role.clone(),
            inspector_group: InspectorGroupSummary {
                id: group.id().clone(),
                name: group.name().clone(),
                days: self.days_of(group.id(), week),
                inspectors: self.members_of(group.id()),
            },
        })
    }

    pub fn summarize_shift(&self, shift: &Shift) -> ShiftSummary {
        let mut task_assignments = self
            .assignments
            .iter()
            .filter(|assignment| assignment.shift_id().eq(shift.id()))
            .filter_map(|assignment| {
                let summary = self.summarize(assignment, shift.week());
                if summary.is_none() {
                    warn!("Skipping dangling task assignment {}", assignment.id());
                }
                summary
            })
            .collect::<Vec<TaskAssignmentSummary>>();
        task_assignments.sort_by(|a, b| a.role.name().cmp(b.role.name()));

        ShiftSummary {
            id: shift.id().clone(),
            week: *shift.week(),
            task_assignments,
        }
    }
}

fn unique<'a, I>(ids: I) -> Vec<Id>
where
    I: Iterator<Item = &'a Id>,
{
    ids.cloned()
        .collect::<HashSet<Id>>()
        .into_iter()
        .collect()
}

/// Nests the shifts below their buildings, keeping the order of `buildings` and sorting shifts
/// by week. Pure, so every level can be checked without a store.
pub fn assemble(
    buildings: &[Building],
    shifts: &[Shift],
    supervisors: &HashMap<Id, User>,
    records: &ScheduleRecords,
) -> Vec<BuildingSchedule> {
    buildings
        .iter()
        .map(|building| {
            let mut own = shifts
                .iter()
                .filter(|shift| shift.building_id().eq(building.id()))
                .collect::<Vec<&Shift>>();
            own.sort_by_key(|shift| *shift.week());

            BuildingSchedule {
                id: building.id().clone(),
                name: building.name().clone(),
                code: building.code().clone(),
                area: building.area().clone(),
                supervisor: building
                    .supervisor_id()
                    .as_ref()
                    .and_then(|supervisor| supervisors.get(supervisor))
                    .map(UserSummary::from),
                shifts: own
                    .into_iter()
                    .map(|shift| records.summarize_shift(shift))
                    .collect(),
            }
        })
        .collect()
}

/// Reads the nested schedules of the given buildings. Never writes.
#[instrument(skip_all)]
pub async fn schedules(
    buildings: &[Building],
    week: Option<&Week>,
    connection: &DatabaseConnection,
) -> Result<Vec<BuildingSchedule>> {
    let building_ids = buildings
        .iter()
        .map(|building| building.id().clone())
        .collect::<Vec<Id>>();
    let supervisor_ids = unique(
        buildings
            .iter()
            .filter_map(|building| building.supervisor_id().as_ref()),
    );

    let shifts = Shift::of_buildings(&building_ids, week, connection).await?;
    let shift_ids = shifts
        .iter()
        .map(|shift| shift.id().clone())
        .collect::<Vec<Id>>();
    let assignments = TaskAssignment::of_shifts(&shift_ids, connection).await?;
    let records = ScheduleRecords::load(assignments, connection).await?;
    let supervisors = index_by_id(
        fetch_many::<User>(&supervisor_ids, connection).await?,
        |user| user.id(),
    );

    Ok(assemble(buildings, &shifts, &supervisors, &records))
}

/// The schedule of one building, `Forbidden` if the principal may not see it.
#[instrument(skip(connection))]
pub async fn building_schedule(
    id: &Id,
    principal: &Principal,
    connection: &DatabaseConnection,
) -> Result<BuildingSchedule> {
    let building = fetch::<Building>(id, connection).await?;
    if !building.is_visible_to(principal) {
        return Err(ApplicationError::Forbidden(format!(
            "{id} is not visible to you"
        )));
    }

    schedules(std::slice::from_ref(&building), None, connection)
        .await?
        .into_iter()
        .next()
        .ok_or(ApplicationError::InternalServerError)
}

/// The summary of a single assignment, as returned after composing or editing a group.
#[instrument(skip(connection))]
pub async fn assignment_summary(
    id: &Id,
    connection: &DatabaseConnection,
) -> Result<TaskAssignmentSummary> {
    let assignment = fetch::<TaskAssignment>(id, connection).await?;
    let shift = fetch::<Shift>(assignment.shift_id(), connection).await?;
    let records = ScheduleRecords::load(vec![assignment.clone()], connection).await?;

    records
        .summarize(&assignment, shift.week())
        .ok_or_else(|| ApplicationError::NotFound(format!("{id} is incomplete")))
}

/// Every assignment of the inspector, newest week first.
#[instrument(skip(connection))]
pub async fn my_assignments(
    inspector: &Id,
    connection: &DatabaseConnection,
) -> Result<Vec<MyAssignment>> {
    let rows = ShiftInspector::of_inspector(inspector, connection).await?;
    let group_ids = unique(rows.iter().map(|row| row.inspector_group_id()));
    let assignments = TaskAssignment::of_groups(&group_ids, connection).await?;

    let shift_ids = unique(assignments.iter().map(|assignment| assignment.shift_id()));
    let shifts = index_by_id(fetch_many::<Shift>(&shift_ids, connection).await?, |shift| {
        shift.id()
    });
    let building_ids = unique(shifts.values().map(|shift| shift.building_id()));
    let buildings = index_by_id(
        fetch_many::<Building>(&building_ids, connection).await?,
        |building| building.id(),
    );
    let records = ScheduleRecords::load(assignments, connection).await?;

    Ok(collect_assignments(&rows, &shifts, &buildings, &records))
}

/// Joins the rows of one inspector with their assignment, shift and building.
pub fn collect_assignments(
    rows: &[ShiftInspector],
    shifts: &HashMap<Id, Shift>,
    buildings: &HashMap<Id, Building>,
    records: &ScheduleRecords,
) -> Vec<MyAssignment> {
    let mut collected = rows
        .iter()
        .filter_map(|row| {
            let assignment = records
                .assignments
                .iter()
                .find(|assignment| assignment.inspector_group_id().eq(row.inspector_group_id()))?;
            let shift = shifts.get(assignment.shift_id())?;
            let building = buildings.get(shift.building_id())?;
            let role = records.roles.get(assignment.role_id())?;
            let group = records.groups.get(row.inspector_group_id())?;

            Some(MyAssignment {
                id: row.id().clone(),
                shift_id: shift.id().clone(),
                week: *shift.week(),
                building: BuildingReference {
                    id: building.id().clone(),
                    name: building.name().clone(),
                    code: building.code().clone(),
                },
                role: role.clone(),
                inspector_group: GroupReference {
                    id: group.id().clone(),
                    name: group.name().clone(),
                },
                is_backup: *row.is_backup(),
                status: *row.status(),
                rejection_reason: row.rejection_reason().clone(),
                days: records.days_of(group.id(), shift.week()),
            })
        })
        .collect::<Vec<MyAssignment>>();
    collected.sort_by(|a, b| b.week.cmp(&a.week).then_with(|| a.building.name.cmp(&b.building.name)));

    collected
}
