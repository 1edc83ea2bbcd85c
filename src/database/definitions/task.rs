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
use chrono::{DateTime, NaiveDate, Utc};
use shiftboard_codegen::DataWriter;
use strum::{AsRefStr, EnumString};
use validator::Validate;

#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// A kind of work item, e.g. "Fire safety walk".
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Getters, DataWriter)]
#[serde(rename_all = "camelCase")]
#[writer(table = "task_type", impl_full_request)]
#[get = "pub"]
pub struct TaskType {
    #[writer(skip)]
    id: Id,
    #[validate(length(min = 1, message = "name must not be empty"))]
    name: String,
}

impl Record for TaskType {
    const TABLE: &'static str = "task_type";
}

/// A work item of an inspector, tracked independently of shift assignments.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Getters, DataWriter)]
#[serde(rename_all = "camelCase")]
#[writer(table = "task")]
#[get = "pub"]
pub struct Task {
    #[writer(skip)]
    id: Id,
    #[writer(editable)]
    inspector_id: Id,
    #[writer(editable)]
    shift_type_id: Id,
    #[writer(editable)]
    task_type_id: Id,
    #[writer(editable)]
    status: TaskStatus,
    #[writer(editable)]
    date: NaiveDate,
    #[writer(editable)]
    assigned_to: Option<Id>,
    #[serde(default)]
    #[writer(editable)]
    is_followup_needed: bool,
    #[writer(editable)]
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl Record for Task {
    const TABLE: &'static str = "task";
}

#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub inspector_id: Id,
    pub shift_type_id: Id,
    pub task_type_id: Id,
    pub date: NaiveDate,
    pub assigned_to: Option<Id>,
    #[serde(default)]
    pub is_followup_needed: bool,
    #[validate(length(max = 2000, message = "notes must not exceed 2000 characters"))]
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusRequest {
    pub status: TaskStatus,
    pub is_followup_needed: Option<bool>,
}

impl<'a> WriteTask<'a> {
    pub fn with_request(&mut self, request: CreateTaskRequest) -> &mut Self {
        self.inspector_id = Some(request.inspector_id);
        self.shift_type_id = Some(request.shift_type_id);
        self.task_type_id = Some(request.task_type_id);
        self.status = Some(TaskStatus::Pending);
        self.date = Some(request.date);
        self.assigned_to = Some(request.assigned_to);
        self.is_followup_needed = Some(request.is_followup_needed);
        self.notes = Some(request.notes);
        self.created_at = Some(crate::database::now());

        self
    }
}

impl Task {
    /// Whether the user works on the task, either as its inspector or as assignee.
    pub fn involves(&self, user: &Id) -> bool {
        self.inspector_id.eq(user) || self.assigned_to.as_ref() == Some(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_task_writer() -> std::result::Result<(), axum::BoxError> {
        let connection = crate::database::connect(&Config::default()).await?;
        let anna = Id::new(("account", "anna"));
        let ben = Id::new(("account", "ben"));

        let request: CreateTaskRequest = serde_json::from_value(json!({
            "inspectorId": "account:anna",
            "shiftTypeId": "shift_type:morning",
            "taskTypeId": "task_type:walk",
            "date": "2025-01-14",
        }))?;
        let task = WriteTask::from(&connection)
            .with_request(request)
            .to_owned()
            .await?;
        assert_eq!(TaskStatus::Pending, *task.status());
        assert!(!task.is_followup_needed());
        assert!(task.involves(&anna));
        assert!(!task.involves(&ben));

        let edit: EditTask = serde_json::from_value(json!({
            "assignedTo": "account:ben",
            "status": "IN_PROGRESS",
        }))?;
        let edited = edit
            .to_writer(&connection)
            .set_target(Some(task.id()))
            .to_owned()
            .await?;
        assert_eq!(TaskStatus::InProgress, *edited.status());
        assert!(edited.involves(&ben));
        assert_eq!(task.date(), edited.date());

        Ok(())
    }
}
