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
use strum::{AsRefStr, EnumString};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    ShiftSwap,
    Leave,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// A swap or leave request of a user.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Getters)]
#[serde(rename_all = "camelCase")]
#[get = "pub"]
pub struct Request {
    id: Id,
    requester_id: Id,
    #[serde(rename = "type")]
    kind: RequestType,
    status: RequestStatus,
    shift_type_id: Option<Id>,
    target_shift_type_id: Option<Id>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    reason: Option<String>,
    manager_id: Option<Id>,
    reviewer_id: Option<Id>,
    reviewed_at: Option<DateTime<Utc>>,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl Record for Request {
    const TABLE: &'static str = "request";
}

/// The user supplied part of a request, checked by the workflow before it is stored.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    pub requester_id: Id,
    #[serde(rename = "type")]
    pub kind: RequestType,
    pub shift_type_id: Option<Id>,
    pub target_shift_type_id: Option<Id>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub reason: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredRequest<'a> {
    #[serde(flatten)]
    request: &'a NewRequest,
    status: RequestStatus,
    created_at: DateTime<Utc>,
}

impl Request {
    #[instrument(skip(connection))]
    pub async fn create(request: &NewRequest, connection: &DatabaseConnection) -> Result<Request> {
        let created: Vec<Request> = sql_span!(
            connection
                .create(Request::TABLE)
                .content(StoredRequest {
                    request,
                    status: RequestStatus::Pending,
                    created_at: crate::database::now(),
                })
                .await?,
            "create request"
        );

        created
            .into_iter()
            .next()
            .ok_or(ApplicationError::InternalServerError)
    }

    /// Sets the manager of a pending request, `None` if the request is no longer pending.
    #[instrument(skip(connection))]
    pub async fn assign_manager(
        id: &Id,
        manager: &Id,
        connection: &DatabaseConnection,
    ) -> Result<Option<Request>> {
        let updated: Vec<Request> = sql_span!(
            connection
                .query("UPDATE $request SET managerId = $manager WHERE status = 'PENDING' RETURN AFTER")
                .bind(("request", id.to_thing()))
                .bind(("manager", manager.to_string()))
                .await?
                .check()?
                .take(0)?,
            "assign manager"
        );

        Ok(updated.into_iter().next())
    }

    /// Moves a pending request into the given terminal status in a single conditional update.
    /// `None` if the request was no longer pending.
    #[instrument(skip(connection))]
    pub async fn decide(
        id: &Id,
        status: RequestStatus,
        reviewer: &Id,
        note: Option<&str>,
        connection: &DatabaseConnection,
    ) -> Result<Option<Request>> {
        let updated: Vec<Request> = sql_span!(
            connection
                .query(
                    "UPDATE $request SET status = $status, reviewerId = $reviewer, reviewedAt = $now, note = $note \
                     WHERE status = 'PENDING' RETURN AFTER",
                )
                .bind(("request", id.to_thing()))
                .bind(("status", status))
                .bind(("reviewer", reviewer.to_string()))
                .bind(("now", crate::database::now()))
                .bind(("note", note))
                .await?
                .check()?
                .take(0)?,
            "decide request"
        );

        Ok(updated.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leave(requester: &Id) -> NewRequest {
        NewRequest {
            requester_id: requester.clone(),
            kind: RequestType::Leave,
            shift_type_id: None,
            target_shift_type_id: None,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 3),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 7),
            reason: Some("vacation".to_owned()),
        }
    }

    #[tokio::test]
    async fn test_decide_once() -> std::result::Result<(), axum::BoxError> {
        let connection = crate::database::connect(&Config::default()).await?;
        let requester = Id::new(("account", "anna"));
        let manager = Id::new(("account", "mia"));

        let request = Request::create(&leave(&requester), &connection).await?;
        assert_eq!(RequestStatus::Pending, *request.status());
        assert_eq!(RequestType::Leave, *request.kind());

        let assigned = Request::assign_manager(request.id(), &manager, &connection).await?;
        assert_eq!(Some(&manager), assigned.as_ref().and_then(|r| r.manager_id().as_ref()));

        let decided = Request::decide(
            request.id(),
            RequestStatus::Approved,
            &manager,
            Some("enjoy"),
            &connection,
        )
        .await?
        .ok_or("request not decided")?;
        assert_eq!(RequestStatus::Approved, *decided.status());
        assert_eq!(Some(&manager), decided.reviewer_id().as_ref());
        assert!(decided.reviewed_at().is_some());

        // terminal requests stay as they are
        let second = Request::decide(
            request.id(),
            RequestStatus::Rejected,
            &manager,
            None,
            &connection,
        )
        .await?;
        assert!(second.is_none());
        assert!(Request::assign_manager(request.id(), &requester, &connection)
            .await?
            .is_none());

        let stored = crate::database::definitions::fetch::<Request>(request.id(), &connection).await?;
        assert_eq!(RequestStatus::Approved, *stored.status());
        assert_eq!(Some("enjoy"), stored.note().as_deref());

        Ok(())
    }
}
