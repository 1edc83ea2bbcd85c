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
use crate::database::definitions::fetch;
use crate::database::definitions::request::{
    NewRequest, Request, RequestStatus, RequestType,
};
use crate::database::definitions::shift_type::ShiftType;
use crate::prelude::*;
use chrono::NaiveDate;
use validator::Validate;

#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    #[serde(rename = "type")]
    pub kind: RequestType,
    pub shift_type_id: Option<String>,
    pub target_shift_type_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(max = 1000, message = "reason must not exceed 1000 characters"))]
    pub reason: Option<String>,
}

impl CreateRequestBody {
    /// Checks the fields the type of the request needs and drops the others.
    pub fn into_new_request(self, requester: &Id) -> Result<NewRequest> {
        let mut request = NewRequest {
            requester_id: requester.clone(),
            kind: self.kind,
            shift_type_id: None,
            target_shift_type_id: None,
            start_date: None,
            end_date: None,
            reason: self.reason,
        };

        match self.kind {
            RequestType::ShiftSwap => {
                let (shift_type, target) = self
                    .shift_type_id
                    .zip(self.target_shift_type_id)
                    .ok_or_else(|| {
                        ApplicationError::BadRequest(
                            "a swap needs shiftTypeId and targetShiftTypeId".to_owned(),
                        )
                    })?;
                let shift_type = Id::try_from(("shift_type", shift_type.as_str()))?;
                let target = Id::try_from(("shift_type", target.as_str()))?;
                if shift_type.eq(&target) {
                    return Err(ApplicationError::BadRequest(
                        "a swap needs two different shift types".to_owned(),
                    ));
                }

                request.shift_type_id = Some(shift_type);
                request.target_shift_type_id = Some(target);
            }
            RequestType::Leave => {
                let (start, end) = self.start_date.zip(self.end_date).ok_or_else(|| {
                    ApplicationError::BadRequest("a leave needs startDate and endDate".to_owned())
                })?;
                if start > end {
                    return Err(ApplicationError::BadRequest(
                        "startDate must not be after endDate".to_owned(),
                    ));
                }

                request.start_date = Some(start);
                request.end_date = Some(end);
            }
        }

        Ok(request)
    }
}

#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignManagerBody {
    pub manager_id: String,
}

#[derive(Deserialize, Debug, Clone, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    pub status: RequestStatus,
    #[validate(length(max = 1000, message = "note must not exceed 1000 characters"))]
    pub note: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
}

/// Admins see every request, everybody else their own and the ones they manage.
pub fn is_visible(request: &Request, principal: &Principal) -> bool {
    principal.is_admin
        || request.requester_id().eq(&principal.id)
        || request.manager_id().as_ref() == Some(&principal.id)
}

/// Whether the principal may approve or reject the request. The requester never may.
pub fn may_review(request: &Request, principal: &Principal) -> Result<()> {
    if request.requester_id().eq(&principal.id) {
        return Err(ApplicationError::Forbidden(
            "you can not review your own request".to_owned(),
        ));
    }
    if principal.is_admin || request.manager_id().as_ref() == Some(&principal.id) {
        Ok(())
    } else {
        Err(ApplicationError::Forbidden(
            "only administrators and the assigned manager can review".to_owned(),
        ))
    }
}

#[instrument(skip(body, connection))]
pub async fn create(
    principal: &Principal,
    body: CreateRequestBody,
    connection: &DatabaseConnection,
) -> Result<Request> {
    principal.require_non_admin()?;
    let request = body.into_new_request(&principal.id)?;

    if let (Some(shift_type), Some(target)) = (
        request.shift_type_id.as_ref(),
        request.target_shift_type_id.as_ref(),
    ) {
        fetch::<ShiftType>(shift_type, connection).await?;
        fetch::<ShiftType>(target, connection).await?;
    }

    Request::create(&request, connection).await
}

#[instrument(skip(connection))]
pub async fn list(
    principal: &Principal,
    filter: RequestFilter,
    paging: PagingOptions,
    connection: &DatabaseConnection,
) -> Result<Page<Request>> {
    let mut conditions = Vec::new();
    let mut bindings = Vec::new();

    if !principal.is_admin {
        conditions.push("(requesterId = $principal OR managerId = $principal)");
        bindings.push(("principal", json!(principal.id)));
    }
    if let Some(status) = filter.status {
        conditions.push("status = $status");
        bindings.push(("status", json!(status)));
    }
    let condition = conditions.join(" AND ");

    paging
        .execute::<Request>(
            Request::TABLE,
            (!condition.is_empty()).then_some(condition.as_str()),
            "createdAt DESC",
            &bindings,
            connection,
        )
        .await
}

#[instrument(skip(connection))]
pub async fn get(id: &Id, principal: &Principal, connection: &DatabaseConnection) -> Result<Request> {
    let request = fetch::<Request>(id, connection).await?;
    if !is_visible(&request, principal) {
        return Err(ApplicationError::Forbidden(format!(
            "{id} is not visible to you"
        )));
    }

    Ok(request)
}

/// Hands a pending request to a manager. Assigning again overwrites.
#[instrument(skip(connection))]
pub async fn assign_manager(
    id: &Id,
    body: AssignManagerBody,
    principal: &Principal,
    connection: &DatabaseConnection,
) -> Result<Request> {
    principal.require_admin()?;
    let manager = fetch::<User>(&Id::try_from(("account", body.manager_id.as_str()))?, connection).await?;
    if !*manager.is_manager() {
        return Err(ApplicationError::BadRequest(format!(
            "{} is not a manager",
            manager.id()
        )));
    }
    fetch::<Request>(id, connection).await?;

    Request::assign_manager(id, manager.id(), connection)
        .await?
        .ok_or_else(|| ApplicationError::Conflict(format!("{id} is no longer pending")))
}

/// Approves or rejects a pending request. Authorization is checked before the state, so an
/// outsider learns nothing about a decided request.
#[instrument(skip(connection))]
pub async fn review(
    id: &Id,
    body: ReviewBody,
    principal: &Principal,
    connection: &DatabaseConnection,
) -> Result<Request> {
    if !body.status.is_terminal() {
        return Err(ApplicationError::BadRequest(
            "status must be APPROVED or REJECTED".to_owned(),
        ));
    }
    let request = fetch::<Request>(id, connection).await?;
    may_review(&request, principal)?;

    Request::decide(id, body.status, &principal.id, body.note.as_deref(), connection)
        .await?
        .ok_or_else(|| ApplicationError::Conflict(format!("{id} has already been decided")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: serde_json::Value) -> CreateRequestBody {
        serde_json::from_value(value).unwrap()
    }

    fn principal(key: &str, is_admin: bool) -> Principal {
        Principal {
            id: Id::new(("account", key)),
            username: key.to_owned(),
            full_name: key.to_owned(),
            is_admin,
            is_manager: !is_admin,
            is_inspector: false,
        }
    }

    #[test]
    fn test_leave_dates() {
        let requester = Id::new(("account", "anna"));

        let reversed = body(json!({"type": "LEAVE", "startDate": "2025-03-07", "endDate": "2025-03-03"}));
        assert!(matches!(
            reversed.into_new_request(&requester),
            Err(ApplicationError::BadRequest(_))
        ));

        let single_day = body(json!({"type": "LEAVE", "startDate": "2025-03-03", "endDate": "2025-03-03"}));
        assert!(single_day.into_new_request(&requester).is_ok());

        let open = body(json!({"type": "LEAVE", "startDate": "2025-03-03"}));
        assert!(open.into_new_request(&requester).is_err());

        // fields of the other type are dropped
        let leave = body(json!({
            "type": "LEAVE",
            "startDate": "2025-03-03",
            "endDate": "2025-03-04",
            "shiftTypeId": "shift_type:morning",
        }))
        .into_new_request(&requester)
        .unwrap();
        assert!(leave.shift_type_id.is_none());
    }

    #[test]
    fn test_swap_shift_types() {
        let requester = Id::new(("account", "anna"));

        let same = body(json!({"type": "SHIFT_SWAP", "shiftTypeId": "morning", "targetShiftTypeId": "shift_type:morning"}));
        assert!(same.into_new_request(&requester).is_err());

        let missing = body(json!({"type": "SHIFT_SWAP", "shiftTypeId": "morning"}));
        assert!(missing.into_new_request(&requester).is_err());

        let swap = body(json!({"type": "SHIFT_SWAP", "shiftTypeId": "morning", "targetShiftTypeId": "night"}))
            .into_new_request(&requester)
            .unwrap();
        assert_eq!(Some(Id::new(("shift_type", "night"))), swap.target_shift_type_id);
    }

    #[test]
    fn test_review_rights() {
        let request: Request = serde_json::from_value(json!({
            "id": "request:r1",
            "requesterId": "account:anna",
            "type": "LEAVE",
            "status": "PENDING",
            "managerId": "account:mia",
            "createdAt": "2025-01-01T00:00:00Z",
        }))
        .unwrap();

        assert!(may_review(&request, &principal("mia", false)).is_ok());
        assert!(may_review(&request, &principal("root", true)).is_ok());
        assert!(matches!(
            may_review(&request, &principal("max", false)),
            Err(ApplicationError::Forbidden(_))
        ));
        assert!(may_review(&request, &principal("anna", false)).is_err());

        assert!(is_visible(&request, &principal("anna", false)));
        assert!(is_visible(&request, &principal("mia", false)));
        assert!(!is_visible(&request, &principal("max", false)));
    }
}
