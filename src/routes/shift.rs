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
use crate::database::definitions::building::Building;
use crate::database::definitions::inspector_group::{ResponseStatus, ShiftInspector};
use crate::database::definitions::shift::Shift;
use crate::database::definitions::fetch;
use crate::prelude::*;
use crate::routes::path_id;
use crate::schedule::aggregate::{my_assignments, MyAssignment};
use crate::schedule::response::{respond, ShiftResponseRequest};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Router;

pub fn router() -> Router<ApplicationState> {
    Router::new()
        .route("/mine", get(mine))
        .route("/:id/inspectors/:inspector_id/response", post(response))
}

async fn mine(
    State(state): State<ApplicationState>,
    principal: Principal,
) -> Result<Json<Vec<MyAssignment>>> {
    Ok(Json(my_assignments(&principal.id, state.connection()).await?))
}

async fn response(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path((id, inspector_id)): Path<(String, String)>,
    Json(data): Json<ShiftResponseRequest>,
) -> Result<Json<ShiftInspector>> {
    let shift = path_id(Shift::TABLE, id.as_str())?;
    let inspector = path_id(User::TABLE, inspector_id.as_str())?;

    let (shift, row) = respond(&shift, &inspector, &principal, &data, state.connection()).await?;
    info!("{} answered {} with {:?}", principal.username, shift.id(), row.status());

    if row.status().eq(&ResponseStatus::Rejected) {
        // the answer is stored already, a failed notification only ends up in the log
        if let Err(error) = notify_supervisor(&shift, &row, &principal, &state).await {
            error!("Failed to report the rejection of {}: {}", row.id(), error);
        }
    }

    Ok(Json(row))
}

async fn notify_supervisor(
    shift: &Shift,
    row: &ShiftInspector,
    principal: &Principal,
    state: &ApplicationState,
) -> Result<()> {
    let building = fetch::<Building>(shift.building_id(), state.connection()).await?;
    match building.supervisor_id() {
        Some(supervisor) => {
            state.notifier().shift_rejected(
                supervisor.clone(),
                principal.full_name.as_str(),
                building.name(),
                shift.week().to_string().as_str(),
                row.rejection_reason().as_deref().unwrap_or_default(),
            );
        }
        None => debug!("{} has no supervisor to notify", building.id()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::remove;
    use crate::database::definitions::inspector_group::{ShiftInspector, WriteInspectorGroup};
    use crate::database::definitions::notification::Notification;
    use crate::database::definitions::task_assignment::TaskAssignment;
    use crate::tests::prelude::*;
    use axum::http::StatusCode;
    use axum::BoxError;
    use serde_json::Value;
    use std::time::Duration;

    #[tokio::test]
    async fn test_respond() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let inspector = suite.login(INSPECTOR).await;
        let other = suite.inspector_named("other").await?;
        let other_cookie = suite.login("other").await;

        let building = suite.building("N", Some(suite.manager().id())).await?;
        let shift = suite.shift(&building, "2025-03").await?;
        let lead = suite.role("Lead").await?;
        let group = WriteInspectorGroup::from(suite.connection())
            .set_name(Some("Alpha".to_owned()))
            .to_owned()
            .await?;
        TaskAssignment::create(shift.id(), lead.id(), group.id(), suite.connection()).await?;
        ShiftInspector::create_pending(group.id(), suite.inspector().id(), false, suite.connection())
            .await?;
        ShiftInspector::create_pending(group.id(), other.id(), true, suite.connection()).await?;

        let url = |inspector: String| format!("/api/shifts/{}/inspectors/{inspector}/response", shift.id());
        let respond = |cookie: &str, inspector: String, body: Value| {
            suite
                .client()
                .post(url(inspector).as_str())
                .header("cookie", cookie)
                .json(&body)
                .send()
        };
        let own = suite.inspector().id().to_string();

        // answering for somebody else
        let response = respond(other_cookie.as_str(), own.clone(), json!({"status": "ACCEPTED"})).await;
        assert_eq!(StatusCode::FORBIDDEN, response.status());

        let response = respond(inspector.as_str(), own.clone(), json!({"status": "REJECTED"})).await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());
        let response = respond(inspector.as_str(), own.clone(), json!({"status": "PENDING"})).await;
        assert_eq!(StatusCode::BAD_REQUEST, response.status());

        let response = respond(
            inspector.as_str(),
            own.clone(),
            json!({"status": "REJECTED", "rejectionReason": "Sick"}),
        )
        .await;
        assert_eq!(StatusCode::OK, response.status());
        let row = response.json::<Value>().await;
        assert_eq!(json!("REJECTED"), row["status"]);
        assert_eq!(json!("Sick"), row["rejectionReason"]);

        // an answer is final
        let response = respond(inspector.as_str(), own.clone(), json!({"status": "ACCEPTED"})).await;
        assert_eq!(StatusCode::CONFLICT, response.status());

        let response = respond(
            other_cookie.as_str(),
            other.id().to_string(),
            json!({"status": "ACCEPTED", "rejectionReason": "ignored"}),
        )
        .await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(Value::Null, response.json::<Value>().await["rejectionReason"]);

        let unrelated = suite.shift(&building, "2025-04").await?;
        let response = suite
            .client()
            .post(format!("/api/shifts/{}/inspectors/{own}/response", unrelated.id()).as_str())
            .header("cookie", inspector.as_str())
            .json(&json!({"status": "ACCEPTED"}))
            .send()
            .await;
        assert_eq!(StatusCode::NOT_FOUND, response.status());

        // the supervisor learns about the rejection in the background
        let mut notified = Vec::new();
        for _ in 0..50 {
            notified = Notification::of_recipient(suite.manager().id(), suite.connection()).await?;
            if !notified.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(1, notified.len());
        assert!(notified[0].message().contains("Sick"));

        Ok(())
    }

    #[tokio::test]
    async fn test_rejection_survives_failed_notification() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let inspector = suite.login(INSPECTOR).await;
        let building = suite.building("N", Some(suite.manager().id())).await?;
        let shift = suite.shift(&building, "2025-03").await?;
        let lead = suite.role("Lead").await?;
        let group = WriteInspectorGroup::from(suite.connection())
            .set_name(Some("Alpha".to_owned()))
            .to_owned()
            .await?;
        TaskAssignment::create(shift.id(), lead.id(), group.id(), suite.connection()).await?;
        ShiftInspector::create_pending(group.id(), suite.inspector().id(), false, suite.connection())
            .await?;
        // the supervisor can not be resolved anymore
        remove(building.id(), suite.connection()).await?;

        let response = suite
            .client()
            .post(
                format!(
                    "/api/shifts/{}/inspectors/{}/response",
                    shift.id(),
                    suite.inspector().id()
                )
                .as_str(),
            )
            .header("cookie", inspector.as_str())
            .json(&json!({"status": "REJECTED", "rejectionReason": "Sick"}))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(json!("REJECTED"), response.json::<Value>().await["status"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_answered_inspectors_stay_unavailable() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let admin = suite.login(ADMIN).await;
        let building = suite.building("N", None).await?;
        let shift = suite.shift(&building, "2025-03").await?;
        let morning = suite.shift_type("Morning", 6, 14).await?;
        let lead = suite.role("Lead").await?;
        let anna = suite.inspector_named("anna").await?;
        let ben = suite.inspector_named("ben").await?;

        let response = suite
            .client()
            .post(format!("/api/admin/shifts/{}/assignments", shift.id()).as_str())
            .header("cookie", admin.as_str())
            .json(&json!({
                "roleId": lead.id(),
                "groupName": "Alpha",
                "inspectors": [anna.id()],
                "backups": [ben.id()]
            }))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());

        let answer = |username: &'static str, inspector: String, body: Value| {
            let shift = shift.id().to_string();
            let suite = &suite;
            async move {
                let cookie = suite.login(username).await;
                suite
                    .client()
                    .post(format!("/api/shifts/{shift}/inspectors/{inspector}/response").as_str())
                    .header("cookie", cookie.as_str())
                    .json(&body)
                    .send()
                    .await
                    .status()
            }
        };
        let status = answer("anna", anna.id().to_string(), json!({"status": "ACCEPTED"})).await;
        assert_eq!(StatusCode::OK, status);
        let status = answer(
            "ben",
            ben.id().to_string(),
            json!({"status": "REJECTED", "rejectionReason": "Vacation"}),
        )
        .await;
        assert_eq!(StatusCode::OK, status);

        let response = suite
            .client()
            .get(
                format!(
                    "/api/admin/shifts/inspectors/availability?shiftTypeId={}&week=2025-03",
                    morning.id()
                )
                .as_str(),
            )
            .header("cookie", admin.as_str())
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let inspectors = response.json::<Vec<Value>>().await;
        for id in [anna.id().to_string(), ben.id().to_string()] {
            let inspector = inspectors
                .iter()
                .find(|inspector| inspector["id"] == json!(id))
                .cloned()
                .unwrap_or_default();
            assert_eq!(json!(false), inspector["isAvailable"], "{id}");
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_mine() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let inspector = suite.login(INSPECTOR).await;
        let building = suite.building("N", None).await?;
        let lead = suite.role("Lead").await?;

        for week in ["2025-03", "2025-05"] {
            let shift = suite.shift(&building, week).await?;
            let group = WriteInspectorGroup::from(suite.connection())
                .set_name(Some(format!("Group {week}")))
                .to_owned()
                .await?;
            TaskAssignment::create(shift.id(), lead.id(), group.id(), suite.connection()).await?;
            ShiftInspector::create_pending(group.id(), suite.inspector().id(), false, suite.connection())
                .await?;
        }

        let response = suite
            .client()
            .get("/api/shifts/mine")
            .header("cookie", inspector.as_str())
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());
        let mine = response.json::<Vec<Value>>().await;
        assert_eq!(2, mine.len());
        assert_eq!(json!("2025-05"), mine[0]["week"]);
        assert_eq!(json!("N"), mine[0]["building"]["code"]);
        assert_eq!(7, mine[1]["days"].as_array().map_or(0, Vec::len));

        let admin = suite.login(ADMIN).await;
        let response = suite
            .client()
            .get("/api/shifts/mine")
            .header("cookie", admin.as_str())
            .send()
            .await;
        assert!(response.json::<Vec<Value>>().await.is_empty());

        Ok(())
    }
}
