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

use crate::database::definitions::request::Request;
use crate::prelude::*;
use crate::routes::path_id;
use crate::workflow::{self, AssignManagerBody, ReviewBody};
use axum::extract::{Path, State};
use axum::routing::put;
use axum::Router;

pub fn router() -> Router<ApplicationState> {
    Router::new()
        .route("/requests/:id", put(review_request))
        .route("/requests/:id/manager", put(assign_manager))
}

async fn assign_manager(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(data): Json<AssignManagerBody>,
) -> Result<Json<Request>> {
    let id = path_id(Request::TABLE, id.as_str())?;

    Ok(Json(
        workflow::assign_manager(&id, data, &principal, state.connection()).await?,
    ))
}

/// Open to admins and the assigned manager, so the admin check lives in the workflow.
async fn review_request(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(id): Path<String>,
    Json(data): Json<ReviewBody>,
) -> Result<Json<Request>> {
    let id = path_id(Request::TABLE, id.as_str())?;
    let request = workflow::review(&id, data, &principal, state.connection()).await?;

    state.notifier().request_reviewed(
        request.requester_id().clone(),
        request.status().as_ref(),
        principal.full_name.as_str(),
    );

    Ok(Json(request))
}

#[cfg(test)]
mod tests {
    use crate::tests::prelude::*;
    use axum::http::StatusCode;
    use axum::BoxError;
    use serde_json::Value;

    async fn leave_request(suite: &TestSuite, cookie: &str) -> String {
        let response = suite
            .client()
            .post("/api/requests")
            .header("cookie", cookie)
            .json(&json!({
                "type": "LEAVE",
                "startDate": "2025-03-10",
                "endDate": "2025-03-14",
                "reason": "Vacation"
            }))
            .send()
            .await;
        assert_eq!(StatusCode::CREATED, response.status());

        response.json::<Value>().await["id"]
            .as_str()
            .unwrap_or_default()
            .to_owned()
    }

    #[tokio::test]
    async fn test_review_once() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let admin = suite.login(ADMIN).await;
        let manager = suite.login(MANAGER).await;
        let inspector = suite.login(INSPECTOR).await;
        let id = leave_request(&suite, inspector.as_str()).await;

        let review = |cookie: &str, status: &str| {
            suite
                .client()
                .put(format!("/api/admin/requests/{id}").as_str())
                .header("cookie", cookie)
                .json(&json!({"status": status, "note": "ok"}))
                .send()
        };

        // neither the requester nor an unassigned manager
        assert_eq!(StatusCode::FORBIDDEN, review(inspector.as_str(), "APPROVED").await.status());
        assert_eq!(StatusCode::FORBIDDEN, review(manager.as_str(), "APPROVED").await.status());
        assert_eq!(StatusCode::BAD_REQUEST, review(admin.as_str(), "PENDING").await.status());

        let response = review(admin.as_str(), "APPROVED").await;
        assert_eq!(StatusCode::OK, response.status());
        let request = response.json::<Value>().await;
        assert_eq!(json!("APPROVED"), request["status"]);
        assert_eq!(json!(suite.admin().id()), request["reviewerId"]);

        assert_eq!(StatusCode::CONFLICT, review(admin.as_str(), "REJECTED").await.status());
        assert_eq!(StatusCode::FORBIDDEN, review(manager.as_str(), "REJECTED").await.status());

        Ok(())
    }

    #[tokio::test]
    async fn test_assigned_manager() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let admin = suite.login(ADMIN).await;
        let manager = suite.login(MANAGER).await;
        let inspector = suite.login(INSPECTOR).await;
        let id = leave_request(&suite, inspector.as_str()).await;

        let assign = |cookie: &str, manager: Value| {
            suite
                .client()
                .put(format!("/api/admin/requests/{id}/manager").as_str())
                .header("cookie", cookie)
                .json(&json!({"managerId": manager}))
                .send()
        };

        let target = json!(suite.manager().id());
        assert_eq!(StatusCode::FORBIDDEN, assign(manager.as_str(), target.clone()).await.status());
        assert_eq!(
            StatusCode::BAD_REQUEST,
            assign(admin.as_str(), json!(suite.inspector().id())).await.status()
        );
        assert_eq!(StatusCode::OK, assign(admin.as_str(), target.clone()).await.status());

        let response = suite
            .client()
            .get(format!("/api/requests/{id}").as_str())
            .header("cookie", manager.as_str())
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());

        let response = suite
            .client()
            .put(format!("/api/admin/requests/{id}").as_str())
            .header("cookie", manager.as_str())
            .json(&json!({"status": "REJECTED"}))
            .send()
            .await;
        assert_eq!(StatusCode::OK, response.status());

        // decided requests can not be handed over anymore
        assert_eq!(StatusCode::CONFLICT, assign(admin.as_str(), target).await.status());

        Ok(())
    }
}
