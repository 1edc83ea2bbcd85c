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

use crate::database::definitions::notification::Notification;
use crate::database::definitions::fetch;
use crate::prelude::*;
use crate::routes::path_id;
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::Router;

pub fn router() -> Router<ApplicationState> {
    Router::new()
        .route("/", get(list))
        .route("/:id/read", put(mark_read))
}

async fn list(
    State(state): State<ApplicationState>,
    principal: Principal,
) -> Result<Json<Vec<Notification>>> {
    Ok(Json(
        Notification::of_recipient(&principal.id, state.connection()).await?,
    ))
}

async fn mark_read(
    State(state): State<ApplicationState>,
    principal: Principal,
    Path(id): Path<String>,
) -> Result<Json<Notification>> {
    let id = path_id(Notification::TABLE, id.as_str())?;
    let notification = fetch::<Notification>(&id, state.connection()).await?;
    if !notification.recipient_id().eq(&principal.id) {
        return Err(ApplicationError::Forbidden(
            "the notification belongs to somebody else".to_owned(),
        ));
    }

    Ok(Json(notification.mark_read(state.connection()).await?))
}

#[cfg(test)]
mod tests {
    use crate::database::definitions::notification::{Notification, NotificationKind};
    use crate::tests::prelude::*;
    use axum::http::StatusCode;
    use axum::BoxError;
    use serde_json::Value;

    #[tokio::test]
    async fn test_notifications() -> Result<(), BoxError> {
        let suite = TestSuite::init().await?;
        let inspector = suite.login(INSPECTOR).await;
        let manager = suite.login(MANAGER).await;

        let first = Notification::create(
            suite.inspector().id(),
            NotificationKind::ShiftAssignment,
            "first",
            suite.connection(),
        )
        .await?;
        // timestamps have second precision
        suite
            .connection()
            .query("UPDATE $id SET createdAt = $at")
            .bind(("id", first.id().to_thing()))
            .bind(("at", crate::database::now() - chrono::Duration::hours(1)))
            .await?
            .check()?;
        Notification::create(
            suite.inspector().id(),
            NotificationKind::RequestReviewed,
            "second",
            suite.connection(),
        )
        .await?;

        let response = suite
            .client()
            .get("/api/notifications")
            .header("cookie", inspector.as_str())
            .send()
            .await;
        let notifications = response.json::<Vec<Value>>().await;
        assert_eq!(2, notifications.len());
        assert_eq!(json!("second"), notifications[0]["message"]);
        assert_eq!(json!(false), notifications[1]["read"]);

        let read = |cookie: &str| {
            suite
                .client()
                .put(format!("/api/notifications/{}/read", first.id()).as_str())
                .header("cookie", cookie)
                .send()
        };
        assert_eq!(StatusCode::FORBIDDEN, read(manager.as_str()).await.status());

        let response = read(inspector.as_str()).await;
        assert_eq!(StatusCode::OK, response.status());
        assert_eq!(json!(true), response.json::<Value>().await["read"]);

        Ok(())
    }
}
