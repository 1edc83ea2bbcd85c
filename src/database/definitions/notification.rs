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
use chrono::{DateTime, Utc};
use strum::{AsRefStr, EnumString};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    ShiftAssignment,
    ShiftRejected,
    RequestReviewed,
}

impl NotificationKind {
    /// The key of the mail templates of this kind.
    pub fn template(&self) -> &'static str {
        match self {
            NotificationKind::ShiftAssignment => "shift_assignment",
            NotificationKind::ShiftRejected => "shift_rejected",
            NotificationKind::RequestReviewed => "request_reviewed",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Getters)]
#[serde(rename_all = "camelCase")]
#[get = "pub"]
pub struct Notification {
    id: Id,
    recipient_id: Id,
    kind: NotificationKind,
    message: String,
    #[serde(default)]
    read: bool,
    created_at: DateTime<Utc>,
}

impl Record for Notification {
    const TABLE: &'static str = "notification";
}

impl Notification {
    #[instrument(skip(connection))]
    pub async fn create(
        recipient: &Id,
        kind: NotificationKind,
        message: &str,
        connection: &DatabaseConnection,
    ) -> Result<Notification> {
        let created: Vec<Notification> = sql_span!(
            connection
                .create(Notification::TABLE)
                .content(json!({
                    "recipientId": recipient,
                    "kind": kind,
                    "message": message,
                    "read": false,
                    "createdAt": crate::database::now(),
                }))
                .await?,
            "create notification"
        );

        created
            .into_iter()
            .next()
            .ok_or(ApplicationError::InternalServerError)
    }

    /// The notifications of the user, newest first.
    #[instrument(skip(connection))]
    pub async fn of_recipient(
        recipient: &Id,
        connection: &DatabaseConnection,
    ) -> Result<Vec<Notification>> {
        Ok(sql_span!(
            connection
                .query("SELECT * FROM notification WHERE recipientId = $recipient ORDER BY createdAt DESC")
                .bind(("recipient", recipient.to_string()))
                .await?
                .check()?
                .take(0)?,
            "notifications of recipient"
        ))
    }

    #[instrument(skip(connection))]
    pub async fn mark_read(&self, connection: &DatabaseConnection) -> Result<Notification> {
        let updated: Option<Notification> = sql_span!(
            connection
                .update(self.id.to_thing())
                .merge(json!({ "read": true }))
                .await?,
            "mark notification read"
        );

        updated.ok_or_else(|| ApplicationError::NotFound("notification not found".to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_own() -> std::result::Result<(), axum::BoxError> {
        let connection = crate::database::connect(&Config::default()).await?;
        let anna = Id::new(("account", "anna"));

        let notification = Notification::create(
            &anna,
            NotificationKind::ShiftAssignment,
            "You were assigned",
            &connection,
        )
        .await?;
        Notification::create(
            &Id::new(("account", "ben")),
            NotificationKind::ShiftRejected,
            "Rejected",
            &connection,
        )
        .await?;
        assert!(!notification.read());

        let read = notification.mark_read(&connection).await?;
        assert!(*read.read());

        let own = Notification::of_recipient(&anna, &connection).await?;
        assert_eq!(vec![read], own);
        assert_eq!("SHIFT_ASSIGNMENT", serde_json::to_value(own[0].kind())?);

        Ok(())
    }
}
