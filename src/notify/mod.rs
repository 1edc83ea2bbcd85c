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
use crate::database::definitions::notification::{Notification, NotificationKind};
use crate::notify::mail::Mailer;
use crate::prelude::*;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub mod mail;

/// Fire-and-forget delivery of notifications. Every failure ends up in the log, never at the
/// caller.
#[derive(Clone)]
pub struct Notifier {
    connection: DatabaseConnection,
    mailer: Option<Arc<Mailer>>,
    locale: String,
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("mail", &self.mailer.is_some())
            .field("locale", &self.locale)
            .finish()
    }
}

impl Notifier {
    /// A broken smtp setup disables mail delivery instead of failing the start.
    pub fn new(connection: DatabaseConnection, config: &Config) -> Self {
        let mailer = match config.smtp_credentials() {
            Some((host, username, password)) => {
                let from = config.smtp_from().as_deref().unwrap_or(username);
                match Mailer::new(host, username, password, from) {
                    Ok(mailer) => {
                        info!("Sending mails via {host} as {from}");
                        Some(Arc::new(mailer))
                    }
                    Err(error) => {
                        error!("Mail delivery disabled, invalid smtp setup: {error}");
                        None
                    }
                }
            }
            None => {
                warn!("SMTP is not configured, notifications are stored only");
                None
            }
        };

        Self {
            connection,
            mailer,
            locale: config.mail_locale().clone(),
        }
    }

    /// Spawns the delivery. The handle is only of interest to tests.
    pub fn notify(&self, recipient: Id, kind: NotificationKind, message: String) -> JoinHandle<()> {
        let notifier = self.clone();

        tokio::spawn(async move {
            if let Err(error) = notifier.deliver(&recipient, kind, &message).await {
                error!("Failed to notify {recipient}: {error}");
            }
        })
    }

    pub fn shift_assignment(&self, recipient: Id, building: &str, week: &str, role: &str) -> JoinHandle<()> {
        let message = t!(
            "notification.shift_assignment",
            locale = &self.locale,
            building = building,
            week = week,
            role = role
        );

        self.notify(recipient, NotificationKind::ShiftAssignment, message)
    }

    pub fn shift_rejected(
        &self,
        recipient: Id,
        inspector: &str,
        building: &str,
        week: &str,
        reason: &str,
    ) -> JoinHandle<()> {
        let message = t!(
            "notification.shift_rejected",
            locale = &self.locale,
            inspector = inspector,
            building = building,
            week = week,
            reason = reason
        );

        self.notify(recipient, NotificationKind::ShiftRejected, message)
    }

    pub fn request_reviewed(&self, recipient: Id, status: &str, reviewer: &str) -> JoinHandle<()> {
        let message = t!(
            "notification.request_reviewed",
            locale = &self.locale,
            status = status,
            reviewer = reviewer
        );

        self.notify(recipient, NotificationKind::RequestReviewed, message)
    }

    #[instrument(skip(self))]
    async fn deliver(&self, recipient: &Id, kind: NotificationKind, message: &str) -> Result<()> {
        Notification::create(recipient, kind, message, &self.connection).await?;

        if let Some(mailer) = self.mailer.as_ref() {
            let user = fetch::<User>(recipient, &self.connection).await?;
            match user.email() {
                Some(email) => mailer.send(email, kind, message, &self.locale).await?,
                None => debug!("{recipient} has no mail address"),
            }
        }

        Ok(())
    }
}
