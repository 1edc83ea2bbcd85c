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

use crate::database::definitions::notification::NotificationKind;
use crate::prelude::*;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(host: &str, username: &str, password: &str, from: &str) -> Result<Self> {
        let from = from.parse()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(Credentials::new(username.to_owned(), password.to_owned()))
            .build();

        Ok(Self { transport, from })
    }

    #[instrument(skip(self, message))]
    pub async fn send(
        &self,
        recipient: &str,
        kind: NotificationKind,
        message: &str,
        locale: &str,
    ) -> Result<()> {
        let mail = compose(self.from.clone(), recipient.parse()?, kind, message, locale)?;

        self.transport.send(mail).await?;
        debug!("Delivered {} mail", kind.as_ref());

        Ok(())
    }
}

fn compose(
    from: Mailbox,
    to: Mailbox,
    kind: NotificationKind,
    message: &str,
    locale: &str,
) -> Result<Message> {
    Ok(Message::builder()
        .from(from)
        .to(to)
        .subject(t!(
            format!("mail.{}.title", kind.template()).as_str(),
            locale = locale
        ))
        .body(t!(
            format!("mail.{}.body", kind.template()).as_str(),
            locale = locale,
            message = message
        ))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose() {
        let mail = compose(
            "shiftboard@example.com".parse().unwrap(),
            "anna@example.com".parse().unwrap(),
            NotificationKind::ShiftRejected,
            "Ben rejected week 2025-03",
            "en",
        )
        .unwrap();
        let raw = String::from_utf8(mail.formatted()).unwrap();

        assert!(raw.contains("To: anna@example.com"));
        assert!(raw.contains("Subject: A shift assignment was rejected"));
        assert!(raw.contains("Ben rejected week 2025-03"));
    }

    #[tokio::test]
    async fn test_sender() {
        assert!(Mailer::new("smtp.example.com", "apikey", "secret", "shiftboard@example.com").is_ok());
        assert!(matches!(
            Mailer::new("smtp.example.com", "apikey", "secret", "apikey"),
            Err(ApplicationError::MailAddressError(_))
        ));
    }

    #[test]
    fn test_invalid_address() {
        assert!(matches!(
            "not an address".parse::<Mailbox>().map_err(ApplicationError::from),
            Err(ApplicationError::MailAddressError(_))
        ));
    }
}
