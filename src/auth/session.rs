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

use crate::database::ALPHANUMERIC;
use crate::prelude::*;
use chrono::Utc;
use std::future::{Future, IntoFuture};
use std::pin::Pin;

/// A login session. The key of the id is the value of the session cookie.
#[derive(Clone, Debug, Getters, Deserialize, Serialize)]
pub struct Session {
    pub id: Id,
    #[get = "pub"]
    target: Id,
    iat: i64,
    exp: i64,
}

impl Session {
    /// Resolves the session of the given key, `Unauthorized` if it is unknown or expired.
    #[instrument(skip_all)]
    pub async fn validate_session(key: &str, connection: &DatabaseConnection) -> Result<Session> {
        let id = Id::try_from(("session", key)).map_err(|_| ApplicationError::Unauthorized)?;
        let session: Option<Session> = sql_span!(connection.select(id.to_thing()).await?, "session");

        match session {
            Some(session) => {
                session.is_valid(connection).await?;
                Ok(session)
            }
            None => Err(ApplicationError::Unauthorized),
        }
    }

    #[instrument(skip_all)]
    pub async fn is_valid(&self, connection: &DatabaseConnection) -> Result<()> {
        if Utc::now().timestamp() >= self.exp {
            // the session is not anymore valid, so we end it.
            self.end(connection).await?;

            Err(ApplicationError::Unauthorized)
        } else {
            Ok(())
        }
    }

    /// Ends the given session
    #[instrument(skip_all)]
    pub async fn end(&self, connection: &DatabaseConnection) -> Result<()> {
        let _: Option<Session> = sql_span!(connection.delete(self.id.to_thing()).await?, "end session");

        Ok(())
    }

    /// Deletes every expired session, returns how many were removed.
    #[instrument(skip_all)]
    pub async fn cleanup(connection: &DatabaseConnection) -> Result<usize> {
        let removed: Vec<Session> = sql_span!(
            connection
                .query("DELETE session WHERE exp <= $now RETURN BEFORE")
                .bind(("now", Utc::now().timestamp()))
                .await?
                .check()?
                .take(0)?,
            "cleanup sessions"
        );

        Ok(removed.len())
    }

    pub fn key(&self) -> &str {
        self.id.id.as_str()
    }
}

#[derive(Clone, Debug)]
pub struct EndSession<'a> {
    target: &'a Id,
    connection: &'a DatabaseConnection,
}

impl<'a> EndSession<'a> {
    pub fn new(target: &'a Id, connection: &'a DatabaseConnection) -> Self {
        Self { target, connection }
    }
}

impl<'a> IntoFuture for EndSession<'a> {
    type Output = Result<()>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            sql_span!(
                self.connection
                    .query("DELETE session WHERE target = $target")
                    .bind(("target", self.target.to_string()))
                    .await?
                    .check()?,
                "end sessions"
            );

            Ok(())
        })
    }
}

#[derive(Clone, Debug)]
pub struct WriteSession<'a> {
    target: &'a Id,
    length: i64,
    connection: &'a DatabaseConnection,
}

impl<'a> WriteSession<'a> {
    pub fn new(target: &'a Id, length: i64, connection: &'a DatabaseConnection) -> Self {
        Self {
            target,
            length,
            connection,
        }
    }
}

impl<'a> IntoFuture for WriteSession<'a> {
    type Output = Result<Session>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send + Sync + 'a>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move {
            let iat = Utc::now().timestamp();
            let exp = iat + self.length;
            // generate session id
            let key = nanoid::nanoid!(64, &ALPHANUMERIC);
            let id = Id::new(("session", key.as_str()));

            // end currently active sessions for the target
            EndSession::new(self.target, self.connection).await?;

            let session: Option<Session> = sql_span!(
                self.connection
                    .create(id.to_thing())
                    .content(json!({
                        "target": self.target,
                        "iat": iat,
                        "exp": exp,
                    }))
                    .await?,
                "start session"
            );

            session.ok_or(ApplicationError::InternalServerError)
        })
    }
}
