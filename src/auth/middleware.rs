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

use crate::auth::session::Session;
use crate::database::definitions::account::User;
use crate::database::definitions::fetch;
use crate::prelude::*;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

pub const SESSION_COOKIE: &str = "session";

/// Resolves the session cookie into the `Principal` of the request.
pub async fn require_session<B>(
    State(state): State<ApplicationState>,
    jar: CookieJar,
    mut request: Request<B>,
    next: Next<B>,
) -> Response {
    match jar.get(SESSION_COOKIE) {
        Some(cookie) => match resolve(cookie.value(), state.connection()).await {
            Ok((session, principal)) => {
                let extensions = request.extensions_mut();
                extensions.insert(principal);
                extensions.insert(session);

                next.run(request).await
            }
            Err(error) => error.into_response(),
        },
        None => ApplicationError::Unauthorized.into_response(),
    }
}

async fn resolve(key: &str, connection: &DatabaseConnection) -> Result<(Session, Principal)> {
    let session = Session::validate_session(key, connection).await?;
    // users deleted while logged in lose their session
    let user = fetch::<User>(session.target(), connection)
        .await
        .map_err(|error| match error {
            ApplicationError::NotFound(_) => ApplicationError::Unauthorized,
            error => error,
        })?;

    Ok((session, Principal::from(&user)))
}
