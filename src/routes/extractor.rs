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

use crate::prelude::*;
use async_trait::async_trait;
use axum::body::HttpBody;
use axum::extract::FromRequest;
use axum::http::Request;
use axum::response::IntoResponse;
use axum::BoxError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// A json body which has passed its `Validate` rules. Every rejection is a `400` with all messages
/// joined.
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for Json<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
{
    type Rejection = ApplicationError;

    async fn from_request(request: Request<B>, state: &S) -> Result<Self> {
        let axum::Json(value) = axum::Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| ApplicationError::BadRequest(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| ApplicationError::BadRequest(join_messages(&errors)))?;

        Ok(Self(value))
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}

fn collect_messages(errors: &ValidationErrors, messages: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(errors) => {
                messages.extend(errors.iter().map(|error| match error.message.as_ref() {
                    Some(message) => message.to_string(),
                    None => format!("{field} is invalid"),
                }))
            }
            ValidationErrorsKind::Struct(errors) => collect_messages(errors, messages),
            ValidationErrorsKind::List(errors) => errors
                .values()
                .for_each(|errors| collect_messages(errors, messages)),
        }
    }
}

pub fn join_messages(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect_messages(errors, &mut messages);
    messages.sort();
    messages.dedup();

    messages.join(", ")
}
