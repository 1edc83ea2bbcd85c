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

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Internal error occurred")]
    InternalServerError,
    #[error(transparent)]
    SurrealdbError(#[from] surrealdb::Error),
    #[error(transparent)]
    ConfigError(#[from] envy::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Password hashing failed: {0}")]
    PasswordHashError(#[from] argon2::password_hash::Error),
    #[error(transparent)]
    SMTPError(#[from] lettre::transport::smtp::Error),
    #[error(transparent)]
    MailError(#[from] lettre::error::Error),
    #[error(transparent)]
    MailAddressError(#[from] lettre::address::AddressError),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApplicationErrorResponse {
    pub error: String,
}

pub type Result<T> = std::result::Result<T, ApplicationError>;

macro_rules! log_test_error {
    ($error:expr) => {
        #[cfg(test)]
        {
            println!("Err: {:?}", $error);
        }
    };
}

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        match self {
            ApplicationError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                axum::Json(json!({"error": "Unauthorized"})),
            ),
            ApplicationError::BadRequest(error) => {
                log_test_error!(error);
                (StatusCode::BAD_REQUEST, axum::Json(json!({ "error": error })))
            }
            ApplicationError::Forbidden(error) => {
                log_test_error!(error);
                (StatusCode::FORBIDDEN, axum::Json(json!({ "error": error })))
            }
            ApplicationError::NotFound(error) => {
                log_test_error!(error);
                (StatusCode::NOT_FOUND, axum::Json(json!({ "error": error })))
            }
            ApplicationError::Conflict(error) => {
                log_test_error!(error);
                (StatusCode::CONFLICT, axum::Json(json!({ "error": error })))
            }
            _ => {
                error!("Err: {}", self.to_string());

                #[cfg(test)]
                {
                    println!("Err: {:?}", self.to_string());
                }

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({"error": "Error occurred while processing the request"})),
                )
            }
        }
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApplicationError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                ApplicationError::BadRequest("bad".to_owned()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApplicationError::Forbidden("no".to_owned()),
                StatusCode::FORBIDDEN,
            ),
            (
                ApplicationError::NotFound("gone".to_owned()),
                StatusCode::NOT_FOUND,
            ),
            (
                ApplicationError::Conflict("taken".to_owned()),
                StatusCode::CONFLICT,
            ),
            (
                ApplicationError::InternalServerError,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(status, error.into_response().status());
        }
    }
}
