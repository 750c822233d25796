//! Error types and HTTP response handling.
//!
//! `ApiError` is what every handler returns. Client mistakes map to 4xx with
//! their message; database, pool and thread-pool failures map to a generic 500
//! and are logged server-side.

use actix_web::{error::BlockingError, http::StatusCode, HttpResponse, ResponseError};
use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::availability::AvailabilityError;
use crate::models::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Request failed boundary validation. 400.
    #[error("{0}")]
    BadRequest(String),

    /// Referenced record or room type does not exist. 404.
    #[error("{0}")]
    NotFound(String),

    /// Request is valid but cannot be honoured in the current state. 409.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] DieselError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Blocking(#[from] BlockingError),
}

impl ApiError {
    /// Turns a unique-constraint violation into a 400 with `message`; any other
    /// error is returned unchanged.
    pub fn on_unique_violation(self, message: &str) -> Self {
        match self {
            ApiError::Database(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                ApiError::BadRequest(message.to_owned())
            }
            err => err,
        }
    }

    /// Turns diesel's `NotFound` into a 404 with `message`.
    pub fn on_not_found(self, message: &str) -> Self {
        match self {
            ApiError::Database(DieselError::NotFound) | ApiError::NotFound(_) => {
                ApiError::NotFound(message.to_owned())
            }
            err => err,
        }
    }
}

impl From<AvailabilityError> for ApiError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::RoomTypeNotFound(_) => ApiError::NotFound("Room type not found".to_string()),
            AvailabilityError::Unavailable { .. } => ApiError::Conflict(err.to_string()),
            AvailabilityError::Infrastructure(e) => ApiError::Database(e),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_)
            | ApiError::Database(DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, _)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) | ApiError::Database(DieselError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Pool(_) | ApiError::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = match self {
            ApiError::Database(DieselError::NotFound) => "Record not found".to_string(),
            ApiError::Database(DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info)) => {
                log::warn!("Rejected by database constraint: {}", info.message());
                "request violates a data constraint".to_string()
            }
            _ if status.is_server_error() => {
                log::error!("Internal error: {}", self);
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };
        HttpResponse::build(status).json(ApiResponse { message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_status() {
        assert_eq!(ApiError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_rows_are_not_found() {
        let err = ApiError::from(DieselError::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = err.on_not_found("Booking not found");
        assert!(matches!(&err, ApiError::NotFound(msg) if msg == "Booking not found"));
    }

    #[test]
    fn other_database_errors_are_internal() {
        let err = ApiError::from(DieselError::RollbackTransaction);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = err.on_unique_violation("already exists");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn check_violations_are_bad_requests() {
        let err = ApiError::from(DieselError::DatabaseError(
            DatabaseErrorKind::CheckViolation,
            Box::new("new row violates check constraint \"bookings_date_order\"".to_string()),
        ));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn availability_errors_map_to_http() {
        let not_found = ApiError::from(AvailabilityError::RoomTypeNotFound("Suite".into()));
        assert!(matches!(&not_found, ApiError::NotFound(msg) if msg == "Room type not found"));

        let unavailable = ApiError::from(AvailabilityError::Unavailable {
            room_type: "Suite".into(),
            requested: 2,
        });
        assert_eq!(unavailable.status_code(), StatusCode::CONFLICT);

        let infra = ApiError::from(AvailabilityError::Infrastructure(DieselError::RollbackTransaction));
        assert_eq!(infra.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
