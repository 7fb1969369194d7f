use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Address could not be resolved: {0}")]
    AddressUnresolvable(String),

    #[error("No search location available: provide an address or set one on your profile")]
    NoLocationAvailable,

    #[error("Invalid page value: {0}")]
    InvalidPage(String),

    #[error("Invalid radius or budget: {0}")]
    InvalidRadiusOrBudget(String),

    #[error("Job is not open")]
    NotOpen,

    #[error("Job has already been assigned")]
    AlreadyAssigned,

    #[error("Job is not in process")]
    NotInProcess,

    #[error("Job can no longer be edited")]
    JobLocked,

    #[error("Job is not finished yet")]
    NotFinished,

    #[error("Review for this job already exists")]
    ReviewExists,

    #[error("Access denied: {0}")]
    RoleNotAllowed(String),

    #[error("Access denied: you are not the creator of this job")]
    NotJobOwner,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::AddressUnresolvable(_) => "address_unresolvable",
            Error::NoLocationAvailable => "no_location_available",
            Error::InvalidPage(_) => "invalid_page",
            Error::InvalidRadiusOrBudget(_) => "invalid_radius_or_budget",
            Error::NotOpen => "not_open",
            Error::AlreadyAssigned => "already_assigned",
            Error::NotInProcess => "not_in_process",
            Error::JobLocked => "job_locked",
            Error::NotFinished => "not_finished",
            Error::ReviewExists => "review_exists",
            Error::RoleNotAllowed(_) => "role_not_allowed",
            Error::NotJobOwner => "not_job_owner",
            Error::BadRequest(_) => "bad_request",
            Error::Unauthorized(_) => "unauthorized",
            Error::NotFound(_) => "not_found",
            Error::StoreUnavailable(_) => "store_unavailable",
            Error::Database(_) => "database",
            Error::Validation(_) => "validation",
            Error::Json(_) => "json",
            Error::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::AddressUnresolvable(_)
            | Error::NoLocationAvailable
            | Error::InvalidPage(_)
            | Error::InvalidRadiusOrBudget(_)
            | Error::BadRequest(_)
            | Error::Validation(_)
            | Error::Json(_) => StatusCode::BAD_REQUEST,
            Error::NotOpen
            | Error::AlreadyAssigned
            | Error::NotInProcess
            | Error::JobLocked
            | Error::NotFinished
            | Error::ReviewExists => StatusCode::CONFLICT,
            Error::RoleNotAllowed(_) | Error::NotJobOwner => StatusCode::FORBIDDEN,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::Config(_) | Error::Database(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let error_message = match &self {
            Error::Database(err) => {
                tracing::error!("Database error: {}", err);
                "An unexpected error occurred".to_string()
            }
            Error::Internal(msg) | Error::Config(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An unexpected error occurred".to_string()
            }
            Error::StoreUnavailable(msg) => {
                tracing::warn!("Store unavailable: {}", msg);
                self.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({ "error": error_message, "code": self.code() }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::WorkerCrashed => {
                Error::StoreUnavailable(err.to_string())
            }
            sqlx::Error::Io(io) => Error::StoreUnavailable(io.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::BadRequest(format!("Resource already exists: {}", db.message()))
            }
            other => Error::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_machine_errors_are_conflicts() {
        for err in [
            Error::NotOpen,
            Error::AlreadyAssigned,
            Error::NotInProcess,
            Error::JobLocked,
        ] {
            assert_eq!(err.status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn pool_timeout_is_retryable_store_failure() {
        let err: Error = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, Error::StoreUnavailable(_)));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert_eq!(err.code(), "not_found");
    }
}
