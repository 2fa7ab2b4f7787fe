//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`. Policy denials (403) are never conflated with
//! missing resources (404), and internal detail never reaches the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::ApiResponse;
use crate::services::aggregation::AggregationError;
use crate::services::auth::AuthError;
use crate::services::ledger::LedgerError;
use crate::services::policy::Deny;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input caught at the boundary.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid identity assertion.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Authenticated but disallowed by policy.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced resource is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Uniqueness conflict (duplicate email).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Resource not found".to_owned()),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Database(other),
        }
    }
}

impl From<Deny> for AppError {
    fn from(deny: Deny) -> Self {
        Self::Forbidden(deny.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(e) => Self::Validation(e.to_string()),
            AuthError::WeakPassword(message) => Self::Validation(message),
            AuthError::InvalidCredentials => Self::Unauthenticated("Invalid credentials".to_owned()),
            AuthError::UserNotFound => Self::NotFound("User not found".to_owned()),
            AuthError::UserAlreadyExists => {
                Self::Conflict("User with this email already exists".to_owned())
            }
            AuthError::Token(e) => Self::Internal(e.to_string()),
            AuthError::Repository(e) => Self::Database(e),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_owned()),
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::StoreNotFound => Self::NotFound("Store not found".to_owned()),
            LedgerError::RatingNotFound => Self::NotFound("Rating not found".to_owned()),
            LedgerError::InvalidValue(e) => Self::Validation(e.to_string()),
            LedgerError::Repository(e) => Self::Database(e),
        }
    }
}

impl From<AggregationError> for AppError {
    fn from(err: AggregationError) -> Self {
        match err {
            AggregationError::StoreNotFound => Self::NotFound("Store not found".to_owned()),
            AggregationError::Repository(e) => Self::Database(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry; everything else is client-caused.
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_owned(),
            Self::Validation(m)
            | Self::Unauthenticated(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::Conflict(m) => m,
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use storepulse_core::Role;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation("bad".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Unauthenticated("no token".to_owned())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("nope".to_owned())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::NotFound("missing".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Conflict("dup".to_owned())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Internal("boom".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_deny_maps_to_forbidden_not_unauthorized() {
        let err = AppError::from(Deny::RoleMismatch {
            required: Role::Admin,
        });
        assert_eq!(get_status(err), StatusCode::FORBIDDEN);

        let err = AppError::from(Deny::NoStoreAssociated);
        assert_eq!(get_status(err), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        assert_eq!(
            get_status(AppError::from(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::from(RepositoryError::Conflict("dup".to_owned()))),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let response = AppError::Internal("connection string with password".to_owned())
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        // Body content is the generic envelope; detail stays in logs.
    }
}
