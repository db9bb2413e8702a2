//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use quota_core::DomainError;
use quota_core::domain::{Allowance, FeatureKind, UsageStatus};
use quota_core::ports::IdentityError;
use quota_shared::ErrorResponse;
use std::fmt;

use crate::handlers::usage_view;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// Not a failure of the service: the caller used up today's allowance.
    LimitReached {
        kind: FeatureKind,
        status: UsageStatus,
    },
    Conflict(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::LimitReached { kind, status } => {
                write!(f, "Daily limit reached for {} ({} used)", kind, status.used)
            }
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::LimitReached { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::LimitReached { kind, status } => {
                let detail = match status.limit {
                    Allowance::Limited(max) => {
                        format!("Daily limit of {} {} attempts reached.", max, kind)
                    }
                    Allowance::Unlimited => format!("Daily limit for {} reached.", kind),
                };
                ErrorResponse::limit_reached(detail, usage_view(status))
            }
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Missing => AppError::BadRequest("Missing userKey".to_string()),
            IdentityError::Invalid(e) => AppError::BadRequest(e.to_string()),
            IdentityError::Backend(msg) => {
                tracing::error!("Identity backend error: {}", msg);
                AppError::Internal("Identity resolution failed".to_string())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
