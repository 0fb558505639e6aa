use actix_web::{
    HttpRequest, HttpResponse, ResponseError,
    error::{JsonPayloadError, QueryPayloadError},
    http::StatusCode,
};
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{db::StoreError, model::attendance::TransitionError};

/// Every failure a handler can report. Rendered as `{"error", "code"}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No (or an invalid) verified identity.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// Missing or malformed input.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// Unique-constraint violation: duplicate email, second check-in of the day.
    #[error("{0}")]
    Duplicate(String),

    /// The request is well formed but clashes with current state.
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Error body as documented in the OpenAPI schema.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Already checked in today")]
    pub error: String,
    #[schema(example = "DUPLICATE")]
    pub code: String,
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Duplicate(_) => "DUPLICATE",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Duplicate(_) | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Internal(msg) = self {
            tracing::error!(error = %msg, "Internal error");
        }

        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UniqueViolation { .. } => ApiError::Duplicate("Record already exists".into()),
            StoreError::ForeignKeyViolation => {
                ApiError::Conflict("Record references missing or dependent rows".into())
            }
            StoreError::Corrupt(msg) => ApiError::Internal(msg),
            StoreError::Database(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<TransitionError> for ApiError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::AlreadyCheckedIn => ApiError::Duplicate(err.to_string()),
            TransitionError::AlreadyCheckedOut => ApiError::Conflict(err.to_string()),
            TransitionError::NotCheckedIn | TransitionError::CheckOutBeforeCheckIn { .. } => {
                ApiError::Validation(err.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

/// `JsonConfig` hook so malformed bodies use the same error shape.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}

/// `QueryConfig` hook so malformed query strings use the same error shape.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}
