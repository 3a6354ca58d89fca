//! Error responses.
//!
//! Every failure leaves the API as `{ "error": CODE, "message": ... }` with
//! the status the error maps to.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use stockwise_core::StockError;
use stockwise_shared::AppError;
use validator::ValidationErrors;

/// Error returned by handlers and middleware.
#[derive(Debug)]
pub enum ApiError {
    /// Domain failure from the ledger or catalogue.
    Stock(StockError),
    /// Request-level failure (auth, rate limiting, malformed input).
    App(AppError),
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        let code = match self {
            Self::Stock(e) => e.http_status_code(),
            Self::App(e) => e.status_code(),
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Stable machine code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Stock(e) => e.error_code(),
            Self::App(e) => e.error_code(),
        }
    }
}

impl From<StockError> for ApiError {
    fn from(err: StockError) -> Self {
        Self::Stock(err)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(err: ValidationErrors) -> Self {
        Self::App(AppError::Validation(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            match &self {
                Self::Stock(e) => tracing::error!(error = %e, "request failed"),
                Self::App(e) => tracing::error!(error = %e, "request failed"),
            }
            "An internal error occurred".to_string()
        } else {
            match &self {
                Self::Stock(e) => e.to_string(),
                Self::App(e) => e.to_string(),
            }
        };

        let mut response =
            (status, Json(json!({ "error": self.code(), "message": message }))).into_response();

        if let Self::App(AppError::RateLimited { retry_after_secs }) = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }

        response
    }
}
