//! HTTP mapping of console errors.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use nsc_core::{ConsoleError, ErrorKind};

/// Error body: `{"kind": "StoreError", "message": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError(pub ConsoleError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::ValidationError | ErrorKind::QuerySyntaxError => StatusCode::BAD_REQUEST,
            ErrorKind::ReferenceError => StatusCode::NOT_FOUND,
            ErrorKind::FieldError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::StoreError => StatusCode::BAD_GATEWAY,
            ErrorKind::ConnectionError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::ConfigError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ConsoleError> for ApiError {
    fn from(err: ConsoleError) -> Self {
        Self(err)
    }
}

/// Malformed request bodies are validation errors like any other bad input.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ConsoleError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            kind: self.0.kind(),
            message: self.0.message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ConsoleError::validation("x"), StatusCode::BAD_REQUEST),
            (ConsoleError::query_syntax("x"), StatusCode::BAD_REQUEST),
            (ConsoleError::reference("x"), StatusCode::NOT_FOUND),
            (ConsoleError::field("x"), StatusCode::UNPROCESSABLE_ENTITY),
            (ConsoleError::store("x"), StatusCode::BAD_GATEWAY),
            (ConsoleError::connection("x"), StatusCode::SERVICE_UNAVAILABLE),
            (ConsoleError::config("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }
}
