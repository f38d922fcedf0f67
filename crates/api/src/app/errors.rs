use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use corporativo_infra::services::ServiceError;

use crate::app::dto::ApiResponse;

/// Machine-readable error code carried in the envelope's `error` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn json_error(code: ErrorCode, message: impl Into<String>) -> Response {
    (code.status(), Json(ApiResponse::error(code, message))).into_response()
}

/// Map a service failure to an enveloped response.
///
/// Internal failures are logged and answered with `internal_message`; their
/// details never reach the caller.
pub fn service_error_to_response(err: ServiceError, internal_message: &str) -> Response {
    match err {
        ServiceError::Validation(errors) => json_error(ErrorCode::BadRequest, errors.to_string()),
        ServiceError::BadRequest(msg) => json_error(ErrorCode::BadRequest, msg),
        ServiceError::NotFound(msg) => json_error(ErrorCode::NotFound, msg),
        ServiceError::Conflict(msg) => json_error(ErrorCode::Conflict, msg),
        err @ (ServiceError::Store(_) | ServiceError::Internal(_)) => {
            tracing::error!(error = %err, "{internal_message}");
            json_error(ErrorCode::Internal, internal_message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corporativo_core::ValidationErrors;
    use corporativo_infra::record_store::StoreError;

    #[test]
    fn service_errors_map_to_status_codes() {
        let cases = [
            (
                ServiceError::Validation(ValidationErrors::from(vec!["x".to_string()])),
                StatusCode::BAD_REQUEST,
            ),
            (ServiceError::bad_request("b"), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("n"), StatusCode::NOT_FOUND),
            (ServiceError::conflict("c"), StatusCode::CONFLICT),
            (
                ServiceError::Store(StoreError::Backend("db down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(service_error_to_response(err, "Error").status(), status);
        }
    }
}
