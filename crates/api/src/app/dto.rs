use axum::Json;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use corporativo_infra::record_store::Cursor;
use corporativo_infra::services::ListParams;

use crate::app::errors::{self, ErrorCode};

pub const MSG_BODY_REQUIRED: &str = "Cuerpo de la petición es requerido";
pub const MSG_BODY_INVALID: &str = "El cuerpo de la petición no es un JSON válido";
pub const MSG_LIMIT_INVALID: &str = "El parámetro limit debe ser un entero positivo";
pub const MSG_CURSOR_INVALID: &str = "El parámetro lastEvaluatedKey no es válido";

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error: Some(code.as_str().to_string()),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Query string of the list endpoints.
///
/// Values are kept raw so that bad input becomes an enveloped 400 rather
/// than a framework rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub limit: Option<String>,
    pub last_evaluated_key: Option<String>,
}

impl ListQuery {
    pub fn into_params(self) -> Result<ListParams, Response> {
        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => Some(n),
                _ => return Err(errors::json_error(ErrorCode::BadRequest, MSG_LIMIT_INVALID)),
            },
        };

        let cursor = match self.last_evaluated_key.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                Cursor::parse(raw)
                    .map_err(|_| errors::json_error(ErrorCode::BadRequest, MSG_CURSOR_INVALID))?,
            ),
        };

        Ok(ListParams { limit, cursor })
    }
}

/// Decode a JSON request body.
///
/// The body is read raw so that a missing body, malformed JSON and wrongly
/// typed fields all map to the same enveloped 400.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(errors::json_error(ErrorCode::BadRequest, MSG_BODY_REQUIRED));
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "rejected request body");
        errors::json_error(ErrorCode::BadRequest, MSG_BODY_INVALID)
    })
}
