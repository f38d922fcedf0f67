use axum::http::StatusCode;
use axum::response::Response;

use crate::app::errors::{self, ErrorCode};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn not_found() -> Response {
    errors::json_error(ErrorCode::NotFound, "Recurso no encontrado")
}
