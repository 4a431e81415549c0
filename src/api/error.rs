use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// A failed API call: status code plus the JSON body the client sees.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: serde_json::Value,
}

pub fn err(status: StatusCode, message: impl Into<String>) -> ApiError {
    let message = message.into();
    if status.is_server_error() {
        error!(status = status.as_u16(), %message, "request failed");
    } else {
        warn!(status = status.as_u16(), %message, "request rejected");
    }
    ApiError {
        status,
        body: json!({ "status": "error", "message": message }),
    }
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    err(StatusCode::BAD_REQUEST, message)
}

pub fn internal(message: impl Into<String>) -> ApiError {
    err(StatusCode::INTERNAL_SERVER_ERROR, message)
}

/// 404 for a data path that neither exists nor has a synthesized default.
pub fn not_found(path: &str) -> ApiError {
    warn!(%path, "not found");
    ApiError {
        status: StatusCode::NOT_FOUND,
        body: json!({ "error": "Not Found", "path": path }),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Pretty-printed JSON, two-space indent, non-ASCII left as is.
pub fn ok_pretty(value: &serde_json::Value) -> Result<Response, ApiError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, JSON_UTF8)], text).into_response())
}
