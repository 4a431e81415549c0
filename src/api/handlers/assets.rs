use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::api::error::{internal, not_found, ApiError};
use crate::api::types::SharedState;

/// Landing pages tried in order for `GET /`.
const LANDING_PAGES: &[&str] = &["teacher.html", "index.html"];

pub async fn landing(State(state): State<SharedState>) -> Result<Response, ApiError> {
    for name in LANDING_PAGES {
        let p = state.layout.docs().join(name);
        if p.is_file() {
            let bytes = std::fs::read(&p).map_err(|e| internal(e.to_string()))?;
            return Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], bytes).into_response());
        }
    }
    Err(not_found("/"))
}
