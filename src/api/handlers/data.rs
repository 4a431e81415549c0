use axum::extract::{Path as UrlPath, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::path::Path;

use crate::api::error::{bad_request, internal, not_found, ok_pretty, ApiError};
use crate::api::types::SharedState;
use crate::config::{MANIFEST_FILE, ROSTER_FILE};
use crate::{docroot, manifest, roster};

const FALLBACK_MIME: &str = "text/plain; charset=utf-8";

/// Student id for a missing `.../<sid>/manifest.json`.
fn manifest_owner(req_path: &str) -> &str {
    let parts: Vec<&str> = req_path.split('/').filter(|s| !s.is_empty()).collect();
    if parts.len() >= 2 {
        parts[parts.len() - 2]
    } else {
        "unknown"
    }
}

fn content_type_for(path: &Path) -> String {
    let Some(mime) = mime_guess::from_path(path).first() else {
        return FALLBACK_MIME.to_string();
    };
    let essence = mime.essence_str().to_string();
    let textual = mime.type_().as_str() == "text"
        || essence.ends_with("xml")
        || essence.ends_with("javascript");
    if textual {
        format!("{essence}; charset=utf-8")
    } else {
        essence
    }
}

pub fn read_data(docs: &Path, req_path: &str) -> Result<Response, ApiError> {
    let Some(fp) = docroot::safe_join(docs, req_path) else {
        return Err(bad_request("invalid path"));
    };
    let lower = req_path.to_lowercase();

    if !fp.exists() {
        if lower.ends_with(MANIFEST_FILE) {
            return ok_pretty(&manifest::synthesized_default(manifest_owner(req_path)));
        }
        if lower == ROSTER_FILE {
            return ok_pretty(&roster::synthesized_default());
        }
        return Err(not_found(req_path));
    }
    if !fp.is_file() {
        return Err(not_found(req_path));
    }

    if lower.ends_with(".json") {
        let text = std::fs::read_to_string(&fp).map_err(|e| internal(e.to_string()))?;
        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| internal(format!("stored JSON is invalid: {e}")))?;
        return ok_pretty(&value);
    }

    let bytes = std::fs::read(&fp).map_err(|e| internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, content_type_for(&fp))], bytes).into_response())
}

pub async fn get_data(
    State(state): State<SharedState>,
    UrlPath(req_path): UrlPath<String>,
) -> Result<Response, ApiError> {
    read_data(state.layout.docs(), &req_path)
}
