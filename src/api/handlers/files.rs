use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use std::path::Path;
use tracing::info;

use crate::api::error::{bad_request, internal, ApiError};
use crate::api::types::{parse_body, DeleteRequest, SaveRequest, SharedState};
use crate::backup;
use crate::config::MANIFEST_FILE;
use crate::docroot;

fn encode_content(rel: &str, content: Value) -> Result<String, ApiError> {
    if rel.to_lowercase().ends_with(".json") {
        let value = match content {
            Value::String(s) => serde_json::from_str::<Value>(&s)
                .map_err(|_| bad_request("content is not valid JSON"))?,
            other => other,
        };
        return serde_json::to_string_pretty(&value).map_err(|e| internal(e.to_string()));
    }
    match content {
        Value::String(s) => Ok(s),
        _ => Err(bad_request("content must be string for non-JSON files")),
    }
}

/// Write `req.content` under the document root and return the stored path.
pub fn save_file(docs: &Path, req: SaveRequest) -> Result<Value, ApiError> {
    let raw = req.path.as_deref().unwrap_or("").trim_matches('/');
    if raw.is_empty() {
        return Err(bad_request("missing path"));
    }
    let rel = match docroot::normalize_rel(raw) {
        Some(r) if !r.is_empty() => r,
        _ => return Err(bad_request("invalid path")),
    };
    let target = docs.join(&rel);
    if target.is_dir() {
        return Err(bad_request("path is a directory"));
    }

    let text = encode_content(&rel, req.content)?;

    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| internal(e.to_string()))?;
    }
    let is_manifest = target
        .file_name()
        .map(|n| n == MANIFEST_FILE)
        .unwrap_or(false);
    if is_manifest {
        backup::backup_file(&target, false).map_err(|e| internal(format!("{e:#}")))?;
    }
    std::fs::write(&target, text).map_err(|e| internal(e.to_string()))?;
    info!(path = %rel, "saved");

    Ok(json!({ "status": "success", "path": rel }))
}

/// Remove one file. Directories are refused and left untouched.
pub fn delete_file(docs: &Path, req: DeleteRequest) -> Result<Value, ApiError> {
    let rel = req.path.as_deref().unwrap_or("").trim_matches('/').to_string();
    if rel.is_empty() {
        return Err(bad_request("missing path"));
    }
    let Some(target) = docroot::safe_join(docs, &rel) else {
        return Err(bad_request("invalid path"));
    };

    if std::fs::symlink_metadata(&target).is_err() {
        return Ok(json!({ "status": "success", "deleted": false, "path": rel }));
    }
    if target.is_dir() {
        return Err(bad_request("refuse to delete directory"));
    }
    std::fs::remove_file(&target).map_err(|e| internal(e.to_string()))?;
    info!(path = %rel, "deleted");

    Ok(json!({ "status": "success", "deleted": true, "path": rel }))
}

pub async fn save(State(state): State<SharedState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    save_file(state.layout.docs(), parse_body(&body)).map(Json)
}

pub async fn delete(State(state): State<SharedState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    delete_file(state.layout.docs(), parse_body(&body)).map(Json)
}
