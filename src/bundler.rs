use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

pub const DEFAULT_EXTS: &[&str] = &[
    ".py", ".js", ".ts", ".html", ".css", ".json", ".md", ".txt", ".yml", ".yaml", ".toml",
    ".ini", ".cfg",
];
pub const DEFAULT_OUTPUT_DIR: &str = ".ai_zip_output";
pub const DEFAULT_OUTPUT_FILE: &str = "uniflow_snapshot.txt";

/// Rough characters-per-token ratio used for the size estimate.
pub const CHARS_PER_TOKEN: usize = 4;

const GITIGNORE: &str = ".gitignore";

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("project root does not exist: {0}")]
    RootMissing(PathBuf),
    #[error("failed to parse {path}: {source}")]
    Gitignore { path: PathBuf, source: ignore::Error },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub root: PathBuf,
    pub include_exts: Vec<String>,
    pub output_dir: String,
    pub output_file: String,
}

impl BundleOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            include_exts: DEFAULT_EXTS.iter().map(|s| s.to_string()).collect(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleReport {
    pub output_path: PathBuf,
    pub files: Vec<String>,
    pub skipped: Vec<SkippedFile>,
    pub estimated_tokens: usize,
    pub env_file_included: bool,
    pub has_gitignore: bool,
    pub content_hash: String,
}

/// Lower-case, dot-prefixed, de-duplicated extension filter.
pub fn normalize_exts<S: AsRef<str>>(exts: &[S]) -> BTreeSet<String> {
    exts.iter()
        .map(|e| e.as_ref().trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e != ".")
        .map(|e| if e.starts_with('.') { e } else { format!(".{e}") })
        .collect()
}

pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / CHARS_PER_TOKEN
}

fn load_gitignore(root: &Path) -> Result<Option<Gitignore>, BundleError> {
    let path = root.join(GITIGNORE);
    if !path.is_file() {
        return Ok(None);
    }
    let mut builder = GitignoreBuilder::new(root);
    if let Some(source) = builder.add(&path) {
        return Err(BundleError::Gitignore { path, source });
    }
    builder
        .build()
        .map(Some)
        .map_err(|source| BundleError::Gitignore { path, source })
}

fn rel_display(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_env_file(name: &str) -> bool {
    name == ".env" || name.starts_with(".env.")
}

fn ext_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
}

pub fn bundle(opts: &BundleOptions) -> Result<BundleReport, BundleError> {
    if !opts.root.is_dir() {
        return Err(BundleError::RootMissing(opts.root.clone()));
    }
    let root = std::fs::canonicalize(&opts.root).unwrap_or_else(|_| opts.root.clone());
    let include = normalize_exts(&opts.include_exts);

    let output_dir = root.join(&opts.output_dir);
    let output_path = output_dir.join(&opts.output_file);
    std::fs::create_dir_all(&output_dir).map_err(|source| BundleError::Write {
        path: output_dir.clone(),
        source,
    })?;

    let gitignore = load_gitignore(&root)?;
    let keep = |e: &DirEntry| -> bool {
        if e.depth() == 0 {
            return true;
        }
        let p = e.path();
        if p == output_dir {
            return false;
        }
        if e.file_type().is_dir() && e.file_name() == ".git" {
            return false;
        }
        match &gitignore {
            Some(gi) => !gi
                .matched_path_or_any_parents(p, e.file_type().is_dir())
                .is_ignore(),
            None => true,
        }
    };

    let mut all_text = format!("### Project root: {}\n", root.display());
    let mut files = Vec::new();
    let mut skipped = Vec::new();
    let mut env_file_included = false;

    for entry in WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(keep)
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e
                    .path()
                    .map(|p| rel_display(&root, p))
                    .unwrap_or_default();
                warn!(path = %path, error = %e, "skipped");
                skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let Some(ext) = ext_of(path) else {
            continue;
        };
        if !include.contains(&ext) {
            continue;
        }

        let rel = rel_display(&root, path);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %rel, error = %e, "skipped");
                skipped.push(SkippedFile {
                    path: rel,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        all_text.push_str(&format!("\n=== FILE: {rel} ===\n{content}\n"));
        debug!(path = %rel, "added");
        if is_env_file(&entry.file_name().to_string_lossy()) {
            env_file_included = true;
        }
        files.push(rel);
    }

    std::fs::write(&output_path, &all_text).map_err(|source| BundleError::Write {
        path: output_path.clone(),
        source,
    })?;

    let content_hash = format!("sha256:{}", hex::encode(Sha256::digest(all_text.as_bytes())));

    Ok(BundleReport {
        output_path,
        files,
        skipped,
        estimated_tokens: estimate_tokens(&all_text),
        env_file_included,
        has_gitignore: gitignore.is_some(),
        content_hash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_extension_filter() {
        let exts = normalize_exts(&["PY", ".Md", "py", "", " .yaml "]);
        let got: Vec<&str> = exts.iter().map(String::as_str).collect();
        assert_eq!(got, vec![".md", ".py", ".yaml"]);
    }

    #[test]
    fn token_estimate_counts_chars_not_bytes() {
        assert_eq!(estimate_tokens("abcdefgh"), 2);
        assert_eq!(estimate_tokens("課程日曆"), 1);
        assert_eq!(estimate_tokens("abc"), 0);
    }
}
