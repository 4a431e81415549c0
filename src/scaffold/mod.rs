mod add;
pub mod naming;
mod site;
pub mod templates;

pub use add::{AddOutcome, AddRequest, BatchReport, BatchSkip};
pub use site::NewStudentOutcome;

use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::config::Layout;
use crate::manifest::{Format, ManifestError};

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("--external-url is required for format=link")]
    MissingExternalUrl,
    #[error("no --src given; only format=html can be generated from the template (got {})", .0.as_str())]
    MissingSource(Format),
    #[error("source file not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("source directory does not exist: {0}")]
    SourceDirMissing(PathBuf),
    #[error("invalid {what} {value:?}: use letters, digits, '-', '_' or '.'")]
    InvalidKey { what: &'static str, value: String },
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("{op} {path}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to back up {path}: {source:#}")]
    Backup {
        path: PathBuf,
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScaffoldError>;

/// Runs scaffold commands against one site layout.
///
/// With `dry_run` set every write, copy and backup is logged instead of
/// performed.
#[derive(Debug, Clone)]
pub struct Scaffolder {
    layout: Layout,
    dry_run: bool,
    today: NaiveDate,
}

impl Scaffolder {
    pub fn new(layout: Layout, dry_run: bool) -> Self {
        Self {
            layout,
            dry_run,
            today: Local::now().date_naive(),
        }
    }

    /// Pin "today" (sample dates, new-student days).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if self.dry_run {
            return Ok(());
        }
        std::fs::create_dir_all(dir).map_err(|source| ScaffoldError::Io {
            op: "create directory",
            path: dir.to_path_buf(),
            source,
        })
    }

    fn write_text(&self, path: &Path, text: &str) -> Result<()> {
        if self.dry_run {
            info!(path = %path.display(), "[dry] write");
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent)?;
        }
        std::fs::write(path, text).map_err(|source| ScaffoldError::Io {
            op: "write",
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "write");
        Ok(())
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        if self.dry_run {
            info!(src = %src.display(), dst = %dst.display(), "[dry] copy");
            return Ok(());
        }
        if let Some(parent) = dst.parent() {
            self.ensure_dir(parent)?;
        }
        std::fs::copy(src, dst).map_err(|source| ScaffoldError::Io {
            op: "copy",
            path: src.to_path_buf(),
            source,
        })?;
        info!(src = %src.display(), dst = %dst.display(), "copy");
        Ok(())
    }
}

fn check_key(what: &'static str, value: &str) -> Result<()> {
    if naming::is_valid_key(value) {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidKey {
            what,
            value: value.to_string(),
        })
    }
}
