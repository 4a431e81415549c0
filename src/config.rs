use std::path::{Path, PathBuf};

pub const DOCS_DIR_NAME: &str = "docs";
pub const ROSTER_FILE: &str = "roster.json";
pub const MANIFEST_FILE: &str = "manifest.json";

/// On-disk layout of a site: the project root and the `docs/` tree under it.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    docs: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let docs = root.join(DOCS_DIR_NAME);
        Self { root, docs }
    }

    /// Layout for a server that only knows its document root.
    pub fn from_docs(docs: impl Into<PathBuf>) -> Self {
        let docs = docs.into();
        let root = docs
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { root, docs }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn docs(&self) -> &Path {
        &self.docs
    }

    pub fn roster_path(&self) -> PathBuf {
        self.docs.join(ROSTER_FILE)
    }

    pub fn manifest_rel(student: &str) -> String {
        format!("students/{student}/{MANIFEST_FILE}")
    }

    pub fn manifest_path(&self, student: &str) -> PathBuf {
        self.docs.join(Self::manifest_rel(student))
    }

    /// Relative (to docs) directory holding a course's files, always '/'-separated.
    pub fn materials_rel(student: &str, course: &str) -> String {
        format!("materials/{student}/{course}")
    }

    pub fn materials_dir(&self, student: &str, course: &str) -> PathBuf {
        self.docs.join(Self::materials_rel(student, course))
    }
}
