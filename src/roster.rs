use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;

use crate::manifest::ManifestError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub students: Vec<RosterEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Document served when `roster.json` does not exist.
pub fn synthesized_default() -> Value {
    json!({ "students": [] })
}

impl Roster {
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_pretty_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.students.iter().any(|s| s.id == id)
    }

    /// Append a student unless already listed. Returns true when added.
    pub fn register(&mut self, id: &str, name: &str) -> bool {
        if self.contains(id) {
            return false;
        }
        self.students.push(RosterEntry {
            id: id.to_string(),
            name: name.to_string(),
            extra: Map::new(),
        });
        true
    }
}
