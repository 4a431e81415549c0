use chrono::{Duration, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_COURSE_COLOR: &str = "#333";

/// Version stamped by the scaffolder.
pub const SCAFFOLD_VERSION: u32 = 1;
/// Version of the manifest the server synthesizes for a missing file.
pub const SYNTHESIZED_VERSION: u32 = 3;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not a valid manifest: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("day {date} references unknown course {course:?}")]
    UnknownCourse { date: String, course: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Html,
    Pdf,
    Image,
    Link,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Html => "html",
            Format::Pdf => "pdf",
            Format::Image => "image",
            Format::Link => "link",
        }
    }

    /// Extension used when a source file carries none.
    pub fn default_ext(self) -> &'static str {
        match self {
            Format::Html => ".html",
            Format::Pdf => ".pdf",
            Format::Image | Format::Link => ".png",
        }
    }

    /// `ext` includes the leading dot; unknown extensions map to `Link`.
    pub fn guess_from_ext(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            ".html" | ".htm" => Format::Html,
            ".pdf" => Format::Pdf,
            ".png" | ".jpg" | ".jpeg" | ".webp" | ".gif" => Format::Image,
            _ => Format::Link,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Material,
    Homework,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Material => "material",
            Kind::Homework => "homework",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Course {
    pub fn new(label: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: Some(color.into()),
            extra: Map::new(),
        }
    }
}

/// A single material/homework slot in object form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub format: Format,
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// What one course holds on one day.
///
/// Kept as raw JSON: the scaffolder writes `{format, url}` slot objects while
/// the admin page writes lists of `{title, path}` items, and both (plus any
/// `null`s it leaves behind) must survive a load/save cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayEntry {
    pub fields: Map<String, Value>,
}

impl DayEntry {
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }

    pub fn set_title(&mut self, title: &str) {
        self.fields.insert("title".into(), json!(title));
    }

    pub fn slot(&self, kind: Kind) -> Option<Slot> {
        let v = self.fields.get(kind.as_str())?;
        serde_json::from_value(v.clone()).ok()
    }

    pub fn set_slot(&mut self, kind: Kind, format: Format, url: &str, title: Option<&str>) {
        match self.fields.get_mut(kind.as_str()) {
            Some(Value::Object(obj)) => {
                obj.insert("format".into(), json!(format.as_str()));
                obj.insert("url".into(), json!(url));
            }
            Some(Value::Array(items)) => {
                let name = url.rsplit('/').next().unwrap_or(url);
                items.push(json!({
                    "title": title.unwrap_or(name),
                    "path": url,
                    "format": format.as_str(),
                }));
            }
            _ => {
                self.fields.insert(
                    kind.as_str().into(),
                    json!({ "format": format.as_str(), "url": url }),
                );
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub student: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub courses: IndexMap<String, Course>,
    #[serde(default)]
    pub days: IndexMap<String, IndexMap<String, DayEntry>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// Top-level key order of the document this was read from.
    #[serde(skip)]
    key_order: Vec<String>,
}

fn default_version() -> u32 {
    SCAFFOLD_VERSION
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ManifestError> {
    // chrono accepts single-digit fields; the manifest keys must not.
    if s.len() != 10 {
        return Err(ManifestError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| ManifestError::InvalidDate(s.to_string()))
}

pub fn default_courses() -> IndexMap<String, Course> {
    let mut courses = IndexMap::new();
    courses.insert("english".to_string(), Course::new("英文", "#1d4ed8"));
    courses.insert("math".to_string(), Course::new("數學", "#059669"));
    courses
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Document served for a student whose manifest does not exist yet.
pub fn synthesized_default(student: &str) -> Value {
    json!({
        "version": SYNTHESIZED_VERSION,
        "student": student,
        "displayName": student,
        "courses": { "english": { "label": "英文" }, "math": { "label": "數學" } },
        "types": { "material": "教材", "homework": "作業" },
        "days": {}
    })
}

impl Manifest {
    /// Fresh manifest with the default courses and two empty days.
    pub fn for_new_student(student: &str, today: NaiveDate) -> Self {
        let mut days = IndexMap::new();
        days.insert(today.format(DATE_FORMAT).to_string(), IndexMap::new());
        days.insert(
            (today - Duration::days(7)).format(DATE_FORMAT).to_string(),
            IndexMap::new(),
        );
        Self {
            version: SCAFFOLD_VERSION,
            student: student.to_string(),
            display_name: Some(capitalize(student)),
            courses: default_courses(),
            days,
            extra: Map::new(),
            key_order: Vec::new(),
        }
    }

    /// Stand-in used when `add` runs before the student was scaffolded.
    pub fn placeholder(student: &str) -> Self {
        Self {
            version: SCAFFOLD_VERSION,
            student: student.to_string(),
            display_name: None,
            courses: IndexMap::new(),
            days: IndexMap::new(),
            extra: Map::new(),
            key_order: Vec::new(),
        }
    }

    /// Parse a manifest, remembering where its top-level keys were.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let key_order = match &value {
            Value::Object(fields) => fields.keys().cloned().collect(),
            _ => Vec::new(),
        };
        let mut manifest: Self = serde_json::from_value(value)?;
        manifest.key_order = key_order;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Option<Self>, ManifestError> {
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_err = |source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        };
        let value: Value = serde_json::from_str(&text).map_err(parse_err)?;
        Self::from_value(value).map(Some).map_err(parse_err)
    }

    /// Pretty JSON with the loaded document's top-level keys in their
    /// original positions; keys it did not have follow in field order.
    pub fn to_pretty_json(&self) -> Result<String, ManifestError> {
        let Value::Object(fields) = serde_json::to_value(self)? else {
            return Ok(serde_json::to_string_pretty(self)?);
        };
        let mut ordered = Map::new();
        for key in &self.key_order {
            if let Some(v) = fields.get(key) {
                ordered.insert(key.clone(), v.clone());
            }
        }
        for (key, v) in fields {
            if !ordered.contains_key(&key) {
                ordered.insert(key, v);
            }
        }
        Ok(serde_json::to_string_pretty(&Value::Object(ordered))?)
    }

    /// Register `course` if missing. Returns true when it was added.
    pub fn ensure_course(&mut self, course: &str) -> bool {
        if self.courses.contains_key(course) {
            return false;
        }
        self.courses
            .insert(course.to_string(), Course::new(course, DEFAULT_COURSE_COLOR));
        true
    }

    /// Point `days[date][course][kind]` at `url`, registering the course first.
    pub fn record(
        &mut self,
        date: &str,
        course: &str,
        kind: Kind,
        format: Format,
        url: &str,
        title: Option<&str>,
    ) -> Result<(), ManifestError> {
        parse_date(date)?;
        self.ensure_course(course);
        let entry = self
            .days
            .entry(date.to_string())
            .or_default()
            .entry(course.to_string())
            .or_default();
        let title = title.filter(|t| !t.trim().is_empty());
        if let Some(t) = title {
            entry.set_title(t);
        }
        entry.set_slot(kind, format, url, title);
        Ok(())
    }

    pub fn entry(&self, date: &str, course: &str) -> Option<&DayEntry> {
        self.days.get(date)?.get(course)
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        for (date, courses) in &self.days {
            parse_date(date)?;
            for course in courses.keys() {
                if !self.courses.contains_key(course) {
                    return Err(ManifestError::UnknownCourse {
                        date: date.clone(),
                        course: course.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}
