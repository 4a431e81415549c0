use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use super::templates;
use super::{check_key, AddOutcome, AddRequest, Result, Scaffolder};
use crate::manifest::{Format, Kind, Manifest, DATE_FORMAT};
use crate::roster::Roster;

const NOJEKYLL: &str = ".nojekyll";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewStudentOutcome {
    pub manifest_path: PathBuf,
    /// False when the manifest already existed and was left alone.
    pub created: bool,
    pub roster_registered: bool,
    pub samples: Vec<AddOutcome>,
}

impl Scaffolder {
    /// Write the site skeleton and seed `student` with sample pages.
    pub fn init(&self, student: &str) -> Result<NewStudentOutcome> {
        check_key("student", student)?;
        info!(docs = %self.layout.docs().display(), "init scaffold");
        let docs = self.layout.docs();
        let root = self.layout.root();
        self.ensure_dir(docs)?;
        self.write_text(&docs.join(NOJEKYLL), "")?;
        self.write_text(&root.join(".gitignore"), templates::GITIGNORE)?;
        self.write_text(&docs.join("index.html"), templates::INDEX_HTML)?;
        self.write_text(&docs.join("admin.html"), templates::ADMIN_HTML)?;
        self.write_text(&root.join("README.md"), templates::README_MD)?;

        self.new_student(student, true)
    }

    pub fn new_student(&self, student: &str, create_samples: bool) -> Result<NewStudentOutcome> {
        check_key("student", student)?;
        let manifest_path = self.layout.manifest_path(student);

        if manifest_path.exists() && !self.dry_run {
            info!(path = %manifest_path.display(), "already exists");
            let display = Manifest::load(&manifest_path)?
                .and_then(|m| m.display_name)
                .unwrap_or_else(|| student.to_string());
            let roster_registered = self.register_in_roster(student, &display)?;
            return Ok(NewStudentOutcome {
                manifest_path,
                created: false,
                roster_registered,
                samples: Vec::new(),
            });
        }

        let manifest = Manifest::for_new_student(student, self.today);
        self.write_text(&manifest_path, &manifest.to_pretty_json()?)?;
        let display = manifest
            .display_name
            .clone()
            .unwrap_or_else(|| student.to_string());
        let roster_registered = self.register_in_roster(student, &display)?;

        let mut samples = Vec::new();
        if create_samples {
            let date = self.today.format(DATE_FORMAT).to_string();
            for (course, meta) in &manifest.courses {
                let outcome = self.add(&AddRequest {
                    student: student.to_string(),
                    course: course.clone(),
                    date: date.clone(),
                    kind: Kind::Material,
                    format: Format::Html,
                    src: None,
                    external_url: None,
                    title: Some(format!("{}教材（樣板）", meta.label)),
                })?;
                samples.push(outcome);
            }
        }

        Ok(NewStudentOutcome {
            manifest_path,
            created: true,
            roster_registered,
            samples,
        })
    }

    fn register_in_roster(&self, student: &str, name: &str) -> Result<bool> {
        let path = self.layout.roster_path();
        let mut roster = Roster::load(&path)?;
        if !roster.register(student, name) {
            return Ok(false);
        }
        self.write_text(&path, &roster.to_pretty_json()?)?;
        Ok(true)
    }
}
