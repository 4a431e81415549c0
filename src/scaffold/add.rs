use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::naming;
use super::templates;
use super::{check_key, Result, ScaffoldError, Scaffolder};
use crate::backup;
use crate::config::Layout;
use crate::manifest::{self, Format, Kind, Manifest};

#[derive(Debug, Clone)]
pub struct AddRequest {
    pub student: String,
    pub course: String,
    pub date: String,
    pub kind: Kind,
    pub format: Format,
    pub src: Option<PathBuf>,
    pub external_url: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOutcome {
    pub date: String,
    pub kind: Kind,
    pub format: Format,
    pub url: String,
    /// File written or copied under the document root (`None` for links).
    pub file: Option<PathBuf>,
    pub backup: Option<PathBuf>,
    pub course_registered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSkip {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub added: Vec<AddOutcome>,
    pub skipped: Vec<BatchSkip>,
}

/// Where an entry's content comes from once inputs are validated.
enum Target {
    External(String),
    Copy { src: PathBuf, file_name: String },
    Template { file_name: String },
}

fn plan_target(req: &AddRequest, date: chrono::NaiveDate) -> Result<Target> {
    if req.format == Format::Link {
        return match req.external_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(Target::External(url.to_string())),
            _ => Err(ScaffoldError::MissingExternalUrl),
        };
    }

    match &req.src {
        Some(src) => {
            if !src.is_file() {
                return Err(ScaffoldError::SourceNotFound(src.clone()));
            }
            let ext = src.extension().and_then(|e| e.to_str());
            Ok(Target::Copy {
                src: src.clone(),
                file_name: naming::material_file_name(date, req.kind, req.format, ext),
            })
        }
        None if req.format == Format::Html => Ok(Target::Template {
            file_name: naming::material_file_name(date, req.kind, req.format, None),
        }),
        None => Err(ScaffoldError::MissingSource(req.format)),
    }
}

impl Scaffolder {
    /// Add or update one material/homework entry.
    ///
    /// All inputs are validated before anything touches the disk; the
    /// manifest is backed up before it is rewritten.
    pub fn add(&self, req: &AddRequest) -> Result<AddOutcome> {
        check_key("student", &req.student)?;
        check_key("course", &req.course)?;
        let date = manifest::parse_date(&req.date)?;
        let target = plan_target(req, date)?;
        let title = req.title.as_deref().filter(|t| !t.trim().is_empty());

        let manifest_path = self.layout.manifest_path(&req.student);
        let mut manifest = Manifest::load(&manifest_path)?
            .unwrap_or_else(|| Manifest::placeholder(&req.student));
        if let Err(e) = manifest.validate() {
            warn!(path = %manifest_path.display(), error = %e, "manifest is inconsistent");
        }
        let backup = backup::backup_file(&manifest_path, self.dry_run).map_err(|source| {
            ScaffoldError::Backup {
                path: manifest_path.clone(),
                source,
            }
        })?;

        let rel_dir = Layout::materials_rel(&req.student, &req.course);
        let abs_dir = self.layout.materials_dir(&req.student, &req.course);
        let (url, file) = match target {
            Target::External(url) => (url, None),
            Target::Copy { src, file_name } => {
                let dst = abs_dir.join(&file_name);
                self.copy_file(&src, &dst)?;
                (format!("{rel_dir}/{file_name}"), Some(dst))
            }
            Target::Template { file_name } => {
                let dst = abs_dir.join(&file_name);
                let html = templates::render_material(&req.date, title);
                self.write_text(&dst, &html)?;
                (format!("{rel_dir}/{file_name}"), Some(dst))
            }
        };

        let course_registered = manifest.ensure_course(&req.course);
        manifest.record(
            &req.date,
            &req.course,
            req.kind,
            req.format,
            &url,
            title,
        )?;
        self.write_text(&manifest_path, &manifest.to_pretty_json()?)?;
        info!(
            student = %req.student,
            course = %req.course,
            date = %req.date,
            kind = req.kind.as_str(),
            url = %url,
            "manifest updated"
        );

        Ok(AddOutcome {
            date: req.date.clone(),
            kind: req.kind,
            format: req.format,
            url,
            file,
            backup,
            course_registered,
        })
    }

    /// Import every dated file of `from_dir` for one student and course.
    ///
    /// Names must start with `YYMMDD`; a `_hw` anywhere in the stem marks
    /// homework. Undated names, impossible dates and extensions that would
    /// need an external link are skipped, not fatal.
    pub fn batch_add(&self, student: &str, course: &str, from_dir: &Path) -> Result<BatchReport> {
        check_key("student", student)?;
        check_key("course", course)?;
        if !from_dir.is_dir() {
            return Err(ScaffoldError::SourceDirMissing(from_dir.to_path_buf()));
        }

        let mut files: Vec<PathBuf> = Vec::new();
        let entries = std::fs::read_dir(from_dir).map_err(|source| ScaffoldError::Io {
            op: "read directory",
            path: from_dir.to_path_buf(),
            source,
        })?;
        for ent in entries {
            let ent = ent.map_err(|source| ScaffoldError::Io {
                op: "read directory",
                path: from_dir.to_path_buf(),
                source,
            })?;
            let p = ent.path();
            if p.is_file() {
                files.push(p);
            }
        }
        files.sort();

        let mut report = BatchReport::default();
        if files.is_empty() {
            info!(dir = %from_dir.display(), "source directory has no files");
            return Ok(report);
        }

        for f in files {
            let name = f
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let stem = f
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();

            let skip = |reason: &str| BatchSkip {
                name: name.clone(),
                reason: reason.to_string(),
            };

            let Some(prefix) = naming::date_prefix(&stem) else {
                warn!(file = %name, "skip: name has no YYMMDD date prefix");
                report.skipped.push(skip("no YYMMDD date prefix"));
                continue;
            };
            let Some(date) = naming::batch_date(prefix) else {
                warn!(file = %name, "skip: date prefix is not a calendar date");
                report.skipped.push(skip("date prefix is not a calendar date"));
                continue;
            };
            let ext = f
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            let format = Format::guess_from_ext(&ext);
            if format == Format::Link {
                warn!(file = %name, "skip: unsupported extension");
                report.skipped.push(skip("unsupported extension"));
                continue;
            }
            let kind = if naming::is_homework_stem(&stem) {
                Kind::Homework
            } else {
                Kind::Material
            };

            info!(file = %name, date = %date, kind = kind.as_str(), format = format.as_str(), "batch entry");
            let outcome = self.add(&AddRequest {
                student: student.to_string(),
                course: course.to_string(),
                date,
                kind,
                format,
                src: Some(f.clone()),
                external_url: None,
                title: None,
            })?;
            report.added.push(outcome);
        }

        Ok(report)
    }
}
