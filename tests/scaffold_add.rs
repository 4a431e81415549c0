use chrono::NaiveDate;
use enclass::backup;
use enclass::config::Layout;
use enclass::manifest::{Format, Kind, Manifest, ManifestError};
use enclass::scaffold::{AddRequest, ScaffoldError, Scaffolder};
use serde_json::json;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn scaffolder(root: &PathBuf, dry_run: bool) -> Scaffolder {
    let today = NaiveDate::from_ymd_opt(2025, 8, 10).expect("date");
    Scaffolder::new(Layout::new(root), dry_run).with_today(today)
}

fn request(kind: Kind, format: Format) -> AddRequest {
    AddRequest {
        student: "ray".to_string(),
        course: "english".to_string(),
        date: "2025-08-10".to_string(),
        kind,
        format,
        src: None,
        external_url: None,
        title: None,
    }
}

#[test]
fn link_requires_external_url() {
    let root = temp_dir("enclass-add-link");
    let s = scaffolder(&root, false);

    let err = s
        .add(&request(Kind::Homework, Format::Link))
        .expect_err("link without url");
    assert!(matches!(err, ScaffoldError::MissingExternalUrl));
    assert!(!s.layout().manifest_path("ray").exists());

    let mut req = request(Kind::Homework, Format::Link);
    req.external_url = Some("https://example.com/quiz".to_string());
    let outcome = s.add(&req).expect("link add");
    assert_eq!(outcome.url, "https://example.com/quiz");
    assert!(outcome.file.is_none());

    let m = Manifest::load(&s.layout().manifest_path("ray"))
        .expect("load")
        .expect("manifest exists");
    let slot = m
        .entry("2025-08-10", "english")
        .and_then(|e| e.slot(Kind::Homework))
        .expect("homework slot");
    assert_eq!(slot.format, Format::Link);
    assert_eq!(slot.url, "https://example.com/quiz");

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn missing_source_only_allowed_for_html() {
    let root = temp_dir("enclass-add-nosrc");
    let s = scaffolder(&root, false);

    for format in [Format::Pdf, Format::Image] {
        let err = s.add(&request(Kind::Material, format)).expect_err("no src");
        assert!(matches!(err, ScaffoldError::MissingSource(f) if f == format));
    }

    let mut req = request(Kind::Material, Format::Html);
    req.title = Some("Unit 3".to_string());
    let outcome = s.add(&req).expect("template add");
    assert_eq!(outcome.url, "materials/ray/english/250810.html");
    assert!(outcome.course_registered);

    let file = outcome.file.expect("template file");
    let html = std::fs::read_to_string(&file).expect("read template");
    assert!(html.contains(r#"content="2025-08-10""#));
    assert!(html.contains("<title>Unit 3</title>"));

    let m = Manifest::load(&s.layout().manifest_path("ray"))
        .expect("load")
        .expect("manifest exists");
    m.validate().expect("manifest stays consistent");
    assert_eq!(m.courses["english"].label, "english");
    assert_eq!(m.courses["english"].color.as_deref(), Some("#333"));
    let entry = m.entry("2025-08-10", "english").expect("entry");
    assert_eq!(entry.title(), Some("Unit 3"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn source_is_copied_with_dated_name_and_manifest_backed_up() {
    let root = temp_dir("enclass-add-src");
    let s = scaffolder(&root, false);
    let src = root.join("worksheet.PDF");
    std::fs::write(&src, b"%PDF-1.4 fake").expect("write src");

    s.add(&request(Kind::Material, Format::Html)).expect("first add");
    let manifest_path = s.layout().manifest_path("ray");
    let before = std::fs::read_to_string(&manifest_path).expect("read manifest");

    let mut req = request(Kind::Homework, Format::Pdf);
    req.src = Some(src.clone());
    let outcome = s.add(&req).expect("copy add");

    assert_eq!(outcome.url, "materials/ray/english/250810_hw.pdf");
    let copied = std::fs::read(outcome.file.expect("copied file")).expect("read copy");
    assert_eq!(copied, b"%PDF-1.4 fake");

    let backup_path = outcome.backup.expect("backup taken");
    assert_eq!(std::fs::read_to_string(&backup_path).expect("read backup"), before);
    assert_eq!(backup::list_backups(&manifest_path).expect("list"), vec![backup_path]);

    let m = Manifest::load(&manifest_path).expect("load").expect("exists");
    let entry = m.entry("2025-08-10", "english").expect("entry");
    assert!(entry.slot(Kind::Material).is_some());
    assert_eq!(
        entry.slot(Kind::Homework).map(|s| s.url),
        Some("materials/ray/english/250810_hw.pdf".to_string())
    );

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn bad_inputs_touch_nothing() {
    let root = temp_dir("enclass-add-bad");
    let s = scaffolder(&root, false);

    let mut req = request(Kind::Material, Format::Html);
    req.date = "2025-13-01".to_string();
    let err = s.add(&req).expect_err("bad date");
    assert!(matches!(err, ScaffoldError::Manifest(ManifestError::InvalidDate(_))));

    let mut req = request(Kind::Material, Format::Html);
    req.course = "../escape".to_string();
    let err = s.add(&req).expect_err("bad course");
    assert!(matches!(err, ScaffoldError::InvalidKey { what: "course", .. }));

    let mut req = request(Kind::Material, Format::Pdf);
    req.src = Some(root.join("missing.pdf"));
    let err = s.add(&req).expect_err("missing src");
    assert!(matches!(err, ScaffoldError::SourceNotFound(_)));

    assert!(!s.layout().docs().exists());
    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn dry_run_writes_nothing() {
    let root = temp_dir("enclass-add-dry");
    let s = scaffolder(&root, true);

    let outcome = s.add(&request(Kind::Material, Format::Html)).expect("dry add");
    assert_eq!(outcome.url, "materials/ray/english/250810.html");
    assert!(!s.layout().docs().exists());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn list_slots_written_by_the_admin_page_are_appended_to() {
    let root = temp_dir("enclass-add-list");
    let s = scaffolder(&root, false);
    let manifest_path = s.layout().manifest_path("ray");
    std::fs::create_dir_all(manifest_path.parent().expect("parent")).expect("mkdir");
    let doc = json!({
        "version": 3,
        "student": "ray",
        "courses": { "english": { "label": "英文" } },
        "types": { "material": "教材", "homework": "作業", "note": "提醒" },
        "holidays": ["2025-08-15"],
        "days": {
            "2025-08-10": {
                "english": { "material": [ { "title": "old", "path": "materials/ray/english/old.html" } ] }
            }
        }
    });
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&doc).expect("json")).expect("seed");

    let mut req = request(Kind::Material, Format::Html);
    req.title = Some("new".to_string());
    s.add(&req).expect("add onto list slot");

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&manifest_path).expect("read")).expect("parse");
    let items = saved["days"]["2025-08-10"]["english"]["material"]
        .as_array()
        .expect("still a list");
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["path"], "materials/ray/english/250810.html");
    assert_eq!(items[1]["title"], "new");
    assert_eq!(saved["holidays"], json!(["2025-08-15"]));
    assert_eq!(saved["types"]["note"], "提醒");
    assert_eq!(saved["version"], 3);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn rewrite_keeps_editor_key_order() {
    let root = temp_dir("enclass-add-order");
    let s = scaffolder(&root, false);
    let manifest_path = s.layout().manifest_path("ray");
    std::fs::create_dir_all(manifest_path.parent().expect("parent")).expect("mkdir");
    let doc = json!({
        "version": 3,
        "student": "ray",
        "types": { "material": "教材", "homework": "作業" },
        "courses": {
            "math": { "label": "數學" },
            "english": { "label": "英文" }
        },
        "days": {
            "2025-08-11": { "math": { "title": null }, "english": {} }
        }
    });
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&doc).expect("json")).expect("seed");

    let mut req = request(Kind::Homework, Format::Link);
    req.course = "math".to_string();
    req.date = "2025-08-11".to_string();
    req.external_url = Some("https://example.com/quiz".to_string());
    s.add(&req).expect("add");

    let mut req = request(Kind::Homework, Format::Link);
    req.course = "art".to_string();
    req.external_url = Some("https://example.com/draw".to_string());
    s.add(&req).expect("add new course");

    let text = std::fs::read_to_string(&manifest_path).expect("read");
    let pos = |needle: &str| text.find(needle).unwrap_or_else(|| panic!("{needle} missing"));
    assert!(pos("\"types\"") < pos("\"courses\""));
    assert!(pos("\"courses\"") < pos("\"days\""));
    assert!(pos("\"math\"") < pos("\"english\""));
    assert!(pos("\"english\"") < pos("\"art\""));
    assert!(pos("\"2025-08-11\"") < pos("\"2025-08-10\""));

    let saved: serde_json::Value = serde_json::from_str(&text).expect("parse");
    let day = saved["days"]["2025-08-11"].as_object().expect("day");
    let courses: Vec<&str> = day.keys().map(String::as_str).collect();
    assert_eq!(courses, vec!["math", "english"]);
    assert!(day["math"].as_object().expect("math").contains_key("title"));
    assert_eq!(day["math"]["title"], serde_json::Value::Null);
    assert_eq!(day["math"]["homework"]["url"], "https://example.com/quiz");

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn blank_title_is_treated_as_absent() {
    let root = temp_dir("enclass-add-blank-title");
    let s = scaffolder(&root, false);

    let mut req = request(Kind::Material, Format::Html);
    req.title = Some(String::new());
    let outcome = s.add(&req).expect("add");

    let html = std::fs::read_to_string(outcome.file.expect("file")).expect("read");
    assert!(html.contains("<title>教材（樣板）</title>"));

    let m = Manifest::load(&s.layout().manifest_path("ray"))
        .expect("load")
        .expect("exists");
    let entry = m.entry("2025-08-10", "english").expect("entry");
    assert_eq!(entry.title(), None);
    assert!(!entry.fields.contains_key("title"));

    let _ = std::fs::remove_dir_all(root);
}
