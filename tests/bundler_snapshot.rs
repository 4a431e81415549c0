use enclass::bundler::{self, BundleOptions, CHARS_PER_TOKEN};
use std::path::{Path, PathBuf};
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

fn write(root: &Path, rel: &str, bytes: &[u8]) {
    let p = root.join(rel);
    std::fs::create_dir_all(p.parent().expect("parent")).expect("create parent");
    std::fs::write(p, bytes).expect("write fixture");
}

fn project() -> PathBuf {
    let root = temp_dir("enclass-bundle");
    write(&root, ".gitignore", b"node_modules/\n*.log\nsecret.txt\n");
    write(&root, "a.py", b"print('a')\n");
    write(&root, "b.md", "# 課程\n".as_bytes());
    write(&root, "c.rs", b"fn main() {}\n");
    write(&root, "debug.log", b"noise\n");
    write(&root, "secret.txt", b"hunter2\n");
    write(&root, "node_modules/lib/x.js", b"module.exports = 1;\n");
    write(&root, "sub/d.JSON", b"{\"k\": 1}\n");
    write(&root, "bad.txt", &[0xff, 0xfe, 0x00, 0x41]);
    root
}

#[test]
fn snapshot_holds_exactly_the_filtered_files() {
    let root = project();
    let report = bundler::bundle(&BundleOptions::new(&root)).expect("bundle");

    assert_eq!(report.files, vec!["a.py", "b.md", "sub/d.JSON"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].path, "bad.txt");
    assert!(report.has_gitignore);
    assert!(!report.env_file_included);

    let text = std::fs::read_to_string(&report.output_path).expect("read snapshot");
    assert!(text.starts_with("### Project root: "));
    assert!(text.contains("\n=== FILE: a.py ===\nprint('a')\n\n"));
    assert!(text.contains("\n=== FILE: sub/d.JSON ===\n"));
    assert!(text.contains("# 課程"));
    for excluded in ["c.rs", "debug.log", "secret.txt", "x.js", "bad.txt"] {
        assert!(!text.contains(excluded), "{excluded} leaked into snapshot");
    }
    assert_eq!(report.estimated_tokens, text.chars().count() / CHARS_PER_TOKEN);
    assert!(report.content_hash.starts_with("sha256:"));
    assert_eq!(report.content_hash.len(), "sha256:".len() + 64);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn rerun_does_not_swallow_previous_snapshot() {
    let root = project();
    let first = bundler::bundle(&BundleOptions::new(&root)).expect("first bundle");
    let second = bundler::bundle(&BundleOptions::new(&root)).expect("second bundle");

    assert_eq!(first.files, second.files);
    assert_eq!(first.content_hash, second.content_hash);
    assert!(second
        .output_path
        .starts_with(root.canonicalize().expect("canonical root")));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn custom_filter_and_env_warning() {
    let root = temp_dir("enclass-bundle-env");
    write(&root, ".env.json", b"{\"TOKEN\": \"x\"}");
    write(&root, "app.yaml", b"a: 1\n");
    write(&root, "app.py", b"pass\n");

    let mut opts = BundleOptions::new(&root);
    opts.include_exts = vec!["JSON".to_string(), "yaml".to_string()];
    opts.output_dir = "out".to_string();
    opts.output_file = "snap.txt".to_string();
    let report = bundler::bundle(&opts).expect("bundle");

    assert_eq!(report.files, vec![".env.json", "app.yaml"]);
    assert!(report.env_file_included);
    assert!(!report.has_gitignore);
    assert!(report.output_path.ends_with("out/snap.txt"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn missing_root_is_an_error() {
    let root = temp_dir("enclass-bundle-missing").join("nope");
    let err = bundler::bundle(&BundleOptions::new(&root)).expect_err("missing root");
    assert!(matches!(err, bundler::BundleError::RootMissing(_)));
}
