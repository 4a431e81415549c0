use anyhow::Context;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::info;

const BACKUP_MARKER: &str = ".backup-";
const BACKUP_EXT: &str = "json";

fn stem_of(path: &Path) -> anyhow::Result<&str> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("no usable file name in {}", path.to_string_lossy()))
}

/// Copy `path` to `<stem>.backup-<YYYYmmdd-HHMMSS>.json` beside it.
///
/// Returns `None` when there is nothing to back up. Within the same second a
/// `-N` counter is appended so earlier backups are never overwritten. On a
/// dry run the name is computed and logged but nothing is copied.
pub fn backup_file(path: &Path, dry_run: bool) -> anyhow::Result<Option<PathBuf>> {
    if !path.is_file() {
        return Ok(None);
    }
    let stem = stem_of(path)?;
    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();

    let mut dst = path.with_file_name(format!("{stem}{BACKUP_MARKER}{ts}.{BACKUP_EXT}"));
    let mut n = 1u32;
    while dst.exists() {
        dst = path.with_file_name(format!("{stem}{BACKUP_MARKER}{ts}-{n}.{BACKUP_EXT}"));
        n += 1;
    }

    if dry_run {
        info!(src = %path.display(), dst = %dst.display(), "[dry] backup");
        return Ok(Some(dst));
    }

    std::fs::copy(path, &dst).with_context(|| {
        format!(
            "failed to back up {} to {}",
            path.to_string_lossy(),
            dst.to_string_lossy()
        )
    })?;
    info!(dst = %dst.display(), "backup");
    Ok(Some(dst))
}

fn backup_sort_key(name: &str, prefix: &str) -> Option<(String, u32)> {
    let rest = name.strip_prefix(prefix)?.strip_suffix(".json")?;
    match rest.split_once('-').and_then(|(_, tail)| tail.split_once('-')) {
        // `YYYYmmdd-HHMMSS-N`
        Some((_, counter)) => {
            let n = counter.parse::<u32>().ok()?;
            let ts_len = rest.len() - counter.len() - 1;
            Some((rest[..ts_len].to_string(), n))
        }
        None => Some((rest.to_string(), 0)),
    }
}

/// Existing backups of `path`, oldest first.
pub fn list_backups(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let Some(dir) = path.parent() else {
        return Ok(Vec::new());
    };
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let prefix = format!("{}{}", stem_of(path)?, BACKUP_MARKER);

    let mut found: Vec<((String, u32), PathBuf)> = Vec::new();
    for ent in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.to_string_lossy()))?
    {
        let ent = ent?;
        let p = ent.path();
        if !p.is_file() {
            continue;
        }
        let Some(name) = p.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some(key) = backup_sort_key(name, &prefix) {
            found.push((key, p));
        }
    }
    found.sort();
    Ok(found.into_iter().map(|(_, p)| p).collect())
}
