use std::path::{Component, Path, PathBuf};

/// Normalize a '/'-separated request path so it stays inside the root.
///
/// `.` and empty segments are dropped and `..` pops a previous segment.
/// Returns `None` when the path would climb above the root, is absolute, or
/// carries a backslash or drive prefix.
pub fn normalize_rel(rel: &str) -> Option<String> {
    if rel.starts_with('/') || rel.contains('\\') || rel.contains('\0') {
        return None;
    }

    let mut parts: Vec<&str> = Vec::new();
    for seg in rel.split('/') {
        match seg {
            "" | "." => continue,
            ".." => {
                parts.pop()?;
            }
            s => {
                // Reject anything the platform would read as a prefix (`C:`).
                let mut comps = Path::new(s).components();
                match (comps.next(), comps.next()) {
                    (Some(Component::Normal(_)), None) => parts.push(s),
                    _ => return None,
                }
            }
        }
    }
    Some(parts.join("/"))
}

pub fn safe_join(root: &Path, rel: &str) -> Option<PathBuf> {
    let norm = normalize_rel(rel)?;
    if norm.is_empty() {
        return Some(root.to_path_buf());
    }
    Some(root.join(norm))
}
