use chrono::NaiveDate;

use crate::manifest::{self, Format, Kind};

const HOMEWORK_SUFFIX: &str = "_hw";

/// `2025-08-10` -> `250810`.
pub fn yymmdd(date: NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}

/// `250810` -> `2025-08-10`. Two-digit years are taken as 20xx.
fn date_from_yymmdd(s: &str) -> String {
    format!("20{}-{}-{}", &s[0..2], &s[2..4], &s[4..6])
}

/// Leading six-digit date of a batch file stem, if any.
pub fn date_prefix(stem: &str) -> Option<&str> {
    let prefix = stem.get(0..6)?;
    prefix
        .bytes()
        .all(|b| b.is_ascii_digit())
        .then_some(prefix)
}

pub fn is_homework_stem(stem: &str) -> bool {
    stem.to_lowercase().contains(HOMEWORK_SUFFIX)
}

/// File name inside `materials/<student>/<course>/`.
///
/// HTML always ends in `.html`; other formats keep the source extension, or
/// the format default when the source has none.
pub fn material_file_name(date: NaiveDate, kind: Kind, format: Format, src_ext: Option<&str>) -> String {
    let hw = if kind == Kind::Homework { HOMEWORK_SUFFIX } else { "" };
    let ext = match format {
        Format::Html => ".html".to_string(),
        _ => src_ext
            .filter(|e| !e.is_empty())
            .map(|e| format!(".{}", e.trim_start_matches('.').to_ascii_lowercase()))
            .unwrap_or_else(|| format.default_ext().to_string()),
    };
    format!("{}{}{}", yymmdd(date), hw, ext)
}

/// Student and course keys become path segments; keep them plain.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
}

/// Parse a batch prefix into a real calendar date string.
pub fn batch_date(prefix: &str) -> Option<String> {
    let date = date_from_yymmdd(prefix);
    manifest::parse_date(&date).ok().map(|_| date)
}
