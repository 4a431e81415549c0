pub const INDEX_HTML: &str = include_str!("templates/index.html");
pub const ADMIN_HTML: &str = include_str!("templates/admin.html");
pub const README_MD: &str = include_str!("templates/README.md");
pub const GITIGNORE: &str = include_str!("templates/gitignore");

const MATERIAL_HTML: &str = include_str!("templates/material.html");

pub const DEFAULT_MATERIAL_TITLE: &str = "教材（樣板）";

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Placeholder lesson page linking back to the calendar for `iso_date`.
pub fn render_material(iso_date: &str, title: Option<&str>) -> String {
    let title = title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_MATERIAL_TITLE);
    let title = escape_html(title);
    MATERIAL_HTML
        .replace("{{iso_date}}", iso_date)
        .replace("{{title}}", &title)
}
