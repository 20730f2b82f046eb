//! Helpers for sanitizing data before it enters tracing spans or file names.
//!
//! Spans only ever carry the file name component, never the full path.

use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// File-name-safe slug: whitespace becomes `_`, anything outside
/// `[A-Za-z0-9_.-]` is dropped, leading dots are stripped.
///
/// Falls back to `document` when nothing survives (e.g. an all-Arabic title).
pub fn slugify(title: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_underscore = false;

    for c in title.trim().chars() {
        let mapped = if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
            Some(c)
        } else if c == '_' || c.is_whitespace() {
            Some('_')
        } else {
            None
        };

        if let Some(c) = mapped {
            if c == '_' && last_underscore {
                continue;
            }
            last_underscore = c == '_';
            slug.push(c);
        }
    }

    let slug: String = slug
        .trim_start_matches('.')
        .trim_matches('_')
        .chars()
        .take(max_len)
        .collect();

    if slug.is_empty() {
        "document".to_string()
    } else {
        slug
    }
}
