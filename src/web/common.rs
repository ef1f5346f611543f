//! Common web utilities and shared types
//!
//! This module contains query and form types used across several handlers.

use axum::http::Uri;
use serde::Deserialize;

/// Default page number (1-indexed)
pub fn default_page() -> u32 {
    1
}

/// Listing query: `?q=<keyword>&page=<n>`
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl ListQuery {
    pub fn keyword(&self) -> &str {
        self.q.trim()
    }
}

/// Confirmation form of every delete page
#[derive(Debug, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub mode: String,
}

/// Prefix the pagination partial appends a page number to
pub fn pager_url(path: &str, keyword: &str) -> String {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        format!("{}?page=", path)
    } else {
        format!("{}?q={}&page=", path, urlencoding::encode(keyword))
    }
}

/// Keep post-login redirects on this site
pub fn safe_next(next: Option<&str>) -> String {
    match next.map(str::trim) {
        Some(next)
            if next.starts_with('/')
                && !next.starts_with("//")
                && !next.starts_with("/\\")
                && !next.starts_with("/login") =>
        {
            next.to_string()
        }
        _ => "/".to_string(),
    }
}

/// Path and query of a `Referer` value, kept on this site
///
/// Absolute URLs lose their scheme and host; anything `safe_next` would
/// refuse comes back as `/`.
pub fn referer_path(referer: &str) -> Option<String> {
    let uri: Uri = referer.trim().parse().ok()?;
    let path = uri.path_and_query()?.as_str();
    Some(safe_next(Some(path)))
}
