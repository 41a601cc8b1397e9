//! Static file resolution under the site root.
//!
//! # Responsibilities
//! - Locate the fixed pages (`index.html`, `message.html`, `error.html`)
//! - Map wildcard request paths to files, refusing anything outside the root
//! - Guess a content type from the file extension

use std::path::{Component, Path, PathBuf};

pub const INDEX_PAGE: &str = "index.html";
pub const MESSAGE_PAGE: &str = "message.html";
pub const ERROR_PAGE: &str = "error.html";

/// Directory the front end serves from.
#[derive(Debug, Clone)]
pub struct SiteRoot {
    root: PathBuf,
}

impl SiteRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of one of the fixed pages.
    pub fn page(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Resolve a request path (`/css/site.css`) to a regular file.
    ///
    /// Returns `None` when the path is empty, contains `..`, a root or a
    /// drive prefix, does not name a regular file, or resolves (through
    /// symlinks) to somewhere outside the site root.
    pub async fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let relative = Path::new(request_path.strip_prefix('/').unwrap_or(request_path));
        if relative.as_os_str().is_empty() || !is_contained(relative) {
            return None;
        }

        let candidate = self.root.join(relative);
        let metadata = tokio::fs::metadata(&candidate).await.ok()?;
        if !metadata.is_file() {
            return None;
        }

        let root = tokio::fs::canonicalize(&self.root).await.ok()?;
        let resolved = tokio::fs::canonicalize(&candidate).await.ok()?;
        if !resolved.starts_with(&root) {
            tracing::warn!(path = %request_path, "Static path escapes site root");
            return None;
        }

        Some(candidate)
    }
}

fn is_contained(relative: &Path) -> bool {
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Best-effort content type for a file, `text/plain` when unknown.
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("js" | "mjs") => "text/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/vnd.microsoft.icon",
        Some("webp") => "image/webp",
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        _ => "text/plain",
    }
}
