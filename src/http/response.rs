//! Response construction.
//!
//! # Design Decisions
//! - Handlers never surface a 5xx: an unreadable page degrades to the 404
//!   page, and an unreadable 404 page to a plain-text 404
//! - Redirects carry no body

use std::path::Path;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::statics::{SiteRoot, ERROR_PAGE, MESSAGE_PAGE};

/// Read `path` and answer with its bytes.
pub async fn file_response(
    path: &Path,
    content_type: &'static str,
    status: StatusCode,
) -> std::io::Result<Response> {
    let bytes = tokio::fs::read(path).await?;
    Ok((status, [(header::CONTENT_TYPE, content_type)], Body::from(bytes)).into_response())
}

/// Serve one of the fixed HTML pages, falling back to the 404 page.
pub async fn html_page(site: &SiteRoot, name: &str) -> Response {
    let path = site.page(name);
    match file_response(&path, "text/html", StatusCode::OK).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read page");
            not_found(site).await
        }
    }
}

/// The 404 page.
pub async fn not_found(site: &SiteRoot) -> Response {
    let path = site.page(ERROR_PAGE);
    match file_response(&path, "text/html", StatusCode::NOT_FOUND).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Error page unavailable");
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

/// `302 Found` pointing at the confirmation page.
pub fn submitted_redirect() -> Response {
    let location = format!("/{MESSAGE_PAGE}");
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
