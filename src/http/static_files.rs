//! Static-file fallback for requests no route claims.
//!
//! # Design Decisions
//! - A request path maps to `<root><path>/index.html`
//! - Paths with a `..` segment are answered 404 without touching the disk
//! - Any read failure is a 404; the error is only logged

use std::path::PathBuf;

use super::{ContentType, Response, Status};

/// Body of every 404 produced by the server itself.
pub const NOT_FOUND_BODY: &str = "Not Found";

/// Serves `index.html` files below a document root.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    /// Serve files below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Document root.
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// File that would answer `path`, or `None` if the path tries to climb
    /// out of the document root.
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        if path.split('/').any(|segment| segment == "..") {
            return None;
        }
        let relative = path.trim_matches('/');
        let mut file = self.root.clone();
        if !relative.is_empty() {
            file.push(relative);
        }
        file.push("index.html");
        Some(file)
    }

    /// Completed 200 with the file's contents, or a completed 404.
    pub async fn serve(&self, path: &str) -> Response {
        let Some(file) = self.resolve(path) else {
            tracing::debug!(path, "Rejected static path outside document root");
            return not_found();
        };

        match tokio::fs::read_to_string(&file).await {
            Ok(contents) => {
                let mut response = Response::new();
                response.set_content_type(ContentType::Html);
                response.set_body(contents);
                response.into_completed()
            }
            Err(e) => {
                tracing::debug!(file = %file.display(), error = %e, "Static file unavailable");
                not_found()
            }
        }
    }
}

/// Completed `404 Not Found` with an html body.
pub fn not_found() -> Response {
    let mut response = Response::new();
    response.set_status(Status::NotFound);
    response.set_content_type(ContentType::Html);
    response.set_body(NOT_FOUND_BODY);
    response.into_completed()
}
