//! Static site handler.
//!
//! Serves an exported site directory through `tower_http`'s `ServeDir`.
//! Extension-less paths map to `PATH.html`, so `/about` serves `about.html`.
//! File contents are streamed, never read into memory up front.

use std::path::Path;

use async_trait::async_trait;
use axum::{body::Body, http::Request};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::http::handler::{Handler, HandlerError};
use crate::http::writer::ResponseWriter;

/// Terminal handler for the exported site.
#[derive(Debug, Clone)]
pub struct StaticSite {
    files: ServeDir,
}

impl StaticSite {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            files: ServeDir::new(dir),
        }
    }
}

/// The `.html` path for `path`, if it needs one.
pub fn html_path(path: &str) -> Option<String> {
    if path == "/" || path.ends_with('/') {
        return None;
    }
    let name = path.rsplit('/').next().unwrap_or(path);
    if name.contains('.') {
        None
    } else {
        Some(format!("{path}.html"))
    }
}

#[async_trait]
impl Handler for StaticSite {
    async fn serve(
        &self,
        mut request: Request<Body>,
        writer: &mut dyn ResponseWriter,
    ) -> Result<(), HandlerError> {
        if let Some(path) = html_path(request.uri().path()) {
            let rewritten = match request.uri().query() {
                Some(query) => format!("{path}?{query}"),
                None => path,
            };
            *request.uri_mut() = rewritten.parse()?;
        }

        let response = match self.files.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        let (parts, body) = response.into_parts();
        writer.headers_mut().extend(parts.headers);
        writer.write_status(parts.status);
        writer.write_body(Body::new(body))?;
        Ok(())
    }
}
