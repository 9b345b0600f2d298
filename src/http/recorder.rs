//! Status observation tap for response writers.

use std::io;

use axum::{
    body::Body,
    http::{HeaderMap, StatusCode},
};

use crate::http::writer::ResponseWriter;

/// Wraps a [`ResponseWriter`] and remembers the first status committed.
///
/// Every call is forwarded unchanged to the inner writer; the recorder only
/// observes. A body write before any explicit status counts as an implicit
/// `200 OK`, since that is what goes out on the wire.
#[derive(Debug)]
pub struct StatusRecorder<W> {
    inner: W,
    observed: Option<StatusCode>,
}

impl<W: ResponseWriter> StatusRecorder<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            observed: None,
        }
    }

    /// The committed status, or `200 OK` if the handler never set one.
    pub fn code(&self) -> StatusCode {
        self.observed.unwrap_or(StatusCode::OK)
    }

    /// The committed status, if any.
    pub fn observed(&self) -> Option<StatusCode> {
        self.observed
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: ResponseWriter> ResponseWriter for StatusRecorder<W> {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        self.observed.get_or_insert(status);
        self.inner.write_status(status);
    }

    fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.observed.get_or_insert(StatusCode::OK);
        self.inner.write(chunk)
    }

    fn write_body(&mut self, body: Body) -> io::Result<()> {
        self.observed.get_or_insert(StatusCode::OK);
        self.inner.write_body(body)
    }
}
