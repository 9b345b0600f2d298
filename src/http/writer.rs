//! Response writers.
//!
//! # Responsibilities
//! - Define the writer interface handlers produce responses through
//! - Hold a handler's output and turn it into an axum `Response`
//!
//! # Design Decisions
//! - Only the first status write is honoured, like the wire
//! - Writing body bytes before any status commits `200 OK`
//! - A body is either buffered chunks or one streaming `Body`, never both

use std::io;

use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, StatusCode},
    response::Response,
};

/// Destination a handler writes its response into.
pub trait ResponseWriter: Send {
    /// Headers that will be sent with the response.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Set the response status. Only the first call is honoured.
    fn write_status(&mut self, status: StatusCode);

    /// Append body bytes, committing `200 OK` if no status was set.
    fn write(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Hand over a body that streams to the client once the handler
    /// returns. Commits `200 OK` if no status was set.
    fn write_body(&mut self, body: Body) -> io::Result<()>;
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for &mut W {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn write_status(&mut self, status: StatusCode) {
        (**self).write_status(status)
    }

    fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        (**self).write(chunk)
    }

    fn write_body(&mut self, body: Body) -> io::Result<()> {
        (**self).write_body(body)
    }
}

#[derive(Debug)]
enum Payload {
    Chunks(Vec<u8>),
    Stream(Body),
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Chunks(Vec::new())
    }
}

/// Writer that holds a response until the handler returns.
///
/// Chunks written with [`ResponseWriter::write`] are buffered. A body handed
/// over with [`ResponseWriter::write_body`] is kept as is and streamed.
#[derive(Debug, Default)]
pub struct BufferedWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    payload: Payload,
}

impl BufferedWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status committed so far, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Buffered chunks. Empty when the body is streaming.
    pub fn body(&self) -> &[u8] {
        match &self.payload {
            Payload::Chunks(chunks) => chunks,
            Payload::Stream(_) => &[],
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.payload, Payload::Stream(_))
    }

    /// Collect the whole body, draining a stream if there is one.
    pub async fn into_bytes(self) -> Result<Bytes, axum::Error> {
        match self.payload {
            Payload::Chunks(chunks) => Ok(Bytes::from(chunks)),
            Payload::Stream(body) => axum::body::to_bytes(body, usize::MAX).await,
        }
    }

    /// Convert the held output into a response.
    pub fn into_response(self) -> Response {
        let body = match self.payload {
            Payload::Chunks(chunks) => Body::from(chunks),
            Payload::Stream(body) => body,
        };
        let mut response = Response::new(body);
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

impl ResponseWriter for BufferedWriter {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        match self.status {
            None => self.status = Some(status),
            Some(committed) => {
                tracing::warn!(
                    committed = %committed,
                    ignored = %status,
                    "Superfluous status write"
                );
            }
        }
    }

    fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        match &mut self.payload {
            Payload::Chunks(chunks) => {
                self.status.get_or_insert(StatusCode::OK);
                chunks.extend_from_slice(chunk);
                Ok(())
            }
            Payload::Stream(_) => Err(io::Error::other("response body is already streaming")),
        }
    }

    fn write_body(&mut self, body: Body) -> io::Result<()> {
        if !matches!(&self.payload, Payload::Chunks(chunks) if chunks.is_empty()) {
            return Err(io::Error::other("response body already written"));
        }
        self.status.get_or_insert(StatusCode::OK);
        self.payload = Payload::Stream(body);
        Ok(())
    }
}
