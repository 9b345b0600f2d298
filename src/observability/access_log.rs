//! Access-log middleware.
//!
//! # Data Flow
//! ```text
//! request → Logged::serve
//!     → StatusRecorder wraps the writer
//!     → inner handler runs (panics caught)
//!     → LogRecord { method, path, status, duration }
//!     → LogComposer → LogSink (one write per line)
//! ```
//!
//! # Design Decisions
//! - Sink and composer are injected; several access logs may coexist
//! - A line is emitted for every request, including handler errors and panics
//! - When the handler failed before committing a status the line says 500
//! - Errors are returned and panics resumed after logging
//! - A failing sink drops the line and is reported once

use std::io::{self, Write};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use futures_util::FutureExt;

use crate::http::handler::{BoxHandler, Handler, HandlerError, Middleware};
use crate::http::recorder::StatusRecorder;
use crate::http::writer::ResponseWriter;
use crate::observability::composer::{DefaultComposer, LogComposer, LogRecord};

/// Destination for composed log lines.
pub trait LogSink: Send + Sync + 'static {
    /// Write `line` followed by a newline as a single unit.
    fn write_line(&self, line: &str) -> io::Result<()>;
}

/// Sink over any `Write`, serialised by a mutex.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send + 'static> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl<W: Write + Send + 'static> LogSink for WriterSink<W> {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("log sink lock poisoned"))?;
        writer.write_all(buf.as_bytes())?;
        writer.flush()
    }
}

/// In-memory sink, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines written so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .map_err(|_| io::Error::other("memory sink lock poisoned"))?
            .push(line.to_string());
        Ok(())
    }
}

/// Access-log middleware: one composed line per request.
#[derive(Clone)]
pub struct AccessLog {
    sink: Arc<dyn LogSink>,
    composer: Arc<dyn LogComposer>,
    faulted: Arc<AtomicBool>,
}

impl AccessLog {
    pub fn new(sink: impl LogSink, composer: impl LogComposer) -> Self {
        Self {
            sink: Arc::new(sink),
            composer: Arc::new(composer),
            faulted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Default composer writing to stdout.
    pub fn stdout() -> Self {
        Self::new(WriterSink::new(io::stdout()), DefaultComposer::default())
    }

    /// Compose and write one record.
    pub fn emit(&self, record: &LogRecord) {
        let line = self.composer.compose(record);
        if let Err(e) = self.sink.write_line(&line) {
            if !self.faulted.swap(true, Ordering::Relaxed) {
                tracing::error!(error = %e, "Access log sink failed; dropping lines");
            }
        }
    }
}

impl Middleware for AccessLog {
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        Arc::new(Logged {
            log: self.clone(),
            inner: next,
        })
    }
}

/// A handler decorated by [`AccessLog`].
struct Logged {
    log: AccessLog,
    inner: BoxHandler,
}

#[async_trait]
impl Handler for Logged {
    async fn serve(
        &self,
        request: Request<Body>,
        writer: &mut dyn ResponseWriter,
    ) -> Result<(), HandlerError> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let mut recorder = StatusRecorder::new(writer);
        let start = Instant::now();

        let outcome = AssertUnwindSafe(self.inner.serve(request, &mut recorder))
            .catch_unwind()
            .await;

        let failed = !matches!(outcome, Ok(Ok(())));
        let status = match recorder.observed() {
            Some(status) => status,
            None if failed => StatusCode::INTERNAL_SERVER_ERROR,
            None => StatusCode::OK,
        };

        self.log.emit(&LogRecord {
            method,
            path,
            status,
            duration: start.elapsed(),
        });

        match outcome {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::writer::BufferedWriter;
    use std::time::Duration;

    struct Fixed {
        status: Option<StatusCode>,
        delay: Duration,
    }

    #[async_trait]
    impl Handler for Fixed {
        async fn serve(
            &self,
            _request: Request<Body>,
            writer: &mut dyn ResponseWriter,
        ) -> Result<(), HandlerError> {
            tokio::time::sleep(self.delay).await;
            if let Some(status) = self.status {
                writer.write_status(status);
            }
            writer.write(b"body")?;
            writer.write_status(StatusCode::INTERNAL_SERVER_ERROR);
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Handler for Failing {
        async fn serve(
            &self,
            _request: Request<Body>,
            _writer: &mut dyn ResponseWriter,
        ) -> Result<(), HandlerError> {
            Err(HandlerError::Write(io::Error::other("peer gone")))
        }
    }

    struct Panicking {
        status: Option<StatusCode>,
    }

    #[async_trait]
    impl Handler for Panicking {
        async fn serve(
            &self,
            _request: Request<Body>,
            writer: &mut dyn ResponseWriter,
        ) -> Result<(), HandlerError> {
            if let Some(status) = self.status {
                writer.write_status(status);
            }
            panic!("handler blew up");
        }
    }

    struct BrokenSink;

    impl LogSink for BrokenSink {
        fn write_line(&self, _line: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    fn request(method: &str, path: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(path)
            .body(Body::empty())
            .unwrap()
    }

    /// Composer that ignores the duration, so lines are exact.
    fn plain(record: &LogRecord) -> String {
        format!("{} {} {}", record.method, record.path, record.status.as_u16())
    }

    #[tokio::test]
    async fn logs_default_status() {
        let sink = MemorySink::new();
        let handler = AccessLog::new(sink.clone(), plain).wrap(Arc::new(Fixed {
            status: None,
            delay: Duration::ZERO,
        }));

        let mut writer = BufferedWriter::new();
        handler.serve(request("GET", "/"), &mut writer).await.unwrap();

        assert_eq!(sink.lines(), vec!["GET / 200"]);
    }

    #[tokio::test]
    async fn logs_first_explicit_status() {
        let sink = MemorySink::new();
        let handler = AccessLog::new(sink.clone(), plain).wrap(Arc::new(Fixed {
            status: Some(StatusCode::NOT_FOUND),
            delay: Duration::ZERO,
        }));

        let mut writer = BufferedWriter::new();
        handler
            .serve(request("GET", "/foo?draft=1"), &mut writer)
            .await
            .unwrap();

        assert_eq!(sink.lines(), vec!["GET /foo 404"]);
        assert_eq!(writer.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(writer.body(), b"body");
    }

    #[tokio::test]
    async fn default_composer_renders_duration() {
        let sink = MemorySink::new();
        let handler = AccessLog::new(sink.clone(), DefaultComposer::default()).wrap(Arc::new(
            Fixed {
                status: Some(StatusCode::NOT_FOUND),
                delay: Duration::from_millis(12),
            },
        ));

        let mut writer = BufferedWriter::new();
        handler
            .serve(request("GET", "/foo"), &mut writer)
            .await
            .unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("[GET]\t/foo\t\tcode: 404\t"), "{}", lines[0]);
        assert!(lines[0].ends_with('s'));
    }

    #[tokio::test]
    async fn handler_error_is_logged_and_returned() {
        let sink = MemorySink::new();
        let handler = AccessLog::new(sink.clone(), plain).wrap(Arc::new(Failing));

        let mut writer = BufferedWriter::new();
        let result = handler.serve(request("PUT", "/upload"), &mut writer).await;

        assert!(matches!(result, Err(HandlerError::Write(_))));
        assert_eq!(sink.lines(), vec!["PUT /upload 500"]);
    }

    #[tokio::test]
    async fn panic_is_logged_then_resumed() {
        let sink = MemorySink::new();
        let handler =
            AccessLog::new(sink.clone(), plain).wrap(Arc::new(Panicking { status: None }));

        let mut writer = BufferedWriter::new();
        let caught = AssertUnwindSafe(handler.serve(request("GET", "/boom"), &mut writer))
            .catch_unwind()
            .await;

        assert!(caught.is_err());
        assert_eq!(sink.lines(), vec!["GET /boom 500"]);
    }

    #[tokio::test]
    async fn panic_keeps_committed_status() {
        let sink = MemorySink::new();
        let handler = AccessLog::new(sink.clone(), plain).wrap(Arc::new(Panicking {
            status: Some(StatusCode::ACCEPTED),
        }));

        let mut writer = BufferedWriter::new();
        let caught = AssertUnwindSafe(handler.serve(request("POST", "/jobs"), &mut writer))
            .catch_unwind()
            .await;

        assert!(caught.is_err());
        assert_eq!(sink.lines(), vec!["POST /jobs 202"]);
    }

    #[tokio::test]
    async fn broken_sink_does_not_fail_the_request() {
        let handler = AccessLog::new(BrokenSink, plain).wrap(Arc::new(Fixed {
            status: Some(StatusCode::OK),
            delay: Duration::ZERO,
        }));

        for _ in 0..3 {
            let mut writer = BufferedWriter::new();
            handler.serve(request("GET", "/"), &mut writer).await.unwrap();
            assert_eq!(writer.status(), Some(StatusCode::OK));
        }
    }

    #[tokio::test]
    async fn independent_loggers_coexist() {
        let first = MemorySink::new();
        let second = MemorySink::new();
        let leaf: BoxHandler = Arc::new(Fixed {
            status: None,
            delay: Duration::ZERO,
        });

        let a = AccessLog::new(first.clone(), plain).wrap(leaf.clone());
        let b = AccessLog::new(second.clone(), |r: &LogRecord| r.path.clone()).wrap(leaf);

        let mut writer = BufferedWriter::new();
        a.serve(request("GET", "/a"), &mut writer).await.unwrap();
        let mut writer = BufferedWriter::new();
        b.serve(request("GET", "/b"), &mut writer).await.unwrap();

        assert_eq!(first.lines(), vec!["GET /a 200"]);
        assert_eq!(second.lines(), vec!["/b"]);
    }

    #[test]
    fn writer_sink_appends_newline() {
        let sink = WriterSink::new(Vec::new());
        sink.write_line("one").unwrap();
        sink.write_line("two").unwrap();
        let buf = sink.writer.into_inner().unwrap();
        assert_eq!(buf, b"one\ntwo\n");
    }

    #[test]
    fn concurrent_lines_do_not_interleave() {
        let sink = Arc::new(WriterSink::new(Vec::new()));
        let threads: Vec<_> = (0..8)
            .map(|i| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        sink.write_line(&format!("[GET]\t/thread-{i}\t\tcode: 200\t1ms"))
                            .unwrap();
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let sink = Arc::try_unwrap(sink).unwrap();
        let buf = String::from_utf8(sink.writer.into_inner().unwrap()).unwrap();
        let lines: Vec<_> = buf.lines().collect();
        assert_eq!(lines.len(), 400);
        assert!(lines
            .iter()
            .all(|l| l.starts_with("[GET]\t/thread-") && l.ends_with("\t1ms")));
    }
}
