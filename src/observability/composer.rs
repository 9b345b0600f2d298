//! Access-log line composition.
//!
//! # Responsibilities
//! - Turn a completed request's [`LogRecord`] into one formatted line
//! - Render durations in their canonical short form (`12ms`, `1.2s`)
//!
//! # Design Decisions
//! - Composers are pure: same record, same line
//! - Pluggable: any `Fn(&LogRecord) -> String` is a composer

use std::fmt::Write as _;
use std::time::Duration;

use axum::http::{Method, StatusCode};

use crate::observability::tabwriter::TabLayout;

/// Everything logged about one completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub method: Method,
    pub path: String,
    pub status: StatusCode,
    pub duration: Duration,
}

/// Formats a [`LogRecord`] into a single line (without the trailing newline).
pub trait LogComposer: Send + Sync + 'static {
    fn compose(&self, record: &LogRecord) -> String;
}

impl<F> LogComposer for F
where
    F: Fn(&LogRecord) -> String + Send + Sync + 'static,
{
    fn compose(&self, record: &LogRecord) -> String {
        self(record)
    }
}

/// `[METHOD] PATH  code: STATUS  DURATION`, tab-stop aligned.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultComposer {
    layout: TabLayout,
}

impl DefaultComposer {
    pub fn new(layout: TabLayout) -> Self {
        Self { layout }
    }

    /// Default columns padded with spaces instead of tabs.
    pub fn spaces() -> Self {
        Self::new(TabLayout::default().with_spaces())
    }
}

impl LogComposer for DefaultComposer {
    fn compose(&self, record: &LogRecord) -> String {
        let body = format!(
            "[{}]\t{}\t\tcode: {}\t{}",
            record.method,
            record.path,
            record.status.as_u16(),
            format_duration(record.duration)
        );
        self.layout.align(&body)
    }
}

/// One JSON object per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonComposer;

impl LogComposer for JsonComposer {
    fn compose(&self, record: &LogRecord) -> String {
        serde_json::json!({
            "method": record.method.as_str(),
            "path": record.path,
            "status": record.status.as_u16(),
            "duration_ms": record.duration.as_secs_f64() * 1e3,
            "duration": format_duration(record.duration),
        })
        .to_string()
    }
}

/// Render a duration as `750ns`, `1.5µs`, `12ms`, `1.2s`, `1m30s`, `1h2m3.5s`.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return fractional(nanos, 1_000, 3, "µs");
    }
    if nanos < 1_000_000_000 {
        return fractional(nanos, 1_000_000, 6, "ms");
    }

    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{hours}h");
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{minutes}m");
    }
    let _ = write!(out, "{seconds}");
    let subsec = duration.subsec_nanos();
    if subsec > 0 {
        let digits = format!("{subsec:09}");
        let _ = write!(out, ".{}", digits.trim_end_matches('0'));
    }
    out.push('s');
    out
}

fn fractional(value: u128, unit: u128, digits: usize, suffix: &str) -> String {
    let whole = value / unit;
    let rem = value % unit;
    if rem == 0 {
        return format!("{whole}{suffix}");
    }
    let frac = format!("{rem:0digits$}");
    format!("{whole}.{}{suffix}", frac.trim_end_matches('0'))
}
