//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Requests:
//!     → access_log.rs (timing + status per request)
//!     → composer.rs (LogRecord → line)
//!     → tabwriter.rs (column alignment)
//!     → sink (stdout by default)
//!
//! Lifecycle and errors:
//!     → logging.rs (tracing subscriber on stderr)
//! ```
//!
//! # Design Decisions
//! - Access log lines and operational logs use separate streams
//! - Sinks and composers are injected, never global

pub mod access_log;
pub mod composer;
pub mod logging;
pub mod tabwriter;

pub use access_log::{AccessLog, LogSink, MemorySink, WriterSink};
pub use composer::{format_duration, DefaultComposer, JsonComposer, LogComposer, LogRecord};
pub use tabwriter::TabLayout;
