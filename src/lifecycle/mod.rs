//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Install signals → Bind listener → Coordinator::run
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain connections → Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → channel → coordinator
//!     Second signal while draining → forced stop
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then signals, then listeners
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has timeout: forced stop after deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Coordinator, DrainSignal, Listener, Outcome, ServeError, ShutdownState};
pub use signals::Signal;
pub use startup::StartupError;
