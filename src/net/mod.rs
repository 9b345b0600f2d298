//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Listener startup
//!     → tls.rs (load certificate and key, fail fast)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - TLS is optional; disabled in development mode
//! - Certificate problems are startup errors, never per-connection ones

pub mod tls;
