//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (axum-server, read-header timeout, drain hook)
//!     → bridge task per request with a BufferedWriter
//!     → handler.rs chain (middleware, outermost first)
//!     → recorder.rs observes the status on the way through
//!     → static_site.rs writes the file response
//! ```

pub mod handler;
pub mod recorder;
pub mod server;
pub mod static_site;
pub mod writer;

pub use handler::{BoxHandler, Chain, Handler, HandlerError, Middleware};
pub use recorder::StatusRecorder;
pub use server::HttpListener;
pub use static_site::StaticSite;
pub use writer::{BufferedWriter, ResponseWriter};
