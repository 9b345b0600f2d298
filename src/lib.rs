//! Site server library: graceful lifecycle and access logging around a
//! static site listener.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::SiteConfig;
pub use http::{Chain, Handler, HttpListener, ResponseWriter};
pub use lifecycle::{Coordinator, Outcome, ShutdownState};
pub use observability::AccessLog;
