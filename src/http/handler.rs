//! Handler and middleware interfaces.
//!
//! # Design Decisions
//! - Handlers write into a [`ResponseWriter`] instead of returning a response,
//!   so decorators can observe what was written
//! - Per-request context travels in `Request::extensions`
//! - Middleware is an explicit `Handler -> Handler` transformation; chains are
//!   built in caller order, first added is outermost

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{body::Body, http::Request};

use crate::http::writer::ResponseWriter;

/// Errors a handler may return. The handler owns them; middleware passes them
/// through untouched.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("invalid request uri: {0}")]
    InvalidUri(#[from] axum::http::uri::InvalidUri),

    #[error("failed to write response: {0}")]
    Write(#[from] io::Error),
}

/// Unit of request-processing logic.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn serve(
        &self,
        request: Request<Body>,
        writer: &mut dyn ResponseWriter,
    ) -> Result<(), HandlerError>;
}

/// Shared, type-erased handler.
pub type BoxHandler = Arc<dyn Handler>;

/// A `Handler -> Handler` transformation.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxHandler) -> BoxHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxHandler) -> BoxHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        self(next)
    }
}

/// Ordered middleware chain.
#[derive(Clone, Default)]
pub struct Chain {
    layers: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware. Earlier middleware wraps later ones.
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Terminate the chain with `handler`.
    pub fn then(&self, handler: impl Handler) -> BoxHandler {
        self.then_boxed(Arc::new(handler))
    }

    pub fn then_boxed(&self, handler: BoxHandler) -> BoxHandler {
        self.layers
            .iter()
            .rev()
            .fold(handler, |next, layer| layer.wrap(next))
    }
}
