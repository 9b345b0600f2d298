//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Bind the TCP listener, optionally with TLS
//! - Bridge the writer-based handler chain into an axum Router
//! - Apply the read-header timeout
//! - Stop accepting and drain when the coordinator says so
//!
//! # Design Decisions
//! - Cancelling `serve` hard-closes every connection
//! - Dropping a request aborts the task running its handler

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use hyper_util::{
    rt::{TokioExecutor, TokioTimer},
    server::conn::auto::Builder,
};
use tokio::task::AbortHandle;
use tower_http::trace::TraceLayer;

use crate::config::HttpConfig;
use crate::http::handler::BoxHandler;
use crate::http::writer::BufferedWriter;
use crate::lifecycle::shutdown::{DrainSignal, Listener, ServeError};
use crate::lifecycle::startup::StartupError;
use crate::net::tls::load_tls_config;

/// A bound HTTP(S) listener serving a handler chain.
pub struct HttpListener {
    listener: std::net::TcpListener,
    tls: Option<RustlsConfig>,
    router: Router,
    read_header_timeout: Duration,
}

impl HttpListener {
    /// Bind the configured address and load TLS material. Any failure here
    /// is fatal.
    pub async fn bind(config: &HttpConfig, handler: BoxHandler) -> Result<Self, StartupError> {
        let addr: SocketAddr =
            config
                .bind_address
                .parse()
                .map_err(|source| StartupError::InvalidAddress {
                    addr: config.bind_address.clone(),
                    source,
                })?;

        let tls = match config.tls() {
            Some(tls) => Some(
                load_tls_config(&tls.cert_path, &tls.key_path)
                    .await
                    .map_err(StartupError::Tls)?,
            ),
            None => None,
        };

        let listener = std::net::TcpListener::bind(addr)
            .and_then(|listener| {
                listener.set_nonblocking(true)?;
                Ok(listener)
            })
            .map_err(|source| StartupError::Bind { addr, source })?;

        let local_addr = listener
            .local_addr()
            .map_err(|source| StartupError::Bind { addr, source })?;

        tracing::debug!(
            address = %local_addr,
            tls = tls.is_some(),
            "Listener bound"
        );

        Ok(Self {
            listener,
            tls,
            router: router(handler),
            read_header_timeout: config.read_header_timeout(),
        })
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

#[async_trait]
impl Listener for HttpListener {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn serve(self: Box<Self>, mut drain: DrainSignal) -> Result<(), ServeError> {
        let HttpListener {
            listener,
            tls,
            router,
            read_header_timeout,
        } = *self;

        let handle = Handle::new();
        let grace = drain.grace();
        let watcher = tokio::spawn({
            let handle = handle.clone();
            async move {
                drain.draining().await;
                handle.graceful_shutdown(Some(grace));
            }
        });
        let _close = HardClose {
            handle: handle.clone(),
            watcher: watcher.abort_handle(),
        };

        let app = router.into_make_service();
        let served = match tls {
            Some(tls) => {
                let mut server = axum_server::from_tcp_rustls(listener, tls).handle(handle);
                apply_timeouts(server.http_builder(), read_header_timeout);
                server.serve(app).await
            }
            None => {
                let mut server = axum_server::from_tcp(listener).handle(handle);
                apply_timeouts(server.http_builder(), read_header_timeout);
                server.serve(app).await
            }
        };

        tracing::debug!("HTTP server stopped");
        served.map_err(ServeError::from)
    }
}

/// Closes every connection when `serve` returns or is aborted.
struct HardClose {
    handle: Handle,
    watcher: AbortHandle,
}

impl Drop for HardClose {
    fn drop(&mut self) {
        self.watcher.abort();
        self.handle.shutdown();
    }
}

/// Aborts a request task once its response future is dropped.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn apply_timeouts(builder: &mut Builder<TokioExecutor>, read_header_timeout: Duration) {
    builder
        .http1()
        .timer(TokioTimer::new())
        .header_read_timeout(read_header_timeout);
}

/// Router that runs `handler` for every request.
pub fn router(handler: BoxHandler) -> Router {
    Router::new()
        .fallback(move |request: Request<Body>| dispatch(handler.clone(), request))
        .layer(TraceLayer::new_for_http())
}

/// Run the chain in its own task so a panic cannot take the connection down.
/// Failures before any status was committed become a 500.
async fn dispatch(handler: BoxHandler, request: Request<Body>) -> Response {
    let path = request.uri().path().to_string();

    let task = tokio::spawn(async move {
        let mut writer = BufferedWriter::new();
        let result = handler.serve(request, &mut writer).await;
        (writer, result)
    });
    let _cancel = AbortOnDrop(task.abort_handle());

    match task.await {
        Ok((writer, Ok(()))) => writer.into_response(),
        Ok((writer, Err(e))) => {
            tracing::warn!(path = %path, error = %e, "Handler failed");
            if writer.status().is_some() {
                writer.into_response()
            } else {
                internal_error()
            }
        }
        Err(e) => {
            tracing::error!(path = %path, error = %e, "Handler panicked");
            internal_error()
        }
    }
}

fn internal_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}
