//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use site_server::config::HttpConfig;
use site_server::http::{BoxHandler, Handler, HandlerError, HttpListener, ResponseWriter};
use site_server::lifecycle::{Coordinator, Outcome, Signal};
use site_server::lifecycle::signals;

/// Handler that sleeps, then answers with a fixed status and body.
#[allow(dead_code)]
pub struct Scripted {
    pub status: StatusCode,
    pub body: &'static str,
    pub delay: Duration,
}

#[async_trait]
impl Handler for Scripted {
    async fn serve(
        &self,
        _request: Request<Body>,
        writer: &mut dyn ResponseWriter,
    ) -> Result<(), HandlerError> {
        tokio::time::sleep(self.delay).await;
        writer.write_status(self.status);
        writer.write(self.body.as_bytes())?;
        Ok(())
    }
}

/// Handler that panics before writing anything.
#[allow(dead_code)]
pub struct Exploding;

#[async_trait]
impl Handler for Exploding {
    async fn serve(
        &self,
        _request: Request<Body>,
        _writer: &mut dyn ResponseWriter,
    ) -> Result<(), HandlerError> {
        panic!("handler exploded");
    }
}

/// A listener running under a coordinator on an ephemeral port.
pub struct RunningServer {
    pub addr: SocketAddr,
    pub signals: mpsc::Sender<Signal>,
    pub coordinator: Arc<Coordinator>,
    pub task: JoinHandle<Outcome>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Deliver a termination signal and wait for the coordinator to finish.
    #[allow(dead_code)]
    pub async fn stop(self) -> Outcome {
        self.signals.send(Signal::Terminate).await.unwrap();
        self.task.await.unwrap()
    }
}

/// Bind plain HTTP on 127.0.0.1 and start supervising it.
pub async fn start_server(handler: BoxHandler, grace: Duration) -> RunningServer {
    let mut config = HttpConfig {
        bind_address: "127.0.0.1:0".to_string(),
        read_header_timeout_secs: 5,
        ..HttpConfig::default()
    };
    config.tls.enabled = false;

    let listener = HttpListener::bind(&config, handler).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let coordinator = Arc::new(Coordinator::new(grace));
    let (tx, rx) = signals::manual();
    let task = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.run(Box::new(listener), rx).await }
    });

    RunningServer {
        addr,
        signals: tx,
        coordinator,
        task,
    }
}

/// Client without pooling or proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
