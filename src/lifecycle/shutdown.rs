//! Shutdown coordination.
//!
//! # States
//! - Running: listener accepting and serving
//! - SignalReceived: a termination signal was observed
//! - Draining: listener stops accepting, in-flight work gets the grace period
//! - Stopped: terminal, clean or forced
//!
//! # State Transitions
//! ```text
//! Running → SignalReceived: first signal (or the signal source closing)
//! SignalReceived → Draining: drain published to the listener
//! Draining → Stopped: listener finished (Clean), or deadline / second signal (Forced)
//! Running → Stopped: listener exited on its own (Exited)
//! ```
//!
//! # Design Decisions
//! - State only moves forward and only `Coordinator::run` moves it
//! - Listeners observe state through a read-only `watch` receiver
//! - The grace period is a hard deadline; the listener task is aborted after it

use std::fmt;
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinError;
use tokio::time::Instant;

use crate::lifecycle::signals::Signal;

/// Lifecycle state of a supervised listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShutdownState {
    Running,
    SignalReceived,
    Draining,
    Stopped,
}

impl fmt::Display for ShutdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShutdownState::Running => "running",
            ShutdownState::SignalReceived => "signal-received",
            ShutdownState::Draining => "draining",
            ShutdownState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// How a supervised listener came to a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Drain finished inside the grace period. A listener that returned an
    /// error while draining still counts; the error is logged.
    Clean,
    /// Grace period elapsed or a second signal arrived; remaining work was cancelled.
    Forced,
    /// The listener stopped before any signal.
    Exited,
}

/// Failure while a listener is serving.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("listener i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Something the coordinator can start and drain.
#[async_trait]
pub trait Listener: Send + 'static {
    /// Short name used in lifecycle logs.
    fn name(&self) -> &'static str;

    /// Serve until `drain` fires, then finish in-flight work and return.
    async fn serve(self: Box<Self>, drain: DrainSignal) -> Result<(), ServeError>;
}

/// Read-only view of the coordinator state handed to a listener.
#[derive(Debug, Clone)]
pub struct DrainSignal {
    state: watch::Receiver<ShutdownState>,
    grace: Duration,
}

impl DrainSignal {
    /// Resolves once the coordinator has started draining (or is gone).
    pub async fn draining(&mut self) {
        let _ = self
            .state
            .wait_for(|state| *state >= ShutdownState::Draining)
            .await;
    }

    pub fn is_draining(&self) -> bool {
        *self.state.borrow() >= ShutdownState::Draining
    }

    /// Time in-flight work has once draining starts.
    pub fn grace(&self) -> Duration {
        self.grace
    }
}

/// Drives one listener through `Running → SignalReceived → Draining → Stopped`.
#[derive(Debug)]
pub struct Coordinator {
    state: watch::Sender<ShutdownState>,
    history: Mutex<Vec<ShutdownState>>,
    grace: Duration,
}

impl Coordinator {
    pub fn new(grace: Duration) -> Self {
        let (state, _) = watch::channel(ShutdownState::Running);
        Self {
            state,
            history: Mutex::new(vec![ShutdownState::Running]),
            grace,
        }
    }

    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Current state.
    pub fn state(&self) -> ShutdownState {
        *self.state.borrow()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<ShutdownState> {
        self.state.subscribe()
    }

    /// Every state entered so far, in order.
    pub fn transitions(&self) -> Vec<ShutdownState> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Serve `listener` until a signal arrives on `signals`, then drain it
    /// within the grace period.
    pub async fn run(
        &self,
        listener: Box<dyn Listener>,
        mut signals: mpsc::Receiver<Signal>,
    ) -> Outcome {
        let name = listener.name();
        let drain = DrainSignal {
            state: self.state.subscribe(),
            grace: self.grace,
        };
        let mut serving = tokio::spawn(listener.serve(drain));

        tracing::info!(listener = name, "Starting server");

        tokio::select! {
            signal = signals.recv() => {
                self.advance(ShutdownState::SignalReceived);
                match signal {
                    Some(signal) => {
                        tracing::info!(listener = name, %signal, "Shutting down server");
                    }
                    None => {
                        tracing::info!(listener = name, "Signal source closed, shutting down server");
                    }
                }
            }
            joined = &mut serving => {
                report_exit(name, joined, true);
                self.advance(ShutdownState::Stopped);
                return Outcome::Exited;
            }
        }

        self.advance(ShutdownState::Draining);
        let deadline = drain_deadline(Instant::now(), self.grace);

        let outcome = tokio::select! {
            drained = tokio::time::timeout_at(deadline, &mut serving) => match drained {
                Ok(joined) => {
                    report_exit(name, joined, false);
                    Outcome::Clean
                }
                Err(_) => {
                    tracing::warn!(
                        listener = name,
                        grace = ?self.grace,
                        "Grace period elapsed, forcing shutdown"
                    );
                    Outcome::Forced
                }
            },
            Some(signal) = signals.recv() => {
                tracing::warn!(listener = name, %signal, "Second signal received, forcing shutdown");
                Outcome::Forced
            }
        };

        if outcome == Outcome::Forced {
            serving.abort();
        }
        self.advance(ShutdownState::Stopped);
        tracing::debug!(listener = name, outcome = ?outcome, "Server stopped");

        outcome
    }

    /// Move forward to `next`. Returns false if already there or past it.
    fn advance(&self, next: ShutdownState) -> bool {
        let moved = self.state.send_if_modified(|state| {
            if next > *state {
                *state = next;
                true
            } else {
                false
            }
        });

        if moved {
            if let Ok(mut history) = self.history.lock() {
                history.push(next);
            }
            tracing::debug!(state = %next, "Shutdown state changed");
        }
        moved
    }
}

/// `now + grace`, or roughly thirty years out if that overflows.
fn drain_deadline(now: Instant, grace: Duration) -> Instant {
    now.checked_add(grace)
        .unwrap_or_else(|| now + Duration::from_secs(86400 * 365 * 30))
}

fn report_exit(name: &str, joined: Result<Result<(), ServeError>, JoinError>, early: bool) {
    match joined {
        Ok(Ok(())) if early => {
            tracing::warn!(listener = name, "Listener stopped before any shutdown signal");
        }
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(listener = name, error = %e, "Unexpected server error"),
        Err(e) => tracing::error!(listener = name, error = %e, "Listener task failed"),
    }
}
