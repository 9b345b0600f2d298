//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Translate signals to internal events on a channel
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Forwarding never blocks; deliveries beyond the buffer are dropped
//! - The coordinator reads the channel, so tests can feed it by hand

use std::fmt;
use std::io;

use tokio::sync::mpsc::{self, error::TrySendError};

/// Deliveries buffered before further signals are dropped.
const SIGNAL_BUFFER: usize = 4;

/// A termination request from the operating environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Interrupt,
    Terminate,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Interrupt => f.write_str("SIGINT"),
            Signal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Channel fed by hand instead of by the OS.
pub fn manual() -> (mpsc::Sender<Signal>, mpsc::Receiver<Signal>) {
    mpsc::channel(SIGNAL_BUFFER)
}

/// Register SIGINT and SIGTERM and forward them onto a channel from a
/// dedicated task. Must be called inside a Tokio runtime.
#[cfg(unix)]
pub fn listen() -> io::Result<mpsc::Receiver<Signal>> {
    use tokio::signal::unix::{signal, SignalKind};

    let (tx, rx) = manual();
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                Some(()) = interrupt.recv() => Signal::Interrupt,
                Some(()) = terminate.recv() => Signal::Terminate,
                else => break,
            };
            if !forward(&tx, received) {
                break;
            }
        }
    });

    Ok(rx)
}

/// Ctrl-C only off unix.
#[cfg(not(unix))]
pub fn listen() -> io::Result<mpsc::Receiver<Signal>> {
    let (tx, rx) = manual();

    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if !forward(&tx, Signal::Interrupt) {
                break;
            }
        }
    });

    Ok(rx)
}

/// Returns false once nobody is listening.
fn forward(tx: &mpsc::Sender<Signal>, signal: Signal) -> bool {
    match tx.try_send(signal) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::debug!(%signal, "Signal buffer full, dropping delivery");
            true
        }
        Err(TrySendError::Closed(_)) => false,
    }
}
