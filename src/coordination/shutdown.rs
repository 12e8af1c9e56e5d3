//! Graceful Shutdown Handler
//!
//! One `watch<bool>` channel fans the stop request out to the refresh
//! scheduler and the API server.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Shutdown coordinator
#[derive(Clone)]
pub struct GracefulShutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl GracefulShutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Receiver that observes `true` once shutdown has been requested
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn is_requested(&self) -> bool {
        *self.tx.borrow()
    }

    /// Request shutdown; later calls are no-ops
    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            info!("shutdown requested");
        }
    }

    /// Trigger shutdown on Ctrl-C (and SIGTERM on unix)
    pub fn listen_for_signals(&self) -> tokio::task::JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            this.trigger();
        })
    }
}

impl Default for GracefulShutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            warn!("cannot listen for SIGTERM: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("cannot listen for Ctrl-C: {}", e);
            }
            return;
        }
    };
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("cannot listen for Ctrl-C: {}", e);
            }
        }
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("cannot listen for Ctrl-C: {}", e);
    }
}
