//! Process-wide shutdown signal
//!
//! A cooperative `running` flag: the accept loop watches it and stops taking
//! connections once it is cleared.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{error, info};

use crate::dispatcher::Command;

/// Clonable handle over the `running` flag
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self { tx: Arc::new(tx) }
    }

    /// Clear the flag; every waiter wakes up
    pub fn trigger(&self) {
        self.tx.send_replace(false);
    }

    pub fn is_running(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once `trigger` has been called (immediately if it already was)
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|running| !*running).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Tell every client the server is going away, then clear the flag
///
/// A dispatcher that is already gone is logged; the flag is cleared anyway so
/// the process still terminates.
pub async fn initiate(cmd_tx: &mpsc::Sender<Command>, shutdown: &Shutdown) {
    info!("Shutdown requested");

    let (reply_tx, reply_rx) = oneshot::channel();
    if cmd_tx.send(Command::Shutdown { reply: reply_tx }).await.is_err() {
        error!("Dispatcher closed before shutdown notice could be sent");
    } else {
        match reply_rx.await {
            Ok(recipients) => info!("Shutdown notice queued for {} clients", recipients),
            Err(_) => error!("Dispatcher dropped the shutdown request"),
        }
    }

    shutdown.trigger();
}
