//! Cross-task signals
//!
//! Both signals are `tokio::sync::watch` channels: a settable value that a
//! waiting task observes as "changed" and clears by reading it.

use std::sync::Arc;
use tokio::sync::watch;

/// Sender half of the count signal, held by the session
#[derive(Debug)]
pub struct CountSignal {
    tx: watch::Sender<u64>,
}

/// Create a count signal starting at `initial`
pub fn count_signal(initial: u64) -> (CountSignal, watch::Receiver<u64>) {
    let (tx, rx) = watch::channel(initial);
    (CountSignal { tx }, rx)
}

impl CountSignal {
    /// Publish a new running total and wake the reporter
    pub fn notify(&self, total: u64) {
        // send_replace never fails, even after the reporter has exited
        self.tx.send_replace(total);
    }
}

/// Trigger half of the shutdown signal
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<bool>>,
}

/// Listener half of the shutdown signal; clone one per task
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

/// Create a linked shutdown trigger and listener
pub fn shutdown_signal() -> (ShutdownTrigger, ShutdownListener) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx: Arc::new(tx) }, ShutdownListener { rx })
}

impl ShutdownTrigger {
    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl ShutdownListener {
    /// Wait until shutdown is requested
    ///
    /// Dropping every trigger counts as a shutdown request. Cancel safe.
    pub async fn wait(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}
