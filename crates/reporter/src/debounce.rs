//! Burst debouncing for death link reports
//!
//! Chain deaths tend to arrive in bursts. Instead of logging the total for every
//! event, the reporter waits until no new death has been signalled for a full
//! window and then emits a single line with the current total.
//!
//! The window is re-armed by every signal, so it is always measured from the
//! most recent death.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::signal::ShutdownListener;

/// Quiet period before a report is emitted
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(5);

/// Destination for aggregate reports
pub trait ReportSink: Send + 'static {
    fn report(&self, total: u64);
}

/// Writes reports to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReportSink for LogSink {
    fn report(&self, total: u64) {
        info!("Death Link count: {}", total);
    }
}

impl ReportSink for mpsc::UnboundedSender<u64> {
    fn report(&self, total: u64) {
        // A closed receiver only means nobody is listening anymore
        let _ = self.send(total);
    }
}

/// How a pending window ended
enum Window {
    /// No signal for the whole window
    Quiet,
    /// Shutdown requested or the session dropped its signal
    Cancelled,
}

/// Debounced reporter task
///
/// Idle until the count signal changes, then pending until the signal has
/// been quiet for `delay`.
pub struct DebouncedReporter<S> {
    delay: Duration,
    counts: watch::Receiver<u64>,
    shutdown: ShutdownListener,
    sink: S,
}

impl<S: ReportSink> DebouncedReporter<S> {
    pub fn new(
        delay: Duration,
        counts: watch::Receiver<u64>,
        shutdown: ShutdownListener,
        sink: S,
    ) -> Self {
        Self {
            delay,
            counts,
            shutdown,
            sink,
        }
    }

    /// Spawn the reporter on the current runtime
    ///
    /// The returned handle completes once shutdown has been observed; await
    /// it before exiting so no countdown outlives the session.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the reporter loop until shutdown
    pub async fn run(mut self) {
        debug!(delay = ?self.delay, "Starting death link reporter");

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.wait() => break,
                changed = self.counts.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }

            match self.wait_for_quiet().await {
                Window::Quiet => {
                    let total = *self.counts.borrow_and_update();
                    self.sink.report(total);
                }
                Window::Cancelled => {
                    debug!("Pending death link report cancelled");
                    break;
                }
            }
        }

        debug!("Death link reporter stopped");
    }

    async fn wait_for_quiet(&mut self) -> Window {
        loop {
            let countdown = tokio::time::sleep(self.delay);

            tokio::select! {
                biased;
                _ = self.shutdown.wait() => return Window::Cancelled,
                changed = self.counts.changed() => {
                    if changed.is_err() {
                        return Window::Cancelled;
                    }
                    // re-arm
                }
                _ = countdown => return Window::Quiet,
            }
        }
    }
}
