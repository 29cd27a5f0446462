//! Debounced death link reporting
//!
//! This crate provides:
//! - The count signal shared between the session task and the reporter
//! - A cooperative shutdown signal
//! - The debounced reporter task that collapses bursts into one log line

pub mod debounce;
pub mod signal;

// Re-exports
pub use debounce::{DebouncedReporter, LogSink, ReportSink, DEFAULT_DEBOUNCE};
pub use signal::{count_signal, shutdown_signal, CountSignal, ShutdownListener, ShutdownTrigger};
