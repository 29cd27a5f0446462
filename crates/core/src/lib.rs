//! Core types for the Death Link counter
//!
//! This crate provides:
//! - Death link payload validation (`NotificationEvent`)
//! - The running death counter (`CounterState`)
//! - Server clock reconciliation (`ClockAnchor`)
//! - Monotonic clock sources for production and tests

pub mod clock;
pub mod counter;
pub mod event;

// Re-exports
pub use clock::{ClockAnchor, ManualClock, MonotonicClock, SystemClock};
pub use counter::CounterState;
pub use event::{EventError, NotificationEvent};
