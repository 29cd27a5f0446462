//! Server clock reconciliation
//!
//! The server reports its clock once, in the room metadata sent right after
//! connecting. Later server times are estimated by adding the local monotonic
//! time elapsed since that packet, so wall-clock adjustments on the client never
//! leak into the estimate.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Source of monotonic time in seconds
pub trait MonotonicClock: Send + Sync {
    /// Seconds elapsed since an arbitrary fixed origin; never decreases
    fn now(&self) -> f64;
}

/// Monotonic clock backed by `std::time::Instant`
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Manually driven clock for tests and replay
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to the code under test.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(start.to_bits())),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, secs: f64) {
        self.bits.store(secs.to_bits(), Ordering::SeqCst);
    }

    /// Move forward by `secs`
    pub fn advance(&self, secs: f64) {
        let next = self.now() + secs;
        self.set(next);
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

/// Pairing of an authoritative server time with the local time it was observed at
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClockAnchor {
    server_time: Option<f64>,
    local_time: Option<f64>,
}

impl ClockAnchor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the anchor. Only the first call has an effect.
    ///
    /// Returns `true` if this call set the anchor.
    pub fn anchor(&mut self, server_time: f64, local_now: f64) -> bool {
        if self.is_anchored() {
            return false;
        }
        self.server_time = Some(server_time);
        self.local_time = Some(local_now);
        true
    }

    pub fn is_anchored(&self) -> bool {
        self.server_time.is_some() && self.local_time.is_some()
    }

    /// Estimated server time at `local_now`, or `None` before anchoring
    pub fn estimate_now(&self, local_now: f64) -> Option<f64> {
        match (self.server_time, self.local_time) {
            (Some(server), Some(local)) => Some(server + (local_now - local)),
            _ => None,
        }
    }

    pub fn server_time(&self) -> Option<f64> {
        self.server_time
    }

    pub fn local_time(&self) -> Option<f64> {
        self.local_time
    }
}
