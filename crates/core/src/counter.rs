//! Running death link counter

use crate::event::NotificationEvent;

/// Counter state owned by a session
///
/// `count` only ever grows. The `last_*` fields describe the most recently
/// accepted event and are untouched by rejected payloads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CounterState {
    count: u64,
    last_event_time: Option<f64>,
    last_event_timed: Option<f64>,
}

impl CounterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted event and return the new total
    ///
    /// `estimated_now` is the reconciled server time at which the event was
    /// processed, if the clock has been anchored.
    pub fn record(&mut self, event: &NotificationEvent, estimated_now: Option<f64>) -> u64 {
        self.count += 1;
        self.last_event_time = Some(event.time);
        self.last_event_timed = estimated_now;
        self.count
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Server time carried by the last accepted event
    pub fn last_event_time(&self) -> Option<f64> {
        self.last_event_time
    }

    /// Estimated server time when the last accepted event was processed
    pub fn last_event_timed(&self) -> Option<f64> {
        self.last_event_timed
    }
}
