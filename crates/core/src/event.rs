//! Death link payload validation
//!
//! Payloads arrive from the network as untyped JSON objects. A payload is only
//! accepted when its `time` field is a floating-point number; integers, strings
//! and null are rejected even though some of them could be coerced.

use serde_json::Value;
use thiserror::Error;

/// A validated death link notification
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    /// Server clock time of the death, in seconds
    pub time: f64,
    /// Name of the player that died (empty when not provided)
    pub source: String,
    /// Free-form death message (empty when not provided)
    pub cause: String,
}

/// Reasons a death link payload is discarded
#[derive(Debug, Error, PartialEq)]
pub enum EventError {
    /// `time` is missing or not a float
    #[error("Received malformed death link {{ time:{time}, source:{source_name}, text: {cause} }}, discarding it.")]
    MalformedTime {
        /// The offending `time` value as JSON, or `None` when absent or null
        time: String,
        source_name: String,
        cause: String,
    },
}

impl NotificationEvent {
    /// Validate a raw `data` mapping from a death link bounce
    pub fn from_payload(data: &Value) -> Result<Self, EventError> {
        let source = string_field(data, "source");
        let cause = string_field(data, "cause");

        match data.get("time") {
            Some(Value::Number(n)) if n.is_f64() => {
                // is_f64() guarantees as_f64() succeeds
                let time = n.as_f64().unwrap_or_default();
                Ok(Self { time, source, cause })
            }
            other => Err(EventError::MalformedTime {
                time: match other {
                    None | Some(Value::Null) => "None".to_string(),
                    Some(value) => value.to_string(),
                },
                source_name: source,
                cause,
            }),
        }
    }

    /// Human readable description of the death, used for console echo
    pub fn describe(&self) -> String {
        if self.source.is_empty() {
            format!("Killed because of \"{}\"", self.cause)
        } else {
            format!("Killed by {}, because of \"{}\"", self.source, self.cause)
        }
    }
}

/// Read a string field, rendering non-string values and defaulting to ""
fn string_field(data: &Value, key: &str) -> String {
    match data.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
