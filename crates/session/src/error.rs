//! Session error types

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors that end a session
#[derive(Debug, Error)]
pub enum SessionError {
    /// Websocket or TLS failure
    #[error("transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    /// A frame that is not a JSON array of packets
    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] serde_json::Error),

    /// The server rejected the `Connect` packet
    #[error("connection refused by server: {}", .errors.join(", "))]
    Refused { errors: Vec<String> },

    /// None of the candidate URLs accepted a connection
    #[error("could not connect to {address}: {reason}")]
    Unreachable { address: String, reason: String },

    /// The server asked for something only the console could answer, and
    /// the console is closed
    #[error("no {what} given and the console is closed")]
    PromptUnanswered { what: &'static str },

    /// The server closed the connection
    #[error("server closed the connection")]
    Closed,
}
