//! Session plumbing for the Death Link counter
//!
//! This crate provides:
//! - Protocol packet types (`protocol`)
//! - Per-session state and packet handling (`SessionContext`)
//! - Console commands (`commands`)
//! - The websocket session loop and connect handshake (`connection`)

pub mod commands;
pub mod connection;
pub mod context;
pub mod error;
pub mod protocol;

// Re-exports
pub use commands::{process_line, ConsoleOutcome};
pub use connection::{candidate_urls, connect, Credentials, Session};
pub use context::SessionContext;
pub use error::SessionError;
pub use protocol::{ClientPacket, NetworkVersion, ServerPacket};

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
