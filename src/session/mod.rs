//! Message persistence
//!
//! Sent and received messages are kept in a flat, append-only text file that
//! can be reloaded into the message pane.

pub mod message_log;

pub use message_log::{is_not_found, MessageLog, DEFAULT_LOG_FILE};
