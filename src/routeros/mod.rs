//! `MikroTik` `RouterOS` binary API client module
//!
//! This module provides the native management-protocol transport: TCP/TLS
//! connection, length-prefixed word framing, login handshake, and reply
//! parsing into records.

mod client;
mod connection;
mod reply;

// Re-export public types and functions
pub use client::RouterOsClient;
pub use connection::encode_length;
pub use reply::{Record, Sentence, parse_reply};
