// SPDX-License-Identifier: MIT

//! # RouterOS Client
//!
//! Device-access client for MikroTik RouterOS used by the operations portal.
//!
//! Two transports reach the same class of managed device:
//! - the native binary API (length-prefixed sentences over TCP or TLS,
//!   `/login` handshake, `!re`/`!done`/`!trap`/`!fatal` replies), and
//! - an SSH/CLI fallback that captures console `print` output and parses it
//!   into the same record shape.
//!
//! ## Main modules
//! - `config`: device definitions and timeouts
//! - `error`: error taxonomy
//! - `routeros`: binary API transport and reply parsing
//! - `ssh`: SSH fallback invocation and console table parsers
//! - `prelude`: commonly used types and traits

mod config;
mod error;
mod routeros;
mod ssh;
pub mod prelude;

// Re-export commonly used types
/// Device configuration
pub use config::{Config, DeviceConfig};

/// Client error and result type
pub use error::{ClientError, Result};

/// Binary API client and reply types
pub use routeros::{Record, RouterOsClient, Sentence, parse_reply};

/// RouterOS wire protocol length encoding (public for tests)
pub use routeros::encode_length;

/// SSH fallback transport and console table parsers
pub use ssh::{
    CommandRunner, ParsedTable, SystemRunner, parse_address_table, parse_lease_table,
    parse_network_table, ssh_execute, ssh_execute_with,
};
