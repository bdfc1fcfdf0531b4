// SPDX-License-Identifier: MIT

//! Prelude module for convenient imports
//!
//! ```rust
//! use routeros_client::prelude::*;
//! ```

// Core types
pub use crate::config::{Config, DeviceConfig};
pub use crate::error::{ClientError, Result};

// Binary API client
pub use crate::routeros::{Record, RouterOsClient, Sentence, parse_reply};

// SSH fallback
pub use crate::ssh::{
    CommandRunner, ParsedTable, SystemRunner, parse_address_table, parse_lease_table,
    parse_network_table, ssh_execute, ssh_execute_with,
};
