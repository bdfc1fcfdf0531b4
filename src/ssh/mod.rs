//! SSH/CLI fallback transport
//!
//! Used when the binary API port is unreachable: run one `print` command over
//! SSH, then reconstruct the same record lists the API client would have
//! produced from the console text.

mod invoke;
mod tables;

pub use invoke::{CommandRunner, SystemRunner, ssh_execute, ssh_execute_with};
pub use tables::{ParsedTable, parse_address_table, parse_lease_table, parse_network_table};
