// SPDX-License-Identifier: MIT

//! Parsers for RouterOS `print` console tables
//!
//! Each `print` command has its own column layout; one parser per shape the
//! portal consumes. Parsing is best-effort by design: device output is not
//! under our control, so a row that does not match its expected shape is
//! skipped and counted, never fatal. A `;;; comment` line is buffered and
//! attached to the next data row.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::routeros::Record;

static LEASE_BOUND_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s+(\d{1,3}(?:\.\d{1,3}){3})\s+([0-9A-Fa-f:]{17})$").unwrap()
});

static LEASE_FLAGGED_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-ZX])\s+(\d{1,3}(?:\.\d{1,3}){3})\s+([0-9A-Fa-f:]{17})$").unwrap()
});

static NETWORK_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d+)\s+(\d{1,3}(?:\.\d{1,3}){3}/\d{1,2})\s+(\d{1,3}(?:\.\d{1,3}){3})\s+(\d{1,3}(?:\.\d{1,3}){3})\s+(\d{1,3}(?:\.\d{1,3}){3})(?:\s+(\S+))?$",
    )
    .unwrap()
});

static ADDRESS_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)\s+(\d{1,3}(?:\.\d{1,3}){3}/\d{1,2})\s+(\d{1,3}(?:\.\d{1,3}){3})\s+(\S+)$")
        .unwrap()
});

/// Result of parsing one console table.
///
/// `skipped_lines` counts non-empty lines that matched neither a header nor
/// the table's row shape, so callers can tell "clean table" from "parser and
/// firmware disagree about the layout".
#[derive(Debug)]
pub struct ParsedTable {
    pub records: Vec<Record>,
    pub skipped_lines: usize,
}

/// Parses `/ip dhcp-server lease print` console output.
///
/// Rows are either `<seq> <ip> <mac>` (status defaults to `bound`) or
/// `<flag-letter> <ip> <mac>` for tracked states. Record keys: `status`,
/// `address`, `mac-address`, `comment` (defaults to `Unknown`).
#[must_use]
pub fn parse_lease_table(raw: &str) -> ParsedTable {
    scan_table(raw, Some("Unknown"), |line| {
        if let Some(caps) = LEASE_BOUND_ROW.captures(line) {
            let mut record = Record::new();
            record.insert("status".to_string(), "bound".to_string());
            record.insert("address".to_string(), caps[2].to_string());
            record.insert("mac-address".to_string(), caps[3].to_string());
            Some(record)
        } else if let Some(caps) = LEASE_FLAGGED_ROW.captures(line) {
            let mut record = Record::new();
            record.insert("status".to_string(), caps[1].to_string());
            record.insert("address".to_string(), caps[2].to_string());
            record.insert("mac-address".to_string(), caps[3].to_string());
            Some(record)
        } else {
            None
        }
    })
}

/// Parses `/ip dhcp-server network print` console output.
///
/// Row shape `<seq> <cidr> <gateway> <dns1> <dns2> [<domain>]`. Record keys:
/// `id`, `address`, `gateway`, `dns1`, `dns2`, `domain`, plus `comment` when
/// a `;;;` line preceded the row.
#[must_use]
pub fn parse_network_table(raw: &str) -> ParsedTable {
    scan_table(raw, None, |line| {
        let caps = NETWORK_ROW.captures(line)?;
        let mut record = Record::new();
        record.insert("id".to_string(), caps[1].to_string());
        record.insert("address".to_string(), caps[2].to_string());
        record.insert("gateway".to_string(), caps[3].to_string());
        record.insert("dns1".to_string(), caps[4].to_string());
        record.insert("dns2".to_string(), caps[5].to_string());
        record.insert(
            "domain".to_string(),
            caps.get(6).map_or(String::new(), |m| m.as_str().to_string()),
        );
        Some(record)
    })
}

/// Parses `/ip address print` console output.
///
/// Row shape `<seq> <cidr> <network> <interface>`. Record keys: `id`,
/// `address`, `network`, `interface`, plus `comment` when present.
#[must_use]
pub fn parse_address_table(raw: &str) -> ParsedTable {
    scan_table(raw, None, |line| {
        let caps = ADDRESS_ROW.captures(line)?;
        let mut record = Record::new();
        record.insert("id".to_string(), caps[1].to_string());
        record.insert("address".to_string(), caps[2].to_string());
        record.insert("network".to_string(), caps[3].to_string());
        record.insert("interface".to_string(), caps[4].to_string());
        Some(record)
    })
}

/// Shared scan loop: header skipping, pending-comment attachment, and
/// skipped-line accounting.
fn scan_table(
    raw: &str,
    comment_default: Option<&str>,
    match_row: impl Fn(&str) -> Option<Record>,
) -> ParsedTable {
    let mut records: Vec<Record> = Vec::new();
    let mut skipped_lines = 0usize;
    let mut pending_comment: Option<String> = None;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || is_header(line) {
            continue;
        }
        if let Some(comment) = line.strip_prefix(";;;") {
            pending_comment = Some(comment.trim().to_string());
            continue;
        }
        match match_row(line) {
            Some(mut record) => {
                match pending_comment.take() {
                    Some(comment) => {
                        record.insert("comment".to_string(), comment);
                    }
                    None => {
                        if let Some(default) = comment_default {
                            record.insert("comment".to_string(), default.to_string());
                        }
                    }
                }
                records.push(record);
            }
            None => skipped_lines += 1,
        }
    }

    ParsedTable {
        records,
        skipped_lines,
    }
}

fn is_header(line: &str) -> bool {
    line.starts_with("Flags:") || line.starts_with("Columns:") || line.starts_with('#')
}
