// SPDX-License-Identifier: MIT

//! RouterOS reply classification and record parsing
//!
//! A reply is an ordered list of sentences ending in `!done` or `!fatal`.
//! Each `!re` sentence describes one device object; its `key=value` words
//! become one [`Record`].

use std::collections::HashMap;

/// One protocol sentence: an ordered sequence of words.
pub type Sentence = Vec<String>;

/// One device object (interface, lease, address, ...) as attribute name to
/// value. Duplicate keys resolve last-write-wins.
pub type Record = HashMap<String, String>;

/// Converts a reply's sentences into records.
///
/// A sentence beginning with `!re` opens a record; `key=value` words (with or
/// without the API's leading `=`) populate it; the next `!re` or any control
/// sentence closes it. Words without a `=` are ignored rather than failing
/// the parse. An empty reply yields an empty list. A record still open at
/// end of input is flushed.
#[must_use]
pub fn parse_reply(sentences: &[Sentence]) -> Vec<Record> {
    let mut records: Vec<Record> = Vec::new();
    let mut current: Option<Record> = None;

    for sentence in sentences {
        let Some((first, attrs)) = sentence.split_first() else {
            continue;
        };
        if first == "!re" {
            if let Some(done) = current.take() {
                records.push(done);
            }
            let mut record = Record::new();
            for word in attrs {
                insert_attribute(&mut record, word);
            }
            current = Some(record);
        } else if first.starts_with('!') {
            // !done / !trap / !fatal close any open record
            if let Some(done) = current.take() {
                records.push(done);
            }
        } else if let Some(record) = current.as_mut() {
            // continuation words outside a control sentence
            insert_attribute(record, first);
            for word in attrs {
                insert_attribute(record, word);
            }
        }
    }

    if let Some(done) = current.take() {
        records.push(done);
    }
    records
}

fn insert_attribute(record: &mut Record, word: &str) {
    let stripped = word.strip_prefix('=').unwrap_or(word);
    if let Some((key, value)) = stripped.split_once('=') {
        if !key.is_empty() {
            record.insert(key.to_string(), value.to_string());
        }
    }
}

/// Value of `key` within a single sentence's attribute words.
pub(crate) fn sentence_attribute(sentence: &[String], key: &str) -> Option<String> {
    for word in sentence {
        let stripped = word.strip_prefix('=').unwrap_or(word);
        if let Some((k, v)) = stripped.split_once('=') {
            if k == key {
                return Some(v.to_string());
            }
        }
    }
    None
}

/// Message of the first `!trap` sentence, if any.
pub(crate) fn trap_message(sentences: &[Sentence]) -> Option<String> {
    let trap = sentences.iter().find(|s| s.first().is_some_and(|w| w == "!trap"))?;
    Some(sentence_attribute(trap, "message").unwrap_or_else(|| "trap".to_string()))
}

/// Message of a `!fatal` terminator, if the reply ended with one.
///
/// A `!fatal` carries its reason as bare words rather than attributes.
pub(crate) fn fatal_message(sentences: &[Sentence]) -> Option<String> {
    let last = sentences.last()?;
    if last.first().is_none_or(|w| w != "!fatal") {
        return None;
    }
    let reason = last[1..].join(" ");
    Some(if reason.is_empty() {
        "fatal".to_string()
    } else {
        reason
    })
}

/// Whether the reply ends with a clean `!done` terminator.
pub(crate) fn terminated_done(sentences: &[Sentence]) -> bool {
    sentences
        .last()
        .and_then(|s| s.first())
        .is_some_and(|w| w == "!done")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(words: &[&str]) -> Sentence {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn test_parse_reply_three_records() {
        let sentences = vec![
            sentence(&["!re", "=name=ether1", "=running=true"]),
            sentence(&["!re", "=name=ether2", "=running=false"]),
            sentence(&["!re", "=name=bridge1", "=type=bridge"]),
            sentence(&["!done"]),
        ];

        let records = parse_reply(&sentences);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["name"], "ether1");
        assert_eq!(records[0]["running"], "true");
        assert_eq!(records[1]["name"], "ether2");
        assert_eq!(records[2]["type"], "bridge");
    }

    #[test]
    fn test_parse_reply_empty() {
        assert!(parse_reply(&[]).is_empty());
        assert!(parse_reply(&[sentence(&["!done"])]).is_empty());
    }

    #[test]
    fn test_parse_reply_ignores_malformed_words() {
        let sentences = vec![
            sentence(&["!re", "=address=10.0.0.1", "stray-token", "=", "=comment=lab"]),
            sentence(&["!done"]),
        ];

        let records = parse_reply(&sentences);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["address"], "10.0.0.1");
        assert_eq!(records[0]["comment"], "lab");
        assert_eq!(records[0].len(), 2);
    }

    #[test]
    fn test_parse_reply_flushes_unterminated_record() {
        let sentences = vec![sentence(&["!re", "=name=ether1"])];

        let records = parse_reply(&sentences);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "ether1");
    }

    #[test]
    fn test_parse_reply_duplicate_key_last_wins() {
        let sentences = vec![
            sentence(&["!re", "=name=first", "=name=second"]),
            sentence(&["!done"]),
        ];

        let records = parse_reply(&sentences);
        assert_eq!(records[0]["name"], "second");
    }

    #[test]
    fn test_parse_reply_idempotent() {
        let sentences = vec![
            sentence(&["!re", "=name=ether1", "=mtu=1500"]),
            sentence(&["!re", "=name=ether2"]),
            sentence(&["!done"]),
        ];

        let first = parse_reply(&sentences);
        let second = parse_reply(&sentences);
        assert_eq!(first, second);
    }

    #[test]
    fn test_trap_message_extraction() {
        let sentences = vec![
            sentence(&["!trap", "=message=no such command"]),
            sentence(&["!done"]),
        ];
        assert_eq!(trap_message(&sentences).as_deref(), Some("no such command"));
    }

    #[test]
    fn test_trap_message_defaults_without_attribute() {
        let sentences = vec![sentence(&["!trap"]), sentence(&["!done"])];
        assert_eq!(trap_message(&sentences).as_deref(), Some("trap"));
    }

    #[test]
    fn test_fatal_message_extraction() {
        let sentences = vec![sentence(&["!fatal", "session", "terminated"])];
        assert_eq!(
            fatal_message(&sentences).as_deref(),
            Some("session terminated")
        );
        assert!(fatal_message(&[sentence(&["!done"])]).is_none());
    }

    #[test]
    fn test_terminator_detection() {
        assert!(terminated_done(&[sentence(&["!re"]), sentence(&["!done"])]));
        assert!(!terminated_done(&[sentence(&["!fatal"])]));
        assert!(!terminated_done(&[]));
    }
}
