// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
//! Line codec for the file backend.
//!
//! # Format
//! ```text
//! <sequence>\t<event_type>\t<key>\t<value>\n
//! ```
//! `event_type` is the numeric code (DELETE=1, PUT=2). Backslash, tab,
//! carriage return and newline inside `key`/`value` are written as `\\`,
//! `\t`, `\r` and `\n`, so a record always occupies exactly one line.

use crate::error::{PersistenceError, Result};
use kvlog_kernel::{Event, EventType};

pub const FIELD_SEPARATOR: char = '\t';
pub const RECORD_SEPARATOR: char = '\n';
const FIELD_COUNT: usize = 4;

/// Encode `event` under `sequence`, including the trailing newline.
pub fn encode_record(sequence: u64, event: &Event) -> String {
    let mut line = String::with_capacity(event.key.len() + event.value.len() + 24);
    line.push_str(&sequence.to_string());
    line.push(FIELD_SEPARATOR);
    line.push_str(&event.event_type.code().to_string());
    line.push(FIELD_SEPARATOR);
    escape_into(&event.key, &mut line);
    line.push(FIELD_SEPARATOR);
    escape_into(&event.value, &mut line);
    line.push(RECORD_SEPARATOR);
    line
}

/// Decode one line (without its newline). `record` is the 1-based line
/// number used in error reports.
pub fn decode_line(line: &str, record: u64) -> Result<Event> {
    let parse_err = |reason: String| PersistenceError::Parse { record, reason };

    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() != FIELD_COUNT {
        return Err(parse_err(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            fields.len()
        )));
    }

    let sequence = fields[0]
        .parse::<u64>()
        .map_err(|e| parse_err(format!("invalid sequence {:?}: {}", fields[0], e)))?;

    let raw_type = fields[1]
        .parse::<i64>()
        .map_err(|e| parse_err(format!("invalid event type {:?}: {}", fields[1], e)))?;
    let event_type = EventType::try_from(raw_type).map_err(|e| parse_err(e.to_string()))?;

    let key = unescape(fields[2]).map_err(&parse_err)?;
    if key.is_empty() {
        return Err(parse_err("empty key".to_string()));
    }
    let value = unescape(fields[3]).map_err(&parse_err)?;

    Ok(Event {
        sequence,
        event_type,
        key,
        value,
    })
}

fn escape_into(field: &str, out: &mut String) {
    for c in field.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
}

fn unescape(field: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => return Err(format!("invalid escape \\{}", other)),
            None => return Err("dangling escape at end of field".to_string()),
        }
    }
    Ok(out)
}
