//! Plain comma-delimited decoding and encoding.
//!
//! There is no quoting or escaping: a value containing a literal comma
//! shifts every later value of its row one column to the right, and the
//! encoder writes such a value verbatim. Both directions share this
//! limitation so an export decodes back to the same columns it came from.

use tracing::{debug, warn};

use crate::model::{Record, TaskId};

/// Decode CSV text into records, one per non-blank data line.
///
/// The first line is the header. Header names and values are trimmed.
/// Rows shorter than the header leave the trailing fields unset; values
/// beyond the header width are dropped.
#[must_use]
pub fn decode(text: &str) -> Vec<Record> {
    let mut lines = text.split('\n');
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<&str> = header_line.split(',').map(str::trim).collect();

    let mut records = Vec::new();
    let mut ragged = 0_usize;

    // Header is line 1; data lines are numbered from 2.
    for (offset, line) in lines.enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let values: Vec<&str> = line.split(',').map(str::trim).collect();
        if values.len() != headers.len() {
            ragged += 1;
        }

        let mut record = Record::new(TaskId::derive(offset + 2, trimmed));
        for (index, name) in headers.iter().enumerate() {
            record.insert(name, values.get(index).map(|value| (*value).to_string()));
        }
        records.push(record);
    }

    if ragged > 0 {
        warn!(
            ragged,
            columns = headers.len(),
            "rows with a column count different from the header"
        );
    }
    debug!(records = records.len(), "decoded csv payload");

    records
}

/// Encode records back into CSV text.
///
/// The header is taken from the first record's field names. Unset values
/// are written as empty strings.
#[must_use]
pub fn encode(records: &[Record]) -> String {
    let header = records
        .first()
        .map(|record| record.field_names().collect::<Vec<_>>().join(","))
        .unwrap_or_default();

    let rows = records
        .iter()
        .map(|record| {
            record
                .values()
                .map(|value| value.unwrap_or_default())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{header}\n{rows}")
}
