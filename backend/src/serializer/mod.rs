//! CSV serialization of the ordered row batch.
//!
//! The header line is the required column catalogue in its hard-coded
//! order, followed by every extra column observed across the rows in
//! alphabetical order, so the output schema is always a superset of what
//! the import tool expects. Cells are escaped RFC-4180 style. Rows are
//! joined with `\n`; the output is UTF-8 without a BOM and without a
//! trailing newline.

use crate::rows::{Row, REQUIRED_HEADERS};
use std::collections::BTreeSet;

/// Escape one CSV cell.
///
/// A cell containing a comma, double quote, CR or LF is wrapped in double
/// quotes with inner quotes doubled. Everything else passes through
/// byte-for-byte; values are never trimmed here, literal quote wrappers
/// from the ZIP fix-up included.
pub fn escape_csv(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// The output column list for a batch: the required catalogue first, then
/// any additional columns the rows carry, alphabetically.
pub fn build_headers(rows: &[Row]) -> Vec<String> {
    let required: BTreeSet<&str> = REQUIRED_HEADERS.iter().copied().collect();
    let mut extras: BTreeSet<String> = BTreeSet::new();
    for row in rows {
        for column in row.columns() {
            if !required.contains(column.as_str()) {
                extras.insert(column);
            }
        }
    }

    REQUIRED_HEADERS
        .iter()
        .map(|h| h.to_string())
        .chain(extras)
        .collect()
}

/// Serialize rows to CSV text. Cells a row does not populate are emitted
/// empty, so every line has the same column count as the header.
pub fn to_csv(rows: &[Row]) -> String {
    let headers = build_headers(rows);
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|h| escape_csv(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        let line = headers
            .iter()
            .map(|h| escape_csv(row.value_for(h).unwrap_or("")))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{CanonicalHeader, RowType};

    #[test]
    fn test_escape_passthrough_and_quoting() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("  padded  "), "  padded  ");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_escape_round_trip() {
        // Unescaping (strip wrapper, undouble quotes) recovers the input.
        for value in ["a,b", "say \"hi\"", "both, \"of\" them", "cr\rlf\n"] {
            let escaped = escape_csv(value);
            let inner = escaped
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap();
            assert_eq!(inner.replace("\"\"", "\""), value);
        }
    }

    #[test]
    fn test_headers_always_superset_of_required() {
        let rows = vec![Row::new(RowType::Keyword)
            .with(CanonicalHeader::Campaign, "C")
            .with(CanonicalHeader::Keyword, "shoes")];
        let headers = build_headers(&rows);
        for required in REQUIRED_HEADERS {
            assert!(headers.contains(&required.to_string()), "missing {}", required);
        }
        assert_eq!(&headers[..13], &REQUIRED_HEADERS.map(String::from)[..]);
    }

    #[test]
    fn test_extra_headers_sorted_after_required() {
        let rows = vec![Row::new(RowType::Campaign)
            .with(CanonicalHeader::Campaign, "C")
            .with(CanonicalHeader::StartDate, "2026-01-01")
            .with_extra("Tracking Template", "{lpurl}")
            .with_extra("Custom Label", "x")];
        let headers = build_headers(&rows);
        assert_eq!(&headers[13..], ["Custom Label", "Start Date", "Tracking Template"]);
    }

    #[test]
    fn test_zip_leading_zero_survives_serialization() {
        let rows = vec![Row::new(RowType::Location)
            .with(CanonicalHeader::Campaign, "C")
            .with(CanonicalHeader::LocationType, "ZIP")
            .with(CanonicalHeader::LocationValue, crate::normalize::fix_zip("07030"))];
        let csv = to_csv(&rows);
        assert!(csv.contains("'07030"), "{}", csv);
    }

    #[test]
    fn test_no_trailing_newline_and_rectangular() {
        let rows = vec![
            Row::new(RowType::Campaign).with(CanonicalHeader::Campaign, "A, Inc."),
            Row::new(RowType::AdGroup)
                .with(CanonicalHeader::Campaign, "A, Inc.")
                .with(CanonicalHeader::AdGroup, "G"),
        ];
        let csv = to_csv(&rows);
        assert!(!csv.ends_with('\n'));
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 3);
        // rectangular: every line yields the same column count
        let columns = |line: &str| {
            let mut count = 1;
            let mut in_quotes = false;
            for c in line.chars() {
                match c {
                    '"' => in_quotes = !in_quotes,
                    ',' if !in_quotes => count += 1,
                    _ => {}
                }
            }
            count
        };
        let header_columns = columns(lines[0]);
        assert!(lines.iter().all(|l| columns(l) == header_columns));
    }

    #[test]
    fn test_deterministic_output() {
        let rows = vec![
            Row::new(RowType::Campaign)
                .with(CanonicalHeader::Campaign, "C")
                .with_extra("Zeta", "1")
                .with_extra("Alpha", "2"),
        ];
        assert_eq!(to_csv(&rows), to_csv(&rows.clone()));
    }
}
