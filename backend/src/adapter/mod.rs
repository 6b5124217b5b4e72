//! Ingest of externally authored CSV files.
//!
//! Agencies hand over spreadsheets that were never produced by the wizard:
//! arbitrary encodings, `;` or tab delimiters, legacy header spellings and
//! usually no `Row Type` column. This adapter detects encoding and
//! delimiter, normalizes headers onto the canonical catalogue and, when a
//! row carries no type tag, infers one from which fields are populated.
//!
//! Inference is advisory only: every inferred row is paired with a warning
//! and the guess never feeds fatal-error decisions. Rows produced by the
//! flattener never pass through here.

use crate::error::{IngestError, IngestResult};
use crate::normalize;
use crate::rows::{CanonicalHeader, Row, RowType};
use crate::validation::{IssueKind, Warning};
use serde::Serialize;
use std::path::Path;

/// Result of ingesting one external file.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutput {
    /// Normalized rows, in file order.
    pub rows: Vec<Row>,
    /// One advisory per inferred row type.
    pub warnings: Vec<Warning>,
    /// Detected encoding.
    pub encoding: String,
    /// Detected delimiter.
    pub delimiter: char,
    /// Headers as they appeared in the file.
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _, _) = chardet::detect(bytes);
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the detected encoding. Undecodable
/// sequences fall back to lossy UTF-8 rather than failing the whole file.
pub fn decode_bytes(bytes: &[u8], encoding: &str) -> String {
    match encoding {
        "iso-8859-1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Pick the delimiter by counting candidates in the header line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");
    let mut best = ',';
    let mut best_count = 0;
    for sep in [',', ';', '\t', '|'] {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best = sep;
        }
    }
    best
}

/// Ingest a CSV file from disk with full auto-detection.
pub fn ingest_file<P: AsRef<Path>>(path: P) -> IngestResult<IngestOutput> {
    let bytes = std::fs::read(path)?;
    ingest_bytes(&bytes)
}

/// Ingest raw CSV bytes with full auto-detection.
pub fn ingest_bytes(bytes: &[u8]) -> IngestResult<IngestOutput> {
    if bytes.is_empty() {
        return Err(IngestError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_bytes(bytes, &encoding);
    // Strip a UTF-8 BOM if the authoring tool left one.
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let delimiter = detect_delimiter(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::NoHeaders);
    }

    let mut rows = Vec::new();
    let mut warnings = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(build_row(index, &headers, &record, &mut warnings));
    }

    Ok(IngestOutput {
        rows,
        warnings,
        encoding,
        delimiter,
        headers,
    })
}

fn build_row(
    index: usize,
    headers: &[String],
    record: &csv::StringRecord,
    warnings: &mut Vec<Warning>,
) -> Row {
    let mut tagged_type: Option<RowType> = None;
    let mut canonical: Vec<(CanonicalHeader, String)> = Vec::new();
    let mut extra: Vec<(String, String)> = Vec::new();

    for (header, value) in headers.iter().zip(record.iter()) {
        if value.is_empty() {
            continue;
        }
        match CanonicalHeader::parse(header) {
            Some(CanonicalHeader::RowType) => tagged_type = Some(RowType::parse(value)),
            Some(h) => canonical.push((h, value.to_string())),
            None => extra.push((header.clone(), value.to_string())),
        }
    }

    let row_type = match tagged_type {
        Some(t) => t,
        None => {
            let inferred = infer_row_type(&canonical);
            warnings.push(Warning {
                row_index: Some(index),
                kind: IssueKind::UnknownRowType,
                message: format!(
                    "row has no Row Type column; inferred {} from its populated fields",
                    inferred
                ),
            });
            inferred
        }
    };

    // Same ZIP protection the flattener applies to wizard input.
    if row_type == RowType::Location {
        let is_zip = canonical
            .iter()
            .any(|(h, v)| *h == CanonicalHeader::LocationType && v.trim().eq_ignore_ascii_case("zip"));
        if is_zip {
            for (h, v) in &mut canonical {
                if *h == CanonicalHeader::LocationValue {
                    *v = normalize::fix_zip(v);
                }
            }
        }
    }

    let mut row = Row::new(row_type);
    for (h, v) in canonical {
        row = row.with(h, v);
    }
    for (name, v) in extra {
        row = row.with_extra(name, v);
    }
    row
}

/// Guess what an untagged row describes from which fields it populates.
/// Most specific first: a keyword row usually also names its campaign and
/// ad group, so the keyword field wins.
fn infer_row_type(canonical: &[(CanonicalHeader, String)]) -> RowType {
    let has = |header: CanonicalHeader| canonical.iter().any(|(h, _)| *h == header);
    let has_headline = canonical
        .iter()
        .any(|(h, _)| matches!(h, CanonicalHeader::Headline(_)));

    if has(CanonicalHeader::Keyword) {
        RowType::Keyword
    } else if has(CanonicalHeader::AdType) || has_headline || has(CanonicalHeader::FinalUrl) {
        RowType::Ad
    } else if has(CanonicalHeader::LocationType) || has(CanonicalHeader::LocationValue) {
        RowType::Location
    } else if has(CanonicalHeader::AssetType) || has(CanonicalHeader::AssetName) {
        RowType::Asset
    } else if has(CanonicalHeader::AdGroup) {
        RowType::AdGroup
    } else if has(CanonicalHeader::Campaign) {
        RowType::Campaign
    } else {
        RowType::Unknown(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("Campaign,Ad Group,Keyword"), ',');
        assert_eq!(detect_delimiter("Campaign;Ad Group;Keyword"), ';');
        assert_eq!(detect_delimiter("Campaign\tAd Group\tKeyword"), '\t');
        assert_eq!(detect_delimiter("single-column"), ',');
    }

    #[test]
    fn test_tagged_rows_pass_through_untouched() {
        let csv = "Row Type,Campaign,Keyword,Match Type\n\
                   CAMPAIGN,Brand,,\n\
                   KEYWORD,Brand,shoes,Exact";
        let out = ingest_bytes(csv.as_bytes()).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert!(out.warnings.is_empty());
        assert_eq!(*out.rows[1].row_type(), RowType::Keyword);
        assert_eq!(out.rows[1].get(CanonicalHeader::Keyword), Some("shoes"));
    }

    #[test]
    fn test_untagged_rows_inferred_with_advisory() {
        let csv = "Campaign,Ad Group,Keyword,Match Type\n\
                   Brand,Shoes,running shoes,Exact\n\
                   Brand,Shoes,,";
        let out = ingest_bytes(csv.as_bytes()).unwrap();
        assert_eq!(out.rows.len(), 2);
        assert_eq!(*out.rows[0].row_type(), RowType::Keyword);
        assert_eq!(*out.rows[1].row_type(), RowType::AdGroup);
        assert_eq!(out.warnings.len(), 2);
        assert_eq!(out.warnings[0].kind, IssueKind::UnknownRowType);
        assert!(out.warnings[0].message.contains("KEYWORD"));
    }

    #[test]
    fn test_header_aliases_and_extras() {
        let csv = "campaigns;ad groups;keywords;Quality Score\n\
                   Brand;Shoes;trail shoes;7";
        let out = ingest_bytes(csv.as_bytes()).unwrap();
        assert_eq!(out.delimiter, ';');
        let row = &out.rows[0];
        assert_eq!(row.get(CanonicalHeader::Campaign), Some("Brand"));
        assert_eq!(row.get(CanonicalHeader::AdGroup), Some("Shoes"));
        assert_eq!(row.get(CanonicalHeader::Keyword), Some("trail shoes"));
        assert_eq!(row.value_for("Quality Score"), Some("7"));
    }

    #[test]
    fn test_zip_fixup_applied_on_ingest() {
        let csv = "Row Type,Campaign,Location Type,Location Value\n\
                   LOCATION,Brand,ZIP,07030";
        let out = ingest_bytes(csv.as_bytes()).unwrap();
        assert_eq!(out.rows[0].get(CanonicalHeader::LocationValue), Some("'07030"));
    }

    #[test]
    fn test_blank_lines_skipped() {
        let csv = "Row Type,Campaign\nCAMPAIGN,Brand\n,\nCAMPAIGN,Other";
        let out = ingest_bytes(csv.as_bytes()).unwrap();
        assert_eq!(out.rows.len(), 2);
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(ingest_bytes(b""), Err(IngestError::EmptyFile)));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Zürich" in ISO-8859-1
        let bytes = b"Row Type,Campaign\nCAMPAIGN,Z\xfcrich";
        let out = ingest_bytes(bytes).unwrap();
        assert_eq!(out.rows[0].get(CanonicalHeader::Campaign), Some("Z\u{fc}rich"));
    }

    #[test]
    fn test_ingest_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agency.csv");
        std::fs::write(&path, "Row Type,Campaign,Keyword\nKEYWORD,Brand,shoes").unwrap();
        let out = ingest_file(&path).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(*out.rows[0].row_type(), RowType::Keyword);
    }

    #[test]
    fn test_quoted_cells_with_delimiter() {
        let csv = "Row Type,Campaign,Keyword\nKEYWORD,\"Brand, Inc.\",shoes";
        let out = ingest_bytes(csv.as_bytes()).unwrap();
        assert_eq!(out.rows[0].get(CanonicalHeader::Campaign), Some("Brand, Inc."));
    }
}
