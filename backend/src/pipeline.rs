//! High-level export pipeline.
//!
//! This module composes the whole flow: flatten the campaign graph,
//! validate the rows, reorder them for the import tool and serialize to
//! CSV. [`generate`] is the one entry point the CLI and the HTTP server
//! both call.
//!
//! # Example
//!
//! ```rust,ignore
//! use adexport::models::Campaign;
//! use adexport::pipeline::generate;
//!
//! let campaigns: Vec<Campaign> = serde_json::from_str(payload)?;
//! let output = generate(&campaigns)?;
//! std::fs::write("import.csv", &output.csv)?;
//! ```

use serde::Serialize;

use crate::api::logs::{log_info, log_success, log_warning, log_warning_indent};
use crate::error::{ExportError, ExportResult};
use crate::flatten::flatten;
use crate::models::Campaign;
use crate::order::order_rows;
use crate::rows::Row;
use crate::serializer::to_csv;
use crate::validation::{validate, ValidationReport};

/// Result of a successful export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutput {
    /// The CSV document, ready to write.
    pub csv: String,
    /// Number of data rows (header line excluded).
    pub row_count: usize,
    /// The validation report; fatal-free by construction, warnings kept.
    pub validation: ValidationReport,
}

/// Run the full export: flatten → validate → order → serialize.
///
/// Returns [`ExportError::ValidationFailed`] carrying the complete report
/// when any fatal finding exists; no CSV is produced in that case.
/// Warnings never block the export. Deterministic: the same input yields
/// byte-identical CSV and an identical report.
pub fn generate(campaigns: &[Campaign]) -> ExportResult<ExportOutput> {
    log_info(format!("Flattening {} campaign(s)...", campaigns.len()));
    let rows = flatten(campaigns);
    log_info(format!("Validating {} row(s)...", rows.len()));

    // Validation runs on the unordered sequence so row indices in the
    // report match the flattener's (and the wizard's) order.
    let validation = validate(&rows);
    if validation.is_fatal() {
        log_warning(format!(
            "Export aborted: {} fatal validation error(s)",
            validation.fatal_errors.len()
        ));
        return Err(ExportError::ValidationFailed { report: validation });
    }
    for warning in &validation.warnings {
        match warning.row_index {
            Some(i) => log_warning_indent(format!("row {}: {}", i, warning.message), 1),
            None => log_warning_indent(warning.message.clone(), 1),
        }
    }

    let ordered = order_rows(rows);
    let csv = to_csv(&ordered);
    log_success(format!(
        "Generated CSV with {} row(s), {} warning(s)",
        ordered.len(),
        validation.warning_count()
    ));

    Ok(ExportOutput {
        csv,
        row_count: ordered.len(),
        validation,
    })
}

/// Validate a campaign graph without serializing.
pub fn check(campaigns: &[Campaign]) -> ValidationReport {
    validate(&flatten(campaigns))
}

/// Flatten and reorder without validating, for callers that want the raw
/// row model (the `flatten` CLI command, the wizard's preview table).
pub fn flatten_ordered(campaigns: &[Campaign]) -> Vec<Row> {
    order_rows(flatten(campaigns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn campaigns(value: serde_json::Value) -> Vec<Campaign> {
        serde_json::from_value(value).unwrap()
    }

    fn well_formed() -> Vec<Campaign> {
        campaigns(json!([{
            "name": "Brand",
            "budget": 50,
            "adGroups": [{
                "name": "Shoes",
                "ads": [{
                    "finalUrl": "https://example.com/shoes",
                    "headlines": ["Run Faster", "Feel Better", "Shop Today"],
                    "descriptions": ["Engineered for distance.", "Free returns on all orders."]
                }],
                "keywords": ["[running shoes]", "\"trail shoes\"", "shoes"]
            }],
            "locations": [{ "type": "zip", "value": "07030" }]
        }]))
    }

    // A well-formed campaign exports cleanly: ordered rows, all required
    // headers, no warnings.
    #[test]
    fn test_well_formed_campaign_exports() {
        let output = generate(&well_formed()).unwrap();
        assert_eq!(output.row_count, 7);
        assert_eq!(output.validation.warning_count(), 0);

        let mut lines = output.csv.split('\n');
        let header = lines.next().unwrap();
        assert!(header.starts_with("Row Type,Campaign,Ad Group,"));
        let first_cells: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(first_cells[0], "CAMPAIGN");

        // leading-zero ZIP survives end to end
        assert!(output.csv.contains("'07030"));
    }

    // A missing Final URL aborts the export with the full report attached.
    #[test]
    fn test_fatal_error_blocks_export() {
        let input = campaigns(json!([{
            "name": "Brand",
            "adGroups": [{ "name": "G", "ads": [{ "headlines": ["A", "B", "C"],
                                                  "descriptions": ["D1", "D2"] }] }]
        }]));
        match generate(&input) {
            Err(ExportError::ValidationFailed { report }) => {
                assert!(report.is_fatal());
                assert_eq!(report.fatal_errors.len(), 1);
            }
            other => panic!("expected ValidationFailed, got {:?}", other.map(|o| o.row_count)),
        }
    }

    #[test]
    fn test_thin_ad_copy_exports_with_advisories() {
        let input = campaigns(json!([{
            "name": "C1",
            "adGroups": [{
                "name": "AG1",
                "keywords": [{ "text": "shoes", "matchType": "broad" }],
                "ads": [{
                    "finalUrl": "http://example.com",
                    "headlines": ["First", "Second"],
                    "descriptions": ["Only description"]
                }]
            }]
        }]));
        let output = generate(&input).unwrap();
        assert_eq!(output.row_count, 4);
        assert!(output
            .validation
            .warnings
            .iter()
            .any(|w| w.message.contains("headlines")));
        assert!(output
            .validation
            .warnings
            .iter()
            .any(|w| w.message.contains("descriptions")));

        let types: Vec<&str> = output
            .csv
            .split('\n')
            .skip(1)
            .map(|line| line.split(',').next().unwrap_or(""))
            .collect();
        assert_eq!(types, vec!["CAMPAIGN", "ADGROUP", "AD", "KEYWORD"]);
    }

    // Warnings ride along with the CSV instead of blocking it.
    #[test]
    fn test_warnings_do_not_block() {
        let input = campaigns(json!([{
            "name": "Brand",
            "adGroups": [{
                "name": "G",
                "ads": [{ "finalUrl": "https://example.com", "headlines": ["Just one"] }],
                "keywords": ["shoes", "shoes"]
            }]
        }]));
        let output = generate(&input).unwrap();
        assert!(output.validation.warning_count() >= 3);
        assert!(output.csv.contains("KEYWORD"));
    }

    // Empty input is a fatal batch-level error, not an empty file.
    #[test]
    fn test_empty_input_is_fatal() {
        match generate(&[]) {
            Err(ExportError::ValidationFailed { report }) => {
                assert_eq!(report.fatal_errors[0].row_index, None);
            }
            other => panic!("expected ValidationFailed, got {:?}", other.map(|o| o.row_count)),
        }
    }

    #[test]
    fn test_deterministic_end_to_end() {
        let input = well_formed();
        let a = generate(&input).unwrap();
        let b = generate(&input).unwrap();
        assert_eq!(a.csv, b.csv);
        assert_eq!(a.validation.warning_count(), b.validation.warning_count());
    }

    #[test]
    fn test_flatten_ordered_is_import_sorted() {
        let rows = flatten_ordered(&well_formed());
        let positions: Vec<&str> = rows.iter().map(|r| r.row_type().as_str()).collect();
        assert_eq!(
            positions,
            vec!["CAMPAIGN", "ADGROUP", "AD", "KEYWORD", "KEYWORD", "KEYWORD", "LOCATION"]
        );
    }
}
