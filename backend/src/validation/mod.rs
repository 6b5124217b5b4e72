//! Row validation for the export pipeline.
//!
//! [`validate`] inspects every row and produces a [`ValidationReport`]
//! splitting findings into fatal errors (the import tool would reject or
//! corrupt the file) and warnings (worth a look, still importable). The
//! function never panics and never returns `Err`; it always evaluates the
//! whole batch so the caller sees every problem at once, not just the
//! first.
//!
//! Severity is fixed per [`IssueKind`] and rule, not configurable per
//! call: two runs over the same rows always produce the same report.

use crate::models::MatchType;
use crate::normalize;
use crate::rows::{CanonicalHeader, Row, RowType};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

// =============================================================================
// Report types
// =============================================================================

/// Classification of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    MissingRequiredField,
    InvalidEnum,
    InvalidUrl,
    InvalidDate,
    InvalidNumeric,
    ReferentialIntegrityViolation,
    LengthExceeded,
    DuplicateRow,
    UnknownRowType,
}

/// One finding: what went wrong and in which terms.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
}

impl Issue {
    fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// All fatal findings for one row. `row_index` is `None` for batch-level
/// errors (for example an empty input).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FatalError {
    pub row_index: Option<usize>,
    pub errors: Vec<Issue>,
}

/// A single advisory finding.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    pub row_index: Option<usize>,
    pub kind: IssueKind,
    pub message: String,
}

/// The full outcome of a validation pass.
#[derive(Debug, Clone, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub fatal_errors: Vec<FatalError>,
    pub warnings: Vec<Warning>,
}

impl ValidationReport {
    pub fn is_fatal(&self) -> bool {
        !self.fatal_errors.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub(crate) fn push_warning(
        &mut self,
        row_index: Option<usize>,
        kind: IssueKind,
        message: impl Into<String>,
    ) {
        self.warnings.push(Warning {
            row_index,
            kind,
            message: message.into(),
        });
    }
}

// =============================================================================
// Entry point
// =============================================================================

/// Validate a flat row batch.
///
/// Runs the per-row rules first, then the cross-row passes (referential
/// integrity, duplicate keywords). Row indices in the report refer to the
/// input slice, so callers should validate before reordering.
pub fn validate(rows: &[Row]) -> ValidationReport {
    let mut report = ValidationReport::default();

    if rows.is_empty() {
        report.fatal_errors.push(FatalError {
            row_index: None,
            errors: vec![Issue::new(
                IssueKind::MissingRequiredField,
                "no rows provided: nothing to export",
            )],
        });
        return report;
    }

    for (index, row) in rows.iter().enumerate() {
        let mut errors = Vec::new();
        validate_row(index, row, &mut errors, &mut report);
        if !errors.is_empty() {
            report.fatal_errors.push(FatalError {
                row_index: Some(index),
                errors,
            });
        }
    }

    check_references(rows, &mut report);
    check_duplicate_keywords(rows, &mut report);

    report
}

// =============================================================================
// Per-row rules
// =============================================================================

fn validate_row(index: usize, row: &Row, errors: &mut Vec<Issue>, report: &mut ValidationReport) {
    match row.row_type() {
        RowType::Campaign => validate_campaign(index, row, errors, report),
        RowType::SharedBudget => {
            require(row, CanonicalHeader::Campaign, errors);
            require(row, CanonicalHeader::SharedBudgetName, errors);
        }
        RowType::AdGroup => {
            require(row, CanonicalHeader::Campaign, errors);
            require(row, CanonicalHeader::AdGroup, errors);
            check_numeric(index, row, CanonicalHeader::DefaultMaxCpc, report);
        }
        RowType::Ad => validate_ad(index, row, errors, report),
        RowType::Keyword => validate_keyword(index, row, errors, report),
        RowType::NegativeKeyword => validate_negative(row, errors),
        RowType::Location => validate_location(index, row, errors, report),
        RowType::Asset => validate_asset(index, row, errors, report),
        RowType::CampaignAsset => {
            require(row, CanonicalHeader::Campaign, errors);
            require(row, CanonicalHeader::AssetType, errors);
            require(row, CanonicalHeader::AssetName, errors);
        }
        RowType::AdAsset => {
            require(row, CanonicalHeader::Campaign, errors);
            require(row, CanonicalHeader::AdGroup, errors);
            require(row, CanonicalHeader::AssetType, errors);
            require(row, CanonicalHeader::AssetName, errors);
        }
        RowType::AdExtension | RowType::Label => {
            require(row, CanonicalHeader::Campaign, errors);
        }
        RowType::Unknown(s) => {
            report.push_warning(
                Some(index),
                IssueKind::UnknownRowType,
                format!("unknown row type \"{}\": the import tool may skip this row", s),
            );
        }
    }
}

fn validate_campaign(
    index: usize,
    row: &Row,
    errors: &mut Vec<Issue>,
    report: &mut ValidationReport,
) {
    require(row, CanonicalHeader::Campaign, errors);
    // Malformed budgets and dates are advisory: the row imports without
    // them and the import tool prompts for the field.
    check_numeric(index, row, CanonicalHeader::Budget, report);
    check_date(index, row, CanonicalHeader::StartDate, report);
    check_date(index, row, CanonicalHeader::EndDate, report);
    if let Some(status) = row.get_trimmed(CanonicalHeader::CampaignStatus) {
        if !matches!(status, "Enabled" | "Paused" | "Removed") {
            report.push_warning(
                Some(index),
                IssueKind::InvalidEnum,
                format!(
                    "Campaign Status must be Enabled, Paused or Removed, got \"{}\"",
                    status
                ),
            );
        }
    }
}

fn validate_asset(index: usize, row: &Row, errors: &mut Vec<Issue>, report: &mut ValidationReport) {
    require(row, CanonicalHeader::AssetType, errors);
    require(row, CanonicalHeader::AssetName, errors);

    let asset_type = row.get_trimmed(CanonicalHeader::AssetType).unwrap_or("");
    match row.get_trimmed(CanonicalHeader::AssetUrl) {
        // Image assets are nothing without their file reference.
        None if asset_type.eq_ignore_ascii_case("image") => errors.push(Issue::new(
            IssueKind::MissingRequiredField,
            "Asset URL is required on IMAGE assets",
        )),
        Some(url) if !normalize::is_http_url(url) => report.push_warning(
            Some(index),
            IssueKind::InvalidUrl,
            format!("Asset URL does not look like an http(s) URL: \"{}\"", url),
        ),
        _ => {}
    }
}

fn validate_ad(index: usize, row: &Row, errors: &mut Vec<Issue>, report: &mut ValidationReport) {
    require(row, CanonicalHeader::Campaign, errors);
    require(row, CanonicalHeader::AdGroup, errors);

    match row.get_trimmed(CanonicalHeader::FinalUrl) {
        None => errors.push(Issue::new(
            IssueKind::MissingRequiredField,
            "Final URL is required on AD rows",
        )),
        // Present but malformed stays advisory: the import tool accepts
        // the row and flags the URL itself.
        Some(url) if !normalize::is_http_url(url) => report.push_warning(
            Some(index),
            IssueKind::InvalidUrl,
            format!("Final URL does not look like an http(s) URL: \"{}\"", url),
        ),
        Some(_) => {}
    }

    // Copy minimums only apply to responsive search ads; call-only and
    // other formats carry no headline slots. An absent Ad Type means
    // responsive, matching the flattener's default.
    let responsive = row
        .get_trimmed(CanonicalHeader::AdType)
        .map(|t| {
            let upper = t.to_uppercase();
            upper.contains("RESPONSIVE") && upper.contains("SEARCH")
        })
        .unwrap_or(true);
    if responsive {
        let headlines = row.headline_count();
        if headlines < 3 {
            report.push_warning(
                Some(index),
                IssueKind::MissingRequiredField,
                format!(
                    "responsive search ads should carry at least 3 headlines, found {}",
                    headlines
                ),
            );
        }
        let descriptions = row.description_count();
        if descriptions < 2 {
            report.push_warning(
                Some(index),
                IssueKind::MissingRequiredField,
                format!(
                    "responsive search ads should carry at least 2 descriptions, found {}",
                    descriptions
                ),
            );
        }
    }

    check_copy_lengths(index, row, report);
}

/// Ad-copy slot limits enforced by the platform: 30 chars per headline,
/// 90 per description, 15 per path (and no spaces in paths).
fn check_copy_lengths(index: usize, row: &Row, report: &mut ValidationReport) {
    for n in 1u8..=15 {
        if let Some(text) = row.get_trimmed(CanonicalHeader::Headline(n)) {
            if text.chars().count() > 30 {
                report.push_warning(
                    Some(index),
                    IssueKind::LengthExceeded,
                    format!("Headline {} exceeds 30 characters ({})", n, text.chars().count()),
                );
            }
        }
    }
    for n in 1u8..=4 {
        if let Some(text) = row.get_trimmed(CanonicalHeader::Description(n)) {
            if text.chars().count() > 90 {
                report.push_warning(
                    Some(index),
                    IssueKind::LengthExceeded,
                    format!(
                        "Description {} exceeds 90 characters ({})",
                        n,
                        text.chars().count()
                    ),
                );
            }
        }
    }
    for n in 1u8..=2 {
        if let Some(text) = row.get_trimmed(CanonicalHeader::Path(n)) {
            if text.chars().count() > 15 {
                report.push_warning(
                    Some(index),
                    IssueKind::LengthExceeded,
                    format!("Path {} exceeds 15 characters ({})", n, text.chars().count()),
                );
            }
            if text.contains(' ') {
                report.push_warning(
                    Some(index),
                    IssueKind::LengthExceeded,
                    format!("Path {} contains spaces; display paths must not", n),
                );
            }
        }
    }
}

fn validate_keyword(
    index: usize,
    row: &Row,
    errors: &mut Vec<Issue>,
    report: &mut ValidationReport,
) {
    require(row, CanonicalHeader::Campaign, errors);
    require(row, CanonicalHeader::AdGroup, errors);
    require(row, CanonicalHeader::Keyword, errors);
    check_numeric(index, row, CanonicalHeader::CpcBid, report);

    // Advisory either way: the import tool falls back to Broad when the
    // match type is missing or unrecognized.
    match row.get_trimmed(CanonicalHeader::MatchType) {
        Some(mt) if MatchType::parse(mt).is_none() => report.push_warning(
            Some(index),
            IssueKind::InvalidEnum,
            format!(
                "Match Type \"{}\" is not Broad, Phrase or Exact; the import tool defaults to Broad",
                mt
            ),
        ),
        None => report.push_warning(
            Some(index),
            IssueKind::MissingRequiredField,
            "Match Type missing on KEYWORD row; the import tool defaults to Broad",
        ),
        Some(_) => {}
    }
}

fn validate_negative(row: &Row, errors: &mut Vec<Issue>) {
    require(row, CanonicalHeader::Campaign, errors);
    require(row, CanonicalHeader::Keyword, errors);
    // No Broad fallback here: anything other than an explicit Phrase or
    // Exact is fatal, a missing value included.
    match row.get_trimmed(CanonicalHeader::MatchType) {
        None => errors.push(Issue::new(
            IssueKind::MissingRequiredField,
            "Match Type is required on NEGATIVE_KEYWORD rows; use Phrase or Exact",
        )),
        Some(mt) => match MatchType::parse(mt) {
            Some(parsed) if !parsed.allowed_for_negative() => errors.push(Issue::new(
                IssueKind::InvalidEnum,
                "negative keywords cannot use Broad match; use Phrase or Exact",
            )),
            None => errors.push(Issue::new(
                IssueKind::InvalidEnum,
                format!("Match Type must be Phrase or Exact, got \"{}\"", mt),
            )),
            Some(_) => {}
        },
    }
}

fn validate_location(
    index: usize,
    row: &Row,
    errors: &mut Vec<Issue>,
    report: &mut ValidationReport,
) {
    require(row, CanonicalHeader::Campaign, errors);
    require(row, CanonicalHeader::LocationType, errors);
    require(row, CanonicalHeader::LocationValue, errors);

    let location_type = row.get_trimmed(CanonicalHeader::LocationType).unwrap_or("");
    let value = row.get_trimmed(CanonicalHeader::LocationValue).unwrap_or("");

    match location_type {
        "" => {}
        "COUNTRY" => {
            if !normalize::ISO2_COUNTRIES.contains(value.to_uppercase().as_str()) {
                report.push_warning(
                    Some(index),
                    IssueKind::InvalidEnum,
                    format!(
                        "country code \"{}\" is not in the known ISO-3166 alpha-2 set; \
                         the import tool may need a location ID instead",
                        value
                    ),
                );
            }
        }
        "ZIP" => {
            if !value.is_empty() && normalize::zip_has_unusual_chars(value) {
                report.push_warning(
                    Some(index),
                    IssueKind::InvalidEnum,
                    format!("ZIP value \"{}\" contains unusual characters", value),
                );
            }
        }
        "STATE" | "CITY" | "RADIUS" => {}
        other => report.push_warning(
            Some(index),
            IssueKind::InvalidEnum,
            format!(
                "Location Type \"{}\" is not one of COUNTRY, STATE, CITY, ZIP, RADIUS",
                other
            ),
        ),
    }
}

fn require(row: &Row, header: CanonicalHeader, errors: &mut Vec<Issue>) {
    if row.get_trimmed(header).is_none() {
        errors.push(Issue::new(
            IssueKind::MissingRequiredField,
            format!("{} is required on {} rows", header.name(), row.row_type()),
        ));
    }
}

fn check_numeric(index: usize, row: &Row, header: CanonicalHeader, report: &mut ValidationReport) {
    if let Some(value) = row.get_trimmed(header) {
        if !normalize::is_number_like(value) {
            report.push_warning(
                Some(index),
                IssueKind::InvalidNumeric,
                format!("{} must be numeric, got \"{}\"", header.name(), value),
            );
        }
    }
}

fn check_date(index: usize, row: &Row, header: CanonicalHeader, report: &mut ValidationReport) {
    if let Some(value) = row.get_trimmed(header) {
        if !normalize::is_date_ymd(value) {
            report.push_warning(
                Some(index),
                IssueKind::InvalidDate,
                format!("{} must be a YYYY-MM-DD date, got \"{}\"", header.name(), value),
            );
        }
    }
}

// =============================================================================
// Cross-row passes
// =============================================================================

/// Referential integrity across the batch.
///
/// An ad group naming a campaign that has no CAMPAIGN row is fatal (the
/// import tool cannot attach it). Dangling references from keyword, ad
/// and negative-keyword rows are advisory only, because the import tool
/// can auto-create a missing ad group or attach to one that already
/// exists in the target account.
fn check_references(rows: &[Row], report: &mut ValidationReport) {
    let campaigns: HashSet<&str> = rows
        .iter()
        .filter(|r| *r.row_type() == RowType::Campaign)
        .filter_map(|r| r.get_trimmed(CanonicalHeader::Campaign))
        .collect();
    let groups: HashSet<(&str, &str)> = rows
        .iter()
        .filter(|r| *r.row_type() == RowType::AdGroup)
        .filter_map(|r| {
            Some((
                r.get_trimmed(CanonicalHeader::Campaign)?,
                r.get_trimmed(CanonicalHeader::AdGroup)?,
            ))
        })
        .collect();

    for (index, row) in rows.iter().enumerate() {
        let campaign = row.get_trimmed(CanonicalHeader::Campaign);
        match row.row_type() {
            RowType::AdGroup => {
                if let Some(c) = campaign {
                    if !campaigns.contains(c) {
                        report.fatal_errors.push(FatalError {
                            row_index: Some(index),
                            errors: vec![Issue::new(
                                IssueKind::ReferentialIntegrityViolation,
                                format!("ad group references missing campaign \"{}\"", c),
                            )],
                        });
                    }
                }
            }
            RowType::Keyword | RowType::Ad | RowType::NegativeKeyword | RowType::AdAsset => {
                if let Some(c) = campaign {
                    if !campaigns.contains(c) {
                        report.push_warning(
                            Some(index),
                            IssueKind::ReferentialIntegrityViolation,
                            format!(
                                "{} references campaign \"{}\" that has no CAMPAIGN row in \
                                 this batch",
                                row.row_type(),
                                c
                            ),
                        );
                    } else if let Some(g) = row.get_trimmed(CanonicalHeader::AdGroup) {
                        if !groups.contains(&(c, g)) {
                            report.push_warning(
                                Some(index),
                                IssueKind::ReferentialIntegrityViolation,
                                format!(
                                    "{} references ad group \"{}\" that has no ADGROUP row in \
                                     campaign \"{}\"; it must already exist in the account",
                                    row.row_type(),
                                    g,
                                    c
                                ),
                            );
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// Duplicate keyword detection, keyed on the (campaign, ad group,
/// keyword text, match type) tuple after trimming and case folding.
/// Later occurrences warn and point back at the first.
fn check_duplicate_keywords(rows: &[Row], report: &mut ValidationReport) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let part = |row: &Row, header| {
        row.get_trimmed(header).unwrap_or("").to_lowercase()
    };
    for (index, row) in rows.iter().enumerate() {
        if *row.row_type() != RowType::Keyword {
            continue;
        }
        let key = format!(
            "{}|{}|{}|{}",
            part(row, CanonicalHeader::Campaign),
            part(row, CanonicalHeader::AdGroup),
            part(row, CanonicalHeader::Keyword),
            part(row, CanonicalHeader::MatchType),
        );
        match seen.get(&key) {
            Some(&first) => {
                report.push_warning(
                    Some(index),
                    IssueKind::DuplicateRow,
                    format!("duplicate keyword, first seen at row {}", first),
                );
            }
            None => {
                seen.insert(key, index);
            }
        }
    }
}
