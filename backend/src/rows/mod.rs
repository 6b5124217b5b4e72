//! Flat row model for the export pipeline.
//!
//! A [`Row`] is one line of the eventual CSV, modeled before serialization
//! as a typed field map. Every row carries an explicit [`RowType`] tag plus
//! a split field map:
//!
//! - `canonical`: fields whose header is part of the fixed
//!   [`CanonicalHeader`] catalogue required by Google Ads Editor
//! - `extra`: any additional columns beyond the catalogue
//!
//! Rows are produced by the flattener (or the ingest adapter), read by the
//! validator and permuted by the orderer; nothing mutates a row after it
//! has been built.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Headers the import tool always expects, in their required order.
///
/// This list is part of the compatibility contract with Google Ads Editor
/// and must stay byte-identical.
pub const REQUIRED_HEADERS: [&str; 13] = [
    "Row Type",
    "Campaign",
    "Ad Group",
    "Ad Type",
    "Keyword",
    "Match Type",
    "Final URL",
    "Asset Type",
    "Asset Name",
    "Asset URL",
    "Location Type",
    "Location Value",
    "Operation",
];

// =============================================================================
// Row Type
// =============================================================================

/// The entity kind a row represents.
///
/// Unknown type strings are preserved verbatim; the validator flags them
/// as low-confidence instead of rejecting them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowType {
    Campaign,
    SharedBudget,
    AdGroup,
    Ad,
    Keyword,
    NegativeKeyword,
    Location,
    Asset,
    CampaignAsset,
    AdAsset,
    AdExtension,
    Label,
    Unknown(String),
}

impl RowType {
    /// Parse a row-type string. Total: unrecognized input becomes
    /// [`RowType::Unknown`] with the original spelling preserved.
    pub fn parse(s: &str) -> Self {
        let canon = s.trim().to_uppercase().replace([' ', '-'], "_");
        match canon.as_str() {
            "CAMPAIGN" => Self::Campaign,
            "SHARED_BUDGET" | "SHAREDBUDGET" => Self::SharedBudget,
            "ADGROUP" | "AD_GROUP" => Self::AdGroup,
            "AD" => Self::Ad,
            "KEYWORD" => Self::Keyword,
            "NEGATIVE_KEYWORD" | "NEGATIVEKEYWORD" => Self::NegativeKeyword,
            "LOCATION" | "LOCATION_TARGET" | "LOCATION_TARGETING" => Self::Location,
            "ASSET" => Self::Asset,
            "CAMPAIGN_ASSET" => Self::CampaignAsset,
            "AD_ASSET" => Self::AdAsset,
            "AD_EXTENSION" => Self::AdExtension,
            "LABEL" => Self::Label,
            _ => Self::Unknown(s.trim().to_string()),
        }
    }

    /// Canonical spelling used in the `Row Type` column.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Campaign => "CAMPAIGN",
            Self::SharedBudget => "SHARED_BUDGET",
            Self::AdGroup => "ADGROUP",
            Self::Ad => "AD",
            Self::Keyword => "KEYWORD",
            Self::NegativeKeyword => "NEGATIVE_KEYWORD",
            Self::Location => "LOCATION",
            Self::Asset => "ASSET",
            Self::CampaignAsset => "CAMPAIGN_ASSET",
            Self::AdAsset => "AD_ASSET",
            Self::AdExtension => "AD_EXTENSION",
            Self::Label => "LABEL",
            Self::Unknown(s) => s,
        }
    }

    /// Whether this is one of the closed set of types the import tool knows.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Canonical Headers
// =============================================================================

/// One fixed column name of the output schema.
///
/// The numbered variants cover `Headline 1..15`, `Description 1..4` and
/// `Path 1..2`. [`CanonicalHeader::parse`] maps legacy spellings
/// (plural/casing variants) onto exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalHeader {
    RowType,
    Campaign,
    CampaignStatus,
    CampaignType,
    Budget,
    SharedBudgetName,
    StartDate,
    EndDate,
    AdGroup,
    AdGroupStatus,
    DefaultMaxCpc,
    AdType,
    AdId,
    FinalUrl,
    Headline(u8),
    Description(u8),
    Path(u8),
    Keyword,
    MatchType,
    CpcBid,
    AssetType,
    AssetName,
    AssetUrl,
    LocationType,
    LocationValue,
    PhoneNumber,
    Operation,
}

static NUMBERED_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(headline|description|path)\s*(\d{1,2})$").unwrap());

impl CanonicalHeader {
    /// Map an arbitrary header spelling onto the catalogue.
    ///
    /// Deterministic and total over the alias vocabulary; headers outside
    /// the catalogue return `None` and stay in the row's `extra` map.
    pub fn parse(header: &str) -> Option<Self> {
        let lower = header.trim().to_lowercase();

        if let Some(caps) = NUMBERED_HEADER.captures(&lower) {
            let n: u8 = caps[2].parse().ok()?;
            return match &caps[1] {
                "headline" if (1..=15).contains(&n) => Some(Self::Headline(n)),
                "description" if (1..=4).contains(&n) => Some(Self::Description(n)),
                "path" if (1..=2).contains(&n) => Some(Self::Path(n)),
                _ => None,
            };
        }

        match lower.as_str() {
            "row type" => Some(Self::RowType),
            "campaign" | "campaigns" | "campaign name" => Some(Self::Campaign),
            "campaign status" => Some(Self::CampaignStatus),
            "campaign type" => Some(Self::CampaignType),
            "budget" | "daily budget" | "campaign budget" => Some(Self::Budget),
            "shared budget name" => Some(Self::SharedBudgetName),
            "start date" => Some(Self::StartDate),
            "end date" => Some(Self::EndDate),
            "ad group" | "ad groups" | "adgroup" | "adgroups" => Some(Self::AdGroup),
            "ad group status" | "adgroup status" => Some(Self::AdGroupStatus),
            "default max cpc" => Some(Self::DefaultMaxCpc),
            "ad type" => Some(Self::AdType),
            "ad id" => Some(Self::AdId),
            "final url" | "final urls" => Some(Self::FinalUrl),
            "keyword" | "keywords" | "negative keyword" => Some(Self::Keyword),
            "match type" | "match types" => Some(Self::MatchType),
            "cpc bid" | "max cpc" | "keyword max cpc" => Some(Self::CpcBid),
            "asset type" => Some(Self::AssetType),
            "asset name" => Some(Self::AssetName),
            "asset url" => Some(Self::AssetUrl),
            "location type" => Some(Self::LocationType),
            "location value" => Some(Self::LocationValue),
            "phone number" => Some(Self::PhoneNumber),
            "operation" => Some(Self::Operation),
            _ => None,
        }
    }

    /// Canonical column name.
    pub fn name(&self) -> String {
        match self {
            Self::Headline(n) => format!("Headline {}", n),
            Self::Description(n) => format!("Description {}", n),
            Self::Path(n) => format!("Path {}", n),
            other => other.static_name().to_string(),
        }
    }

    fn static_name(&self) -> &'static str {
        match self {
            Self::RowType => "Row Type",
            Self::Campaign => "Campaign",
            Self::CampaignStatus => "Campaign Status",
            Self::CampaignType => "Campaign Type",
            Self::Budget => "Budget",
            Self::SharedBudgetName => "Shared Budget Name",
            Self::StartDate => "Start Date",
            Self::EndDate => "End Date",
            Self::AdGroup => "Ad Group",
            Self::AdGroupStatus => "Ad Group Status",
            Self::DefaultMaxCpc => "Default Max CPC",
            Self::AdType => "Ad Type",
            Self::AdId => "Ad ID",
            Self::FinalUrl => "Final URL",
            Self::Keyword => "Keyword",
            Self::MatchType => "Match Type",
            Self::CpcBid => "CPC Bid",
            Self::AssetType => "Asset Type",
            Self::AssetName => "Asset Name",
            Self::AssetUrl => "Asset URL",
            Self::LocationType => "Location Type",
            Self::LocationValue => "Location Value",
            Self::PhoneNumber => "Phone Number",
            Self::Operation => "Operation",
            Self::Headline(_) | Self::Description(_) | Self::Path(_) => unreachable!(),
        }
    }
}

impl fmt::Display for CanonicalHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// =============================================================================
// Row
// =============================================================================

/// One line of the eventual CSV: a row type plus a sparse field map.
///
/// Field maps are `BTreeMap`s so iteration order (and therefore any output
/// derived from it) is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    row_type: RowType,
    canonical: BTreeMap<CanonicalHeader, String>,
    extra: BTreeMap<String, String>,
}

impl Row {
    pub fn new(row_type: RowType) -> Self {
        Self {
            row_type,
            canonical: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Set a canonical field. Empty values are skipped so the map stays
    /// sparse; the serializer fills blanks at output time.
    pub fn with(mut self, header: CanonicalHeader, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.canonical.insert(header, value);
        }
        self
    }

    pub fn with_opt(self, header: CanonicalHeader, value: Option<String>) -> Self {
        match value {
            Some(v) => self.with(header, v),
            None => self,
        }
    }

    /// Set a column outside the canonical catalogue.
    pub fn with_extra(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.extra.insert(name.into(), value);
        }
        self
    }

    pub fn row_type(&self) -> &RowType {
        &self.row_type
    }

    pub fn get(&self, header: CanonicalHeader) -> Option<&str> {
        self.canonical.get(&header).map(String::as_str)
    }

    /// Field value after trimming, or `None` when absent or blank.
    /// Required-field checks treat whitespace-only values as missing.
    pub fn get_trimmed(&self, header: CanonicalHeader) -> Option<&str> {
        self.get(header).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Look a value up by output column name, covering the `Row Type`
    /// pseudo-column, canonical fields and extras alike.
    pub fn value_for(&self, column: &str) -> Option<&str> {
        if column == "Row Type" {
            return Some(self.row_type.as_str());
        }
        match CanonicalHeader::parse(column) {
            Some(h) => self.get(h),
            None => self.extra.get(column).map(String::as_str),
        }
    }

    /// All column names this row populates, canonical first.
    pub fn columns(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once("Row Type".to_string())
            .chain(self.canonical.keys().map(|h| h.name()))
            .chain(self.extra.keys().cloned())
    }

    /// Count populated `Headline N` fields.
    pub fn headline_count(&self) -> usize {
        (1u8..=15)
            .filter(|&n| self.get_trimmed(CanonicalHeader::Headline(n)).is_some())
            .count()
    }

    /// Count populated `Description N` fields.
    pub fn description_count(&self) -> usize {
        (1u8..=4)
            .filter(|&n| self.get_trimmed(CanonicalHeader::Description(n)).is_some())
            .count()
    }
}

/// Rows serialize as flat JSON objects keyed by column name, matching the
/// shape the wizard layer exchanges with the API.
impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map =
            serializer.serialize_map(Some(1 + self.canonical.len() + self.extra.len()))?;
        map.serialize_entry("Row Type", self.row_type.as_str())?;
        for (header, value) in &self.canonical {
            map.serialize_entry(&header.name(), value)?;
        }
        for (name, value) in &self.extra {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_type_parse_canonical() {
        assert_eq!(RowType::parse("CAMPAIGN"), RowType::Campaign);
        assert_eq!(RowType::parse("adgroup"), RowType::AdGroup);
        assert_eq!(RowType::parse("Ad Group"), RowType::AdGroup);
        assert_eq!(RowType::parse("negative keyword"), RowType::NegativeKeyword);
        assert_eq!(RowType::parse("SHARED_BUDGET"), RowType::SharedBudget);
    }

    #[test]
    fn test_row_type_unknown_preserved_verbatim() {
        let rt = RowType::parse("Experiment");
        assert_eq!(rt, RowType::Unknown("Experiment".to_string()));
        assert_eq!(rt.as_str(), "Experiment");
        assert!(!rt.is_known());
    }

    #[test]
    fn test_header_aliases() {
        assert_eq!(CanonicalHeader::parse("Ad Groups"), Some(CanonicalHeader::AdGroup));
        assert_eq!(CanonicalHeader::parse("keywords"), Some(CanonicalHeader::Keyword));
        assert_eq!(CanonicalHeader::parse("MATCH TYPE"), Some(CanonicalHeader::MatchType));
        assert_eq!(CanonicalHeader::parse("Daily budget"), Some(CanonicalHeader::Budget));
        assert_eq!(CanonicalHeader::parse("Headline 7"), Some(CanonicalHeader::Headline(7)));
        assert_eq!(CanonicalHeader::parse("headline16"), None);
        assert_eq!(CanonicalHeader::parse("Path 2"), Some(CanonicalHeader::Path(2)));
        assert_eq!(CanonicalHeader::parse("Quality Score"), None);
    }

    #[test]
    fn test_header_name_roundtrip() {
        for header in [
            CanonicalHeader::Campaign,
            CanonicalHeader::AdGroup,
            CanonicalHeader::Headline(12),
            CanonicalHeader::Description(3),
            CanonicalHeader::LocationValue,
        ] {
            assert_eq!(CanonicalHeader::parse(&header.name()), Some(header));
        }
    }

    #[test]
    fn test_required_headers_all_canonical() {
        for name in REQUIRED_HEADERS {
            if name == "Row Type" {
                continue;
            }
            assert!(CanonicalHeader::parse(name).is_some(), "not canonical: {}", name);
        }
    }

    #[test]
    fn test_row_sparse_fields() {
        let row = Row::new(RowType::Keyword)
            .with(CanonicalHeader::Campaign, "C1")
            .with(CanonicalHeader::Keyword, "shoes")
            .with(CanonicalHeader::AdGroup, "");

        assert_eq!(row.get(CanonicalHeader::Campaign), Some("C1"));
        assert_eq!(row.get(CanonicalHeader::AdGroup), None);
        assert_eq!(row.value_for("Row Type"), Some("KEYWORD"));
        assert_eq!(row.value_for("Keyword"), Some("shoes"));
    }

    #[test]
    fn test_row_serializes_flat() {
        let row = Row::new(RowType::Campaign)
            .with(CanonicalHeader::Campaign, "Brand")
            .with_extra("Tracking Template", "{lpurl}");
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["Row Type"], "CAMPAIGN");
        assert_eq!(json["Campaign"], "Brand");
        assert_eq!(json["Tracking Template"], "{lpurl}");
    }

    #[test]
    fn test_headline_count() {
        let row = Row::new(RowType::Ad)
            .with(CanonicalHeader::Headline(1), "One")
            .with(CanonicalHeader::Headline(2), "Two")
            .with(CanonicalHeader::Headline(5), "   ")
            .with(CanonicalHeader::Description(1), "Only one");
        assert_eq!(row.headline_count(), 2);
        assert_eq!(row.description_count(), 1);
    }
}
