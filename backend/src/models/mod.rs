//! Domain models for the campaign export pipeline.
//!
//! This module contains the input object graph handed over by the wizard
//! layer, plus the enums the pipeline normalizes into:
//!
//! - [`Campaign`] - top-level campaign with ad groups, negatives, locations, assets
//! - [`AdGroup`] - nested keywords, ads and negatives
//! - [`MatchType`] - canonical keyword match types with shorthand parsing
//!
//! Field presence is optional almost everywhere; the validator, not the
//! deserializer, decides what is actually required.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Match Type
// =============================================================================

/// Canonical keyword match types.
///
/// Accepts the legacy spellings the wizard produced over time ("broad match",
/// upper/lower case) and the inline shorthand `[kw]` (exact) / `"kw"` (phrase).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchType {
    Broad,
    Phrase,
    Exact,
}

impl MatchType {
    /// Parse an explicit match-type string.
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.len() >= 2 {
            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                return Some(Self::Exact);
            }
            if trimmed.starts_with('"') && trimmed.ends_with('"') {
                return Some(Self::Phrase);
            }
        }
        match trimmed.to_lowercase().as_str() {
            "broad" | "broad match" => Some(Self::Broad),
            "phrase" | "phrase match" => Some(Self::Phrase),
            "exact" | "exact match" => Some(Self::Exact),
            _ => None,
        }
    }

    /// Derive the match type from keyword shorthand: `[kw]` is exact,
    /// `"kw"` is phrase, anything bare is broad.
    pub fn of_keyword(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']') {
            Self::Exact
        } else if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
            Self::Phrase
        } else {
            Self::Broad
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Broad => "Broad",
            Self::Phrase => "Phrase",
            Self::Exact => "Exact",
        }
    }

    /// Negative keywords may only be phrase or exact; negative broad match
    /// does not exist in the import format.
    pub fn allowed_for_negative(&self) -> bool {
        matches!(self, Self::Phrase | Self::Exact)
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Scalar
// =============================================================================

/// A budget/bid value the wizard may send as either a JSON number or a
/// string ("10,000"). Kept verbatim and stringified at flatten time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// Campaign graph
// =============================================================================

/// A campaign as supplied by the wizard layer.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(alias = "campaign", default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub campaign_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_budget_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(alias = "adgroups", default)]
    pub ad_groups: Vec<AdGroup>,
    /// Campaign-level negative keywords (apply to every ad group).
    #[serde(alias = "negativeKeywords", default)]
    pub negatives: Vec<NegativeKeyword>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// An ad group nested under a campaign.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdGroup {
    #[serde(alias = "adGroup", default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(alias = "defaultMaxCpc", skip_serializing_if = "Option::is_none", default)]
    pub default_bid: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    #[serde(default)]
    pub keywords: Vec<KeywordSpec>,
    #[serde(default)]
    pub ads: Vec<Ad>,
    #[serde(alias = "negativeKeywords", default)]
    pub negatives: Vec<NegativeKeyword>,
}

/// A keyword, either bare text (match type derived from shorthand) or a
/// detailed record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordSpec {
    Text(String),
    Detail(KeywordDetail),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeywordDetail {
    #[serde(alias = "phrase", alias = "keyword", default)]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cpc: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

impl KeywordSpec {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Detail(d) => &d.text,
        }
    }

    /// Explicit match type wins; otherwise derive from the text shorthand.
    pub fn match_type(&self) -> MatchType {
        match self {
            Self::Text(s) => MatchType::of_keyword(s),
            Self::Detail(d) => d
                .match_type
                .as_deref()
                .and_then(MatchType::parse)
                .unwrap_or_else(|| MatchType::of_keyword(&d.text)),
        }
    }

    pub fn max_cpc(&self) -> Option<&Scalar> {
        match self {
            Self::Text(_) => None,
            Self::Detail(d) => d.max_cpc.as_ref(),
        }
    }

    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Text(_) => None,
            Self::Detail(d) => d.operation.as_deref(),
        }
    }
}

/// A negative keyword, bare or detailed. No shorthand derivation here:
/// negatives default to phrase match, the safer of the two legal types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NegativeKeyword {
    Text(String),
    Detail(NegativeKeywordDetail),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NegativeKeywordDetail {
    #[serde(alias = "keyword", default)]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_type: Option<String>,
}

impl NegativeKeyword {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(s) => s,
            Self::Detail(d) => &d.text,
        }
    }

    pub fn match_type(&self) -> MatchType {
        match self {
            Self::Text(_) => MatchType::Phrase,
            Self::Detail(d) => d
                .match_type
                .as_deref()
                .and_then(MatchType::parse)
                .unwrap_or(MatchType::Phrase),
        }
    }
}

/// An ad. Headlines and descriptions are positional; index 0 becomes
/// `Headline 1` in the flat model.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ad_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub final_urls: Vec<String>,
    #[serde(default)]
    pub headlines: Vec<String>,
    #[serde(default)]
    pub descriptions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Assets linked to this ad (emitted as AD_ASSET rows).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<Asset>,
}

impl Ad {
    /// First usable final URL, whichever spelling the wizard used.
    pub fn final_url(&self) -> Option<&str> {
        self.final_urls
            .first()
            .map(String::as_str)
            .or(self.final_url.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

/// A campaign location target.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type", default)]
    pub location_type: String,
    #[serde(default)]
    pub value: Option<Scalar>,
}

/// A campaign- or ad-level asset (image, sitelink, callout, ...).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(rename = "type", default)]
    pub asset_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
