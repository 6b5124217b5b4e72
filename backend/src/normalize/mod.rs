//! Normalization of legacy spellings into the canonical export vocabulary.
//!
//! The wizard layer (and externally authored files fed to the ingest
//! adapter) use many spellings for the same thing: `ENABLED`/`Enabled`,
//! `rsa`/`RESPONSIVE_SEARCH_AD`, plural headers, keyword shorthand. All of
//! it funnels through here so the rest of the pipeline only ever sees one
//! vocabulary. Every function is total and deterministic.
//!
//! Header-name normalization itself lives on
//! [`CanonicalHeader::parse`](crate::rows::CanonicalHeader::parse).

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Country codes the import tool resolves without a location ID lookup.
pub static ISO2_COUNTRIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "US", "CA", "GB", "AU", "IN", "DE", "FR", "ES", "IT", "NL", "BR", "MX", "JP", "CN",
    ]
    .into_iter()
    .collect()
});

static HTTP_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://.+").unwrap());
static ZIP_LEADING_ZERO: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0\d{4}$").unwrap());
static ZIP_SAFE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9 -]+$").unwrap());

/// Entity status, title-cased the way the import tool expects.
/// Anything unrecognized passes through untouched.
pub fn normalize_status(status: Option<&str>) -> String {
    match status.map(str::trim) {
        None | Some("") => "Enabled".to_string(),
        Some(s) => match s.to_uppercase().as_str() {
            "ENABLED" | "ACTIVE" => "Enabled".to_string(),
            "PAUSED" => "Paused".to_string(),
            "REMOVED" | "DELETED" => "Removed".to_string(),
            _ => s.to_string(),
        },
    }
}

/// Campaign type; the wizard only builds search campaigns, so that is the
/// default.
pub fn normalize_campaign_type(campaign_type: Option<&str>) -> String {
    match campaign_type.map(str::trim) {
        None | Some("") => "Search".to_string(),
        Some(s) => match s.to_uppercase().as_str() {
            "SEARCH" => "Search".to_string(),
            "DISPLAY" => "Display".to_string(),
            _ => s.to_string(),
        },
    }
}

/// Ad type spellings collapse onto the Editor's display names. DKI ads are
/// responsive search ads with keyword-insertion markup in the copy.
pub fn normalize_ad_type(ad_type: Option<&str>) -> String {
    match ad_type.map(str::trim) {
        None | Some("") => "Responsive search ad".to_string(),
        Some(s) => match s.to_uppercase().replace(' ', "_").as_str() {
            "RSA" | "DKI" | "RESPONSIVE_SEARCH_AD" => "Responsive search ad".to_string(),
            "CALLONLY" | "CALL_ONLY_AD" => "Call only ad".to_string(),
            _ => s.to_string(),
        },
    }
}

/// Strip match-type shorthand from keyword text: exact brackets, phrase
/// quotes and a negative `-` prefix.
pub fn clean_keyword_text(keyword: &str) -> String {
    let mut text = keyword.trim();
    text = text.strip_prefix('-').unwrap_or(text).trim_start();
    if text.len() >= 2 {
        if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            text = inner;
        } else if let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
            text = inner;
        }
    }
    text.trim().to_string()
}

/// Protect postal codes from spreadsheet number coercion.
///
/// A five-digit code with a leading zero gets the apostrophe marker so
/// the zero is not dropped on import; any other non-empty value is
/// wrapped in literal quotes so the cell survives as text.
pub fn fix_zip(zip: &str) -> String {
    let z = zip.trim();
    if z.is_empty() {
        return String::new();
    }
    if ZIP_LEADING_ZERO.is_match(z) {
        return format!("'{}", z);
    }
    format!("\"{}\"", z)
}

/// Whether a ZIP value (marker characters ignored) contains anything
/// outside letters, digits, spaces and hyphens.
pub fn zip_has_unusual_chars(value: &str) -> bool {
    let raw: String = value.chars().filter(|c| *c != '\'' && *c != '"').collect();
    !ZIP_SAFE.is_match(&raw)
}

/// `YYYY-MM-DD`, and a real calendar date.
pub fn is_date_ymd(s: &str) -> bool {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok()
}

/// Numeric with thousands separators tolerated ("10,000").
pub fn is_number_like(s: &str) -> bool {
    let cleaned = s.trim().replace(',', "");
    !cleaned.is_empty() && cleaned.parse::<f64>().is_ok()
}

/// http/https URL shape.
pub fn is_http_url(s: &str) -> bool {
    HTTP_URL.is_match(s.trim())
}
