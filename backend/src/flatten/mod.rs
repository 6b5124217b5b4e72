//! Flattening of the campaign object graph into export rows.
//!
//! [`flatten`] walks each campaign in input order and emits its rows in a
//! fixed shape: the campaign row first, then its shared budget, then each
//! ad group with its ads (and their linked assets), keywords and negatives,
//! then campaign-level negatives, locations and assets. The function is
//! pure; validation and reordering happen downstream.

use crate::models::{Ad, AdGroup, Campaign};
use crate::normalize;
use crate::rows::{CanonicalHeader, Row, RowType};

/// Turn a campaign graph into a flat row sequence.
///
/// Empty collections are legal everywhere: a campaign with no ad groups
/// still yields its campaign row, an ad group with no keywords still
/// yields its ad group row.
pub fn flatten(campaigns: &[Campaign]) -> Vec<Row> {
    let mut rows = Vec::new();
    for campaign in campaigns {
        flatten_campaign(campaign, &mut rows);
    }
    rows
}

fn flatten_campaign(campaign: &Campaign, rows: &mut Vec<Row>) {
    rows.push(
        Row::new(RowType::Campaign)
            .with(CanonicalHeader::Campaign, &campaign.name)
            .with(
                CanonicalHeader::CampaignStatus,
                normalize::normalize_status(campaign.status.as_deref()),
            )
            .with(
                CanonicalHeader::CampaignType,
                normalize::normalize_campaign_type(campaign.campaign_type.as_deref()),
            )
            .with_opt(CanonicalHeader::Budget, campaign.budget.as_ref().map(|b| b.to_string()))
            .with_opt(CanonicalHeader::StartDate, campaign.start_date.clone())
            .with_opt(CanonicalHeader::EndDate, campaign.end_date.clone())
            .with(
                CanonicalHeader::Operation,
                campaign.operation.as_deref().unwrap_or("NEW"),
            ),
    );

    if let Some(shared) = campaign
        .shared_budget_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        rows.push(
            Row::new(RowType::SharedBudget)
                .with(CanonicalHeader::Campaign, &campaign.name)
                .with(CanonicalHeader::SharedBudgetName, shared)
                .with_opt(
                    CanonicalHeader::Budget,
                    campaign.budget.as_ref().map(|b| b.to_string()),
                ),
        );
    }

    for group in &campaign.ad_groups {
        flatten_ad_group(&campaign.name, group, rows);
    }

    // Campaign-level negatives apply account-wide within the campaign, so
    // the Ad Group cell stays empty.
    for negative in &campaign.negatives {
        rows.push(
            Row::new(RowType::NegativeKeyword)
                .with(CanonicalHeader::Campaign, &campaign.name)
                .with(
                    CanonicalHeader::Keyword,
                    normalize::clean_keyword_text(negative.text()),
                )
                .with(CanonicalHeader::MatchType, negative.match_type().as_str()),
        );
    }

    for location in &campaign.locations {
        let location_type = location.location_type.trim().to_uppercase();
        let value = location
            .value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_default();
        let value = if location_type == "ZIP" {
            normalize::fix_zip(&value)
        } else {
            value.trim().to_string()
        };
        rows.push(
            Row::new(RowType::Location)
                .with(CanonicalHeader::Campaign, &campaign.name)
                .with(CanonicalHeader::LocationType, location_type)
                .with(CanonicalHeader::LocationValue, value),
        );
    }

    // Each campaign asset is two rows: the asset itself and the link that
    // attaches it to the campaign.
    for asset in &campaign.assets {
        let asset_type = asset.asset_type.trim().to_uppercase();
        rows.push(
            Row::new(RowType::Asset)
                .with(CanonicalHeader::AssetType, asset_type.clone())
                .with(CanonicalHeader::AssetName, asset.name.trim())
                .with_opt(CanonicalHeader::AssetUrl, asset.url.clone()),
        );
        rows.push(
            Row::new(RowType::CampaignAsset)
                .with(CanonicalHeader::Campaign, &campaign.name)
                .with(CanonicalHeader::AssetType, asset_type)
                .with(CanonicalHeader::AssetName, asset.name.trim()),
        );
    }
}

fn flatten_ad_group(campaign: &str, group: &AdGroup, rows: &mut Vec<Row>) {
    rows.push(
        Row::new(RowType::AdGroup)
            .with(CanonicalHeader::Campaign, campaign)
            .with(CanonicalHeader::AdGroup, &group.name)
            .with(
                CanonicalHeader::AdGroupStatus,
                normalize::normalize_status(group.status.as_deref()),
            )
            .with_opt(
                CanonicalHeader::DefaultMaxCpc,
                group.default_bid.as_ref().map(|b| b.to_string()),
            )
            .with_opt(CanonicalHeader::Operation, group.operation.clone()),
    );

    for ad in &group.ads {
        flatten_ad(campaign, &group.name, ad, rows);
    }

    for keyword in &group.keywords {
        rows.push(
            Row::new(RowType::Keyword)
                .with(CanonicalHeader::Campaign, campaign)
                .with(CanonicalHeader::AdGroup, &group.name)
                .with(
                    CanonicalHeader::Keyword,
                    normalize::clean_keyword_text(keyword.text()),
                )
                .with(CanonicalHeader::MatchType, keyword.match_type().as_str())
                .with_opt(
                    CanonicalHeader::CpcBid,
                    keyword.max_cpc().map(|b| b.to_string()),
                )
                .with_opt(
                    CanonicalHeader::Operation,
                    keyword.operation().map(str::to_string),
                ),
        );
    }

    for negative in &group.negatives {
        rows.push(
            Row::new(RowType::NegativeKeyword)
                .with(CanonicalHeader::Campaign, campaign)
                .with(CanonicalHeader::AdGroup, &group.name)
                .with(
                    CanonicalHeader::Keyword,
                    normalize::clean_keyword_text(negative.text()),
                )
                .with(CanonicalHeader::MatchType, negative.match_type().as_str()),
        );
    }
}

fn flatten_ad(campaign: &str, group: &str, ad: &Ad, rows: &mut Vec<Row>) {
    let mut row = Row::new(RowType::Ad)
        .with(CanonicalHeader::Campaign, campaign)
        .with(CanonicalHeader::AdGroup, group)
        .with(
            CanonicalHeader::AdType,
            normalize::normalize_ad_type(ad.ad_type.as_deref()),
        )
        .with_opt(CanonicalHeader::AdId, ad.id.clone())
        .with_opt(CanonicalHeader::FinalUrl, ad.final_url().map(str::to_string))
        .with_opt(CanonicalHeader::Path(1), ad.path1.clone())
        .with_opt(CanonicalHeader::Path(2), ad.path2.clone())
        .with_opt(CanonicalHeader::Operation, ad.operation.clone());

    // Positional copy: index 0 becomes Headline 1. Anything past the
    // import tool's slot count is dropped here rather than failing later.
    for (i, headline) in ad.headlines.iter().take(15).enumerate() {
        row = row.with(CanonicalHeader::Headline(i as u8 + 1), headline.trim());
    }
    for (i, description) in ad.descriptions.iter().take(4).enumerate() {
        row = row.with(CanonicalHeader::Description(i as u8 + 1), description.trim());
    }
    rows.push(row);

    for asset in &ad.assets {
        rows.push(
            Row::new(RowType::AdAsset)
                .with(CanonicalHeader::Campaign, campaign)
                .with(CanonicalHeader::AdGroup, group)
                .with(CanonicalHeader::AssetType, asset.asset_type.trim().to_uppercase())
                .with(CanonicalHeader::AssetName, asset.name.trim())
                .with_opt(CanonicalHeader::AssetUrl, asset.url.clone()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn campaign(value: serde_json::Value) -> Campaign {
        serde_json::from_value(value).unwrap()
    }

    fn types(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.row_type().as_str()).collect()
    }

    #[test]
    fn test_emission_order_full_campaign() {
        let c = campaign(json!({
            "name": "Brand",
            "sharedBudgetName": "Q3 Budget",
            "adGroups": [{
                "name": "Shoes",
                "ads": [{ "finalUrl": "https://example.com", "headlines": ["A", "B", "C"],
                          "descriptions": ["D1", "D2"],
                          "assets": [{ "type": "image", "name": "hero.png" }] }],
                "keywords": ["[running shoes]"],
                "negativeKeywords": ["free"]
            }],
            "negativeKeywords": ["cheap"],
            "locations": [{ "type": "zip", "value": "07030" }],
            "assets": [{ "type": "sitelink", "name": "Sale" }]
        }));

        let rows = flatten(&[c]);
        assert_eq!(
            types(&rows),
            vec![
                "CAMPAIGN",
                "SHARED_BUDGET",
                "ADGROUP",
                "AD",
                "AD_ASSET",
                "KEYWORD",
                "NEGATIVE_KEYWORD",
                "NEGATIVE_KEYWORD",
                "LOCATION",
                "ASSET",
                "CAMPAIGN_ASSET",
            ]
        );
    }

    #[test]
    fn test_campaign_row_defaults() {
        let rows = flatten(&[campaign(json!({ "name": "Solo" }))]);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.get(CanonicalHeader::Campaign), Some("Solo"));
        assert_eq!(row.get(CanonicalHeader::CampaignStatus), Some("Enabled"));
        assert_eq!(row.get(CanonicalHeader::CampaignType), Some("Search"));
        assert_eq!(row.get(CanonicalHeader::Operation), Some("NEW"));
    }

    #[test]
    fn test_keyword_shorthand_cleaned_and_typed() {
        let rows = flatten(&[campaign(json!({
            "name": "C",
            "adGroups": [{ "name": "G", "keywords": ["[exact kw]", "\"phrase kw\"", "broad kw"] }]
        }))]);

        let kws: Vec<_> = rows
            .iter()
            .filter(|r| *r.row_type() == RowType::Keyword)
            .collect();
        assert_eq!(kws[0].get(CanonicalHeader::Keyword), Some("exact kw"));
        assert_eq!(kws[0].get(CanonicalHeader::MatchType), Some("Exact"));
        assert_eq!(kws[1].get(CanonicalHeader::MatchType), Some("Phrase"));
        assert_eq!(kws[2].get(CanonicalHeader::MatchType), Some("Broad"));
    }

    #[test]
    fn test_campaign_negative_has_no_ad_group() {
        let rows = flatten(&[campaign(json!({
            "name": "C",
            "negativeKeywords": [{ "text": "free", "matchType": "exact" }]
        }))]);
        let neg = rows
            .iter()
            .find(|r| *r.row_type() == RowType::NegativeKeyword)
            .unwrap();
        assert_eq!(neg.get(CanonicalHeader::AdGroup), None);
        assert_eq!(neg.get(CanonicalHeader::MatchType), Some("Exact"));
    }

    #[test]
    fn test_zip_location_fixed_up() {
        let rows = flatten(&[campaign(json!({
            "name": "C",
            "locations": [
                { "type": "zip", "value": "07030" },
                { "type": "country", "value": "US" }
            ]
        }))]);
        let locs: Vec<_> = rows
            .iter()
            .filter(|r| *r.row_type() == RowType::Location)
            .collect();
        assert_eq!(locs[0].get(CanonicalHeader::LocationType), Some("ZIP"));
        assert_eq!(locs[0].get(CanonicalHeader::LocationValue), Some("'07030"));
        assert_eq!(locs[1].get(CanonicalHeader::LocationType), Some("COUNTRY"));
        assert_eq!(locs[1].get(CanonicalHeader::LocationValue), Some("US"));
    }

    #[test]
    fn test_headlines_positional_and_capped() {
        let headlines: Vec<String> = (1..=20).map(|i| format!("H{}", i)).collect();
        let rows = flatten(&[campaign(json!({
            "name": "C",
            "adGroups": [{ "name": "G", "ads": [{ "finalUrl": "https://x.example",
                "headlines": headlines, "descriptions": ["D1", "D2", "D3", "D4", "D5"] }] }]
        }))]);
        let ad = rows.iter().find(|r| *r.row_type() == RowType::Ad).unwrap();
        assert_eq!(ad.get(CanonicalHeader::Headline(1)), Some("H1"));
        assert_eq!(ad.get(CanonicalHeader::Headline(15)), Some("H15"));
        assert_eq!(ad.get(CanonicalHeader::Headline(16)), None);
        assert_eq!(ad.headline_count(), 15);
        assert_eq!(ad.description_count(), 4);
    }

    #[test]
    fn test_empty_input_yields_no_rows() {
        assert!(flatten(&[]).is_empty());
    }
}
