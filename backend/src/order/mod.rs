//! Row ordering for the import tool.
//!
//! Google Ads Editor creates entities top-down while importing, so parents
//! must precede children in the file regardless of the order the wizard
//! produced them in. [`order_rows`] is a stable bucket sort over a fixed
//! type priority: rows of the same type keep their relative order, and
//! rows with an unknown type are appended after every known bucket.

use crate::rows::{Row, RowType};

/// Known row types in the order the import tool wants them.
const PRIORITY: [RowType; 12] = [
    RowType::Campaign,
    RowType::SharedBudget,
    RowType::AdGroup,
    RowType::Ad,
    RowType::Keyword,
    RowType::NegativeKeyword,
    RowType::Location,
    RowType::Asset,
    RowType::CampaignAsset,
    RowType::AdAsset,
    RowType::AdExtension,
    RowType::Label,
];

/// Sort rows into import order. Stable and idempotent.
pub fn order_rows(rows: Vec<Row>) -> Vec<Row> {
    let mut buckets: Vec<Vec<Row>> = (0..PRIORITY.len()).map(|_| Vec::new()).collect();
    let mut unknown = Vec::new();

    for row in rows {
        match PRIORITY.iter().position(|t| t == row.row_type()) {
            Some(i) => buckets[i].push(row),
            None => unknown.push(row),
        }
    }

    let mut ordered: Vec<Row> = buckets.into_iter().flatten().collect();
    ordered.extend(unknown);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::CanonicalHeader;

    fn row(row_type: &str, campaign: &str) -> Row {
        Row::new(RowType::parse(row_type)).with(CanonicalHeader::Campaign, campaign)
    }

    fn types(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.row_type().as_str()).collect()
    }

    #[test]
    fn test_parents_before_children() {
        let rows = vec![
            row("KEYWORD", "C"),
            row("AD", "C"),
            row("ADGROUP", "C"),
            row("CAMPAIGN", "C"),
            row("LOCATION", "C"),
            row("SHARED_BUDGET", "C"),
        ];
        assert_eq!(
            types(&order_rows(rows)),
            vec!["CAMPAIGN", "SHARED_BUDGET", "ADGROUP", "AD", "KEYWORD", "LOCATION"]
        );
    }

    #[test]
    fn test_stable_within_bucket() {
        let rows = vec![
            row("KEYWORD", "first"),
            row("CAMPAIGN", "C"),
            row("KEYWORD", "second"),
            row("KEYWORD", "third"),
        ];
        let ordered = order_rows(rows);
        let keywords: Vec<_> = ordered
            .iter()
            .filter(|r| *r.row_type() == RowType::Keyword)
            .map(|r| r.get(CanonicalHeader::Campaign).unwrap())
            .collect();
        assert_eq!(keywords, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unknown_types_appended_in_order() {
        let rows = vec![
            row("Experiment B", "C"),
            row("LABEL", "C"),
            row("Experiment A", "C"),
            row("CAMPAIGN", "C"),
        ];
        assert_eq!(
            types(&order_rows(rows)),
            vec!["CAMPAIGN", "LABEL", "Experiment B", "Experiment A"]
        );
    }

    #[test]
    fn test_idempotent() {
        let rows = vec![
            row("AD_ASSET", "C"),
            row("KEYWORD", "C"),
            row("CAMPAIGN", "C"),
            row("Mystery", "C"),
            row("ADGROUP", "C"),
        ];
        let once = order_rows(rows);
        let twice = order_rows(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        assert!(order_rows(Vec::new()).is_empty());
    }
}
