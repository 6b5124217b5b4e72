//! REST API types for the wizard frontend.
//!
//! The export endpoint mirrors the contract the wizard's download flow
//! expects: CSV text on success with row/warning counts in response
//! headers, a JSON validation report on failure.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::validation::ValidationReport;

/// Request body for `/api/export` and `/api/validate`: either a bare
/// campaign array or an object wrapping it, depending on the wizard
/// version posting it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CampaignPayload {
    List(Vec<crate::models::Campaign>),
    Wrapped { campaigns: Vec<crate::models::Campaign> },
}

impl CampaignPayload {
    pub fn into_campaigns(self) -> Vec<crate::models::Campaign> {
        match self {
            Self::List(campaigns) => campaigns,
            Self::Wrapped { campaigns } => campaigns,
        }
    }
}

/// Response for `/api/validate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Status: "ready", "warning", "error"
    pub status: String,

    /// Number of rows the export would contain
    pub row_count: usize,

    /// The full validation report
    pub validation: ValidationReport,
}

impl ValidateResponse {
    pub fn new(row_count: usize, validation: ValidationReport) -> Self {
        let status = if validation.is_fatal() {
            "error"
        } else if validation.warning_count() > 0 {
            "warning"
        } else {
            "ready"
        };
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            row_count,
            validation,
        }
    }
}

/// JSON body for a failed export (HTTP 422).
pub fn validation_failure(report: &ValidationReport) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": format!("validation failed with {} fatal error(s)", report.fatal_errors.len()),
        "validation": report,
    })
}

/// Create a generic error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_accepts_both_shapes() {
        let bare: CampaignPayload = serde_json::from_value(json!([{ "name": "C" }])).unwrap();
        assert_eq!(bare.into_campaigns().len(), 1);

        let wrapped: CampaignPayload =
            serde_json::from_value(json!({ "campaigns": [{ "name": "A" }, { "name": "B" }] }))
                .unwrap();
        assert_eq!(wrapped.into_campaigns().len(), 2);
    }

    #[test]
    fn test_validate_response_status() {
        let clean = crate::validation::validate(&[crate::rows::Row::new(
            crate::rows::RowType::Campaign,
        )
        .with(crate::rows::CanonicalHeader::Campaign, "C")]);
        assert_eq!(ValidateResponse::new(1, clean).status, "ready");

        let fatal = crate::validation::validate(&[]);
        assert_eq!(ValidateResponse::new(0, fatal).status, "error");
    }

    #[test]
    fn test_validation_failure_shape() {
        let report = crate::validation::validate(&[]);
        let body = validation_failure(&report);
        assert_eq!(body["status"], "error");
        assert!(body["validation"]["fatalErrors"].is_array());
    }
}
