//! # adexport - Google Ads Editor import CSV generation
//!
//! adexport turns a campaign-wizard object graph into a flat, strictly
//! ordered CSV document that Google Ads Editor imports cleanly, refusing
//! to emit a file the import tool would reject or corrupt.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Campaigns  │────▶│  Flattener  │────▶│  Validator  │────▶│ Import CSV  │
//! │   (JSON)    │     │ (rows+tags) │     │ (order+csv) │     │ (UTF-8)     │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use adexport::{generate, Campaign};
//!
//! let campaigns: Vec<Campaign> = serde_json::from_str(payload)?;
//! let output = generate(&campaigns)?;
//! std::fs::write("import.csv", &output.csv)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Campaign input graph (Campaign, AdGroup, Ad, ...)
//! - [`normalize`] - Canonical vocabulary, ZIP fix-up, shape checks
//! - [`rows`] - Flat row model and the canonical header catalogue
//! - [`flatten`] - Campaign graph to rows
//! - [`validation`] - Per-row and cross-row validation
//! - [`order`] - Import-order bucket sort
//! - [`serializer`] - Header union and RFC-4180 escaping
//! - [`pipeline`] - The composed generate entry point
//! - [`adapter`] - Ingest of externally authored CSVs
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;
pub mod normalize;
pub mod rows;

// Pipeline stages
pub mod flatten;
pub mod order;
pub mod serializer;
pub mod validation;

// Composition
pub mod pipeline;

// External input
pub mod adapter;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ExportError,
    ExportResult,
    IngestError,
    IngestResult,
    ServerError,
    ServerResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Ad,
    AdGroup,
    Asset,
    Campaign,
    KeywordSpec,
    Location,
    MatchType,
    NegativeKeyword,
    Scalar,
};

// =============================================================================
// Re-exports - Row model
// =============================================================================

pub use rows::{CanonicalHeader, Row, RowType, REQUIRED_HEADERS};

// =============================================================================
// Re-exports - Pipeline stages
// =============================================================================

pub use flatten::flatten;
pub use order::order_rows;
pub use serializer::{build_headers, escape_csv, to_csv};
pub use validation::{validate, FatalError, Issue, IssueKind, ValidationReport, Warning};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{check, flatten_ordered, generate, ExportOutput};

// =============================================================================
// Re-exports - Adapter
// =============================================================================

pub use adapter::{detect_delimiter, detect_encoding, ingest_bytes, ingest_file, IngestOutput};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, validation_failure, CampaignPayload, ValidateResponse};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
