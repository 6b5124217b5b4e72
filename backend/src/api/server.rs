//! HTTP server for the export API.
//!
//! The wizard frontend posts its campaign graph here and downloads the
//! resulting CSV; validation can be run separately for live feedback while
//! the user is still editing.
//!
//! # API Endpoints
//!
//! | Method | Path            | Description                              |
//! |--------|-----------------|------------------------------------------|
//! | GET    | `/health`       | Health check                             |
//! | POST   | `/api/export`   | Campaign JSON → CSV (or 422 with report) |
//! | POST   | `/api/validate` | Campaign JSON → validation report        |
//! | GET    | `/api/logs`     | SSE stream for real-time logs            |

use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::LOG_BROADCASTER;
use super::types::{error_response, validation_failure, CampaignPayload, ValidateResponse};
use crate::error::ExportError;
use crate::pipeline::{check, flatten_ordered, generate};

static X_ROW_COUNT: HeaderName = HeaderName::from_static("x-row-count");
static X_WARNINGS_COUNT: HeaderName = HeaderName::from_static("x-warnings-count");

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([
            header::CONTENT_TYPE,
            header::CONTENT_DISPOSITION,
            X_ROW_COUNT.clone(),
            X_WARNINGS_COUNT.clone(),
        ]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/export", post(export_csv))
        .route("/api/validate", post(validate_campaigns))
        .route("/api/logs", get(sse_logs))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    eprintln!("🚀 Export server running on http://localhost:{}", port);
    eprintln!("   POST /api/export   - Campaign JSON to CSV");
    eprintln!("   POST /api/validate - Validation report only");
    eprintln!("   GET  /api/logs     - SSE log stream");
    eprintln!("   GET  /health       - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "adexport",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "export": "POST /api/export",
            "validate": "POST /api/validate",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Export endpoint: CSV text on success, JSON report on fatal findings.
async fn export_csv(Json(payload): Json<CampaignPayload>) -> Response {
    let campaigns = payload.into_campaigns();
    eprintln!("\n📄 EXPORT REQUEST: {} campaign(s)", campaigns.len());

    match generate(&campaigns) {
        Ok(output) => {
            let row_count = output.row_count;
            let warnings = output.validation.warning_count();
            let mut response = (StatusCode::OK, output.csv).into_response();
            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            );
            headers.insert(
                header::CONTENT_DISPOSITION,
                HeaderValue::from_static("attachment; filename=\"google-ads-import.csv\""),
            );
            if let Ok(value) = HeaderValue::from_str(&row_count.to_string()) {
                headers.insert(X_ROW_COUNT.clone(), value);
            }
            if let Ok(value) = HeaderValue::from_str(&warnings.to_string()) {
                headers.insert(X_WARNINGS_COUNT.clone(), value);
            }
            response
        }
        Err(ExportError::ValidationFailed { report }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(validation_failure(&report)),
        )
            .into_response(),
        Err(e) => {
            eprintln!("❌ Export error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(error_response(&e.to_string())),
            )
                .into_response()
        }
    }
}

/// Validation endpoint: always 200 with the full report.
async fn validate_campaigns(Json(payload): Json<CampaignPayload>) -> Json<ValidateResponse> {
    let campaigns = payload.into_campaigns();
    let row_count = flatten_ordered(&campaigns).len();
    let report = check(&campaigns);
    Json(ValidateResponse::new(row_count, report))
}
