//! HTTP surface: a multipart `POST /check` endpoint that accepts a PDF
//! plus a JSON array of rule strings and replies with one verdict per
//! rule, and a trivial `GET /health`.
//!
//! Request-fatal failures (missing document, wrong media type, bad rules
//! payload, unparseable PDF) abort before any evaluation with a 4xx.
//! Per-rule failures never surface here — the evaluator degrades them to
//! `Error` verdicts and the batch always completes.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::pipeline::check::{evaluate_all, RuleEvaluator, TextGenerate, VerdictBatch};
use crate::pipeline::extraction::{Document, ExtractionError, PdfTextExtractor, TextExtractor};

/// Multipart field carrying the PDF bytes.
pub const DOCUMENT_FIELD: &str = "document";
/// Multipart field carrying the JSON-encoded rule array.
pub const RULES_FIELD: &str = "rules";

/// Body limit: 50 MB of document plus multipart overhead.
const MAX_BODY_BYTES: usize = 55 * 1024 * 1024;

/// Shared per-process state: the extractor, the evaluator around its
/// long-lived client, and the fan-out cap.
pub struct AppState {
    extractor: Arc<dyn TextExtractor>,
    evaluator: RuleEvaluator,
    max_concurrent_checks: usize,
}

impl AppState {
    pub fn new(client: Arc<dyn TextGenerate>, max_concurrent_checks: usize) -> Self {
        Self::with_extractor(Arc::new(PdfTextExtractor), client, max_concurrent_checks)
    }

    /// Substitute the extraction seam. Tests use this to exercise the
    /// extraction failure paths without crafting hostile PDF bytes.
    pub fn with_extractor(
        extractor: Arc<dyn TextExtractor>,
        client: Arc<dyn TextGenerate>,
        max_concurrent_checks: usize,
    ) -> Self {
        Self {
            extractor,
            evaluator: RuleEvaluator::new(client),
            max_concurrent_checks,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/check", post(handle_check))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[derive(Serialize)]
struct CheckResponse {
    results: VerdictBatch,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Request-fatal failures, mapped onto response statuses.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("no document supplied")]
    NoDocument,

    #[error("document is not application/pdf")]
    UnsupportedFormat,

    #[error("rules field is not a JSON array of strings")]
    InvalidRulesPayload,

    #[error("document could not be parsed: {0}")]
    Extraction(String),

    #[error("malformed upload: {0}")]
    BadUpload(String),

    #[error("internal server error")]
    Internal(String),
}

impl From<ExtractionError> for ApiError {
    fn from(e: ExtractionError) -> Self {
        match e {
            ExtractionError::UnsupportedFormat => ApiError::UnsupportedFormat,
            ExtractionError::PdfParsing(msg) => ApiError::Extraction(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            ApiError::NoDocument => (StatusCode::NOT_FOUND, None),
            ApiError::UnsupportedFormat
            | ApiError::InvalidRulesPayload
            | ApiError::Extraction(_)
            | ApiError::BadUpload(_) => (StatusCode::BAD_REQUEST, None),
            ApiError::Internal(details) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Some(details.clone()))
            }
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
                details,
            }),
        )
            .into_response()
    }
}

async fn handle_check(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<CheckResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    let mut document: Option<Document> = None;
    let mut rules_raw: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?
    {
        match field.name().unwrap_or("") {
            DOCUMENT_FIELD => {
                let media_type = field.content_type().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadUpload(e.to_string()))?;
                document = Some(Document::new(bytes.to_vec(), media_type));
            }
            RULES_FIELD => {
                rules_raw = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadUpload(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    let document = document.ok_or(ApiError::NoDocument)?;

    let rules: Vec<String> = match rules_raw {
        None => Vec::new(),
        Some(raw) => serde_json::from_str(&raw).map_err(|_| ApiError::InvalidRulesPayload)?,
    };

    // Extraction runs even for zero rules; a bad document must fail the
    // request either way. The parse is CPU-bound and pdf-extract can
    // panic on malformed input, so it runs on the blocking pool and a
    // panic there becomes a 500 instead of a dropped connection.
    let extraction = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.extractor.extract(&document)).await
    };
    let text = match extraction {
        Ok(result) => result?,
        Err(e) => return Err(ApiError::Internal(join_error_message(e))),
    };

    if text.is_empty() {
        tracing::warn!(request_id = %request_id, "document contains no extractable text");
    }

    tracing::info!(
        request_id = %request_id,
        rules = rules.len(),
        text_chars = text.as_str().len(),
        "document extracted, evaluating rules"
    );

    let results = evaluate_all(
        &state.evaluator,
        &text,
        &rules,
        state.max_concurrent_checks,
    )
    .await;

    tracing::info!(request_id = %request_id, verdicts = results.len(), "batch complete");

    Ok(Json(CheckResponse { results }))
}

/// Recover the panic message from a joined extraction task, if any.
fn join_error_message(e: tokio::task::JoinError) -> String {
    match e.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "document extraction panicked".to_string()),
        Err(e) => e.to_string(),
    }
}
