//! End-to-end tests of the /check endpoint against an in-process router
//! with a mock text-generation client.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use common::make_test_pdf;
use rulecheck::pipeline::check::MockTextClient;
use rulecheck::pipeline::extraction::{Document, ExtractedText, ExtractionError, TextExtractor};
use rulecheck::server::{build_router, AppState};

const BOUNDARY: &str = "rulecheck-test-boundary";

/// Hand-rolled multipart body: optional document part, optional rules part.
fn check_request(document: Option<(&[u8], &str)>, rules: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();

    if let Some((bytes, content_type)) = document {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"document\"; filename=\"doc.pdf\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    if let Some(rules) = rules {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"rules\"\r\n\r\n\
                 {rules}\r\n"
            )
            .as_bytes(),
        );
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/check")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn router_with(client: Arc<MockTextClient>) -> axum::Router {
    build_router(Arc::new(AppState::new(client, 4)))
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn satisfied_reply() -> &'static str {
    r#"{"status": "Satisfied", "evidence": "Signed by: Jane Doe", "reasoning": "found it", "confidence": 90}"#
}

#[tokio::test]
async fn health_returns_ok() {
    let app = router_with(Arc::new(MockTextClient::new("{}")));
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_document_returns_404() {
    let client = Arc::new(MockTextClient::new("{}"));
    let app = router_with(client.clone());

    let response = app
        .oneshot(check_request(None, Some(r#"["a rule"]"#)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("no document"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn non_pdf_media_type_returns_400_without_evaluation() {
    let client = Arc::new(MockTextClient::new("{}"));
    let app = router_with(client.clone());

    let response = app
        .oneshot(check_request(
            Some((b"plain text bytes", "text/plain")),
            Some(r#"["a rule"]"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn unparseable_pdf_returns_400() {
    let app = router_with(Arc::new(MockTextClient::new("{}")));

    let response = app
        .oneshot(check_request(
            Some((b"definitely not a pdf", "application/pdf")),
            Some(r#"["a rule"]"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("could not be parsed"));
}

#[tokio::test]
async fn malformed_rules_json_returns_400() {
    let pdf = make_test_pdf("content");
    let app = router_with(Arc::new(MockTextClient::new("{}")));

    let response = app
        .oneshot(check_request(
            Some((&pdf, "application/pdf")),
            Some("not json at all"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_array_rules_payload_returns_400() {
    let pdf = make_test_pdf("content");
    let app = router_with(Arc::new(MockTextClient::new("{}")));

    let response = app
        .oneshot(check_request(
            Some((&pdf, "application/pdf")),
            Some(r#"{"rule": "not an array"}"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn zero_rules_returns_empty_results() {
    let pdf = make_test_pdf("content");
    let client = Arc::new(MockTextClient::new("{}"));
    let app = router_with(client.clone());

    let response = app
        .oneshot(check_request(Some((&pdf, "application/pdf")), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn one_verdict_per_rule_in_submission_order() {
    let pdf = make_test_pdf("Signed by: Jane Doe on 2024-01-01");
    let app = router_with(Arc::new(MockTextClient::new(satisfied_reply())));

    let rules = r#"["Document must contain a signature", "Document must have a date", "Document must name a witness"]"#;
    let response = app
        .oneshot(check_request(Some((&pdf, "application/pdf")), Some(rules)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let results = body["results"].as_array().unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0]["rule"].as_str().unwrap(),
        "Document must contain a signature"
    );
    assert_eq!(
        results[1]["rule"].as_str().unwrap(),
        "Document must have a date"
    );
    assert_eq!(
        results[2]["rule"].as_str().unwrap(),
        "Document must name a witness"
    );
    for verdict in results {
        assert_eq!(verdict["status"].as_str().unwrap(), "Satisfied");
        let confidence = verdict["confidence"].as_i64().unwrap();
        assert!((0..=100).contains(&confidence));
    }
}

#[tokio::test]
async fn blank_rule_keeps_its_slot_as_not_provided() {
    let pdf = make_test_pdf("content");
    let client = Arc::new(MockTextClient::new(satisfied_reply()));
    let app = router_with(client.clone());

    let response = app
        .oneshot(check_request(
            Some((&pdf, "application/pdf")),
            Some(r#"["first", "   ", "third"]"#),
        ))
        .await
        .unwrap();

    let body = json_body(response).await;
    let results = body["results"].as_array().unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[1]["status"].as_str().unwrap(), "Not Provided");
    assert_eq!(results[1]["confidence"].as_i64().unwrap(), 0);
    assert_eq!(client.calls(), 2);
}

#[tokio::test]
async fn service_outage_degrades_to_error_verdicts_not_a_5xx() {
    let pdf = make_test_pdf("content");
    let app = router_with(Arc::new(MockTextClient::failing()));

    let response = app
        .oneshot(check_request(
            Some((&pdf, "application/pdf")),
            Some(r#"["rule one", "rule two"]"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let results = body["results"].as_array().unwrap();

    assert_eq!(results.len(), 2);
    for verdict in results {
        assert_eq!(verdict["status"].as_str().unwrap(), "Error");
        assert_eq!(
            verdict["reasoning"].as_str().unwrap(),
            "external service error"
        );
        assert_eq!(verdict["confidence"].as_i64().unwrap(), 0);
    }
}

/// Extractor that panics the way pdf-extract does on some malformed
/// inputs it fails to reject cleanly.
struct PanickyExtractor;

impl TextExtractor for PanickyExtractor {
    fn extract(&self, _document: &Document) -> Result<ExtractedText, ExtractionError> {
        panic!("parser exploded on malformed xref");
    }
}

#[tokio::test]
async fn extraction_panic_returns_500_json_body() {
    let app = build_router(Arc::new(AppState::with_extractor(
        Arc::new(PanickyExtractor),
        Arc::new(MockTextClient::new("{}")),
        4,
    )));

    let pdf = make_test_pdf("content");
    let response = app
        .oneshot(check_request(
            Some((&pdf, "application/pdf")),
            Some(r#"["a rule"]"#),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"].as_str().unwrap(), "internal server error");
    assert!(body["details"].as_str().unwrap().contains("parser exploded"));
}

#[tokio::test]
async fn fenced_model_reply_still_parses() {
    let pdf = make_test_pdf("content");
    let fenced = format!("```json\n{}\n```", satisfied_reply());
    let app = router_with(Arc::new(MockTextClient::new(&fenced)));

    let response = app
        .oneshot(check_request(
            Some((&pdf, "application/pdf")),
            Some(r#"["a rule"]"#),
        ))
        .await
        .unwrap();

    let body = json_body(response).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["status"].as_str().unwrap(), "Satisfied");
    assert_eq!(results[0]["confidence"].as_i64().unwrap(), 90);
}
