//! Integration tests for the FinDoc Server API endpoints.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use findoc_engine::{AnalysisEngine, AnalysisEngineBuilder};
use findoc_server::routes::create_router;
use findoc_traits::config::EngineConfig;
use findoc_traits::analysis::StructuredAnalyzer;
use findoc_traits::extraction::TextExtractor;
use findoc_traits::{
    AssetClass, AssetClassification, Confidence, FixedIncomeAsset, FixedIncomePortfolio,
    InvestmentReport, StockHolding, StockPortfolio, TotalInvested, TraitError,
};

const BOUNDARY: &str = "findoc-test-boundary";
const PDF: &[u8] = b"%PDF-1.7\n1 0 obj << >> endobj\n%%EOF";
const MAX_UPLOAD: usize = 1024;

/// Extractor that accepts `%PDF` bytes and returns canned text.
struct CannedExtractor {
    text: String,
}

#[async_trait]
impl TextExtractor for CannedExtractor {
    fn is_valid_document(&self, content: &[u8]) -> bool {
        content.len() >= 5 && content.starts_with(b"%PDF")
    }

    async fn extract_text(&self, _content: Bytes) -> Result<String, TraitError> {
        Ok(self.text.clone())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// Analyzer that returns a fixed report, or fails like a broken model.
struct CannedAnalyzer {
    report: Option<InvestmentReport>,
}

#[async_trait]
impl StructuredAnalyzer for CannedAnalyzer {
    async fn analyze(&self, _text: &str) -> Result<InvestmentReport, TraitError> {
        self.report.clone().ok_or_else(|| {
            TraitError::ParseError("expected value at line 1 column 1 (sk-secret-detail)".into())
        })
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// Create a sample report.
fn sample_report() -> InvestmentReport {
    InvestmentReport {
        total: TotalInvested {
            total_invested_amount: dec!(15230.50),
            currency: "BRL".into(),
        },
        classification: AssetClassification {
            total_invested: dec!(15230.50),
            currency: "BRL".into(),
            classes: vec![
                AssetClass {
                    asset_class_name: "Renda Fixa".into(),
                    invested: dec!(10000),
                    percentage: dec!(0.6566),
                    confidence: Confidence::new(0.95).unwrap(),
                    confidence_reason: "explicit section total".into(),
                },
                AssetClass {
                    asset_class_name: "Ações".into(),
                    invested: dec!(5230.50),
                    percentage: dec!(0.3434),
                    confidence: Confidence::new(0.9).unwrap(),
                    confidence_reason: "explicit section total".into(),
                },
            ],
        },
        stocks: StockPortfolio {
            total_invested: dec!(5230.50),
            currency: "BRL".into(),
            stocks: vec![StockHolding {
                ticker: "PETR4".into(),
                quantity: 100,
                average_price: dec!(52.305),
                total_invested: dec!(5230.50),
                current_value: Some(dec!(5600)),
                return_amount: Some(dec!(369.50)),
                return_percentage: Some(dec!(0.0706)),
                confidence: Confidence::new(0.9).unwrap(),
                confidence_reason: "position table".into(),
            }],
        },
        fixed_income: FixedIncomePortfolio {
            total_invested: dec!(10000),
            currency: "BRL".into(),
            assets: vec![FixedIncomeAsset {
                name: "CDB Banco X".into(),
                asset_type: "CDB".into(),
                issuer: "Banco X".into(),
                invested_amount: dec!(10000),
                current_value: None,
                return_amount: None,
                return_percentage: None,
                rate: "110% CDI".into(),
                maturity_date: None,
                application_date: None,
                confidence: Confidence::new(0.85).unwrap(),
                confidence_reason: "fixed income table".into(),
            }],
        },
    }
}

/// Create a test engine over canned collaborators.
fn create_test_engine(text: &str, report: Option<InvestmentReport>) -> Arc<AnalysisEngine> {
    let engine = AnalysisEngineBuilder::new()
        .with_extractor(Arc::new(CannedExtractor {
            text: text.to_string(),
        }))
        .with_analyzer(Arc::new(CannedAnalyzer { report }))
        .build()
        .expect("Failed to build engine");

    Arc::new(engine)
}

/// Create a test engine whose results expire after `ttl`.
fn create_short_lived_engine(ttl: Duration) -> Arc<AnalysisEngine> {
    let engine = AnalysisEngineBuilder::new()
        .with_config(EngineConfig {
            result_ttl: ttl,
            ..EngineConfig::default()
        })
        .with_extractor(Arc::new(CannedExtractor {
            text: "Extrato de investimentos".to_string(),
        }))
        .with_analyzer(Arc::new(CannedAnalyzer {
            report: Some(sample_report()),
        }))
        .build()
        .expect("Failed to build engine");

    Arc::new(engine)
}

fn create_test_app() -> Router {
    create_router(
        create_test_engine("Extrato de investimentos", Some(sample_report())),
        MAX_UPLOAD,
    )
}

/// Encode a single-part multipart body.
fn multipart_body(field: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"extrato.pdf\"\r\n",
            field
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Build a multipart upload request with a single part.
fn upload_request(field: &str, content_type: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analysis")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, content_type, content)))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn upload_sample(app: Router) -> String {
    let (status, json) = send(app, upload_request("file", "application/pdf", PDF)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    json["analysisId"].as_str().unwrap().to_string()
}

// =============================================================================
// HEALTH CHECK TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (status, json) = get(create_test_app(), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

// =============================================================================
// UPLOAD TESTS
// =============================================================================

#[tokio::test]
async fn test_upload_returns_id_and_endpoints() {
    let (status, json) = send(
        create_test_app(),
        upload_request("file", "application/pdf", PDF),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    let id = json["analysisId"].as_str().unwrap();
    assert!(!json["message"].as_str().unwrap().is_empty());
    assert_eq!(json["endpoints"]["total"], format!("/api/analysis/{}/total", id));
    assert_eq!(
        json["endpoints"]["fixedIncome"],
        format!("/api/analysis/{}/fixed-income", id)
    );
    assert_eq!(
        json["endpoints"]["complete"],
        format!("/api/analysis/{}/complete", id)
    );
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let (status, json) = send(
        create_test_app(),
        upload_request("attachment", "application/pdf", PDF),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn test_upload_empty_file() {
    let (status, _) = send(
        create_test_app(),
        upload_request("file", "application/pdf", b""),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_too_large() {
    let mut content = PDF.to_vec();
    content.resize(MAX_UPLOAD + 1, b' ');

    let (status, json) = send(
        create_test_app(),
        upload_request("file", "application/pdf", &content),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["details"].as_str().unwrap().contains("MB"));
}

#[tokio::test]
async fn test_upload_wrong_content_type() {
    let (status, json) = send(
        create_test_app(),
        upload_request("file", "text/plain", PDF),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["details"].as_str().unwrap().contains("PDF"));
}

#[tokio::test]
async fn test_upload_bad_signature() {
    let (status, json) = send(
        create_test_app(),
        upload_request("file", "application/pdf", b"<html>not a pdf</html>"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["details"].as_str().unwrap().contains("not a valid PDF"));
}

#[tokio::test]
async fn test_upload_without_text() {
    let app = create_router(create_test_engine("   \n  ", Some(sample_report())), MAX_UPLOAD);
    let (status, json) = send(app, upload_request("file", "application/pdf", PDF)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["details"].as_str().unwrap().contains("no text"));
}

#[tokio::test]
async fn test_analyzer_failure_is_generic_500() {
    let app = create_router(create_test_engine("Extrato", None), MAX_UPLOAD);
    let (status, json) = send(app, upload_request("file", "application/pdf", PDF)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    // Internal causes stay in the logs
    let body = json.to_string();
    assert!(!body.contains("sk-secret-detail"));
    assert!(!body.contains("extrato.pdf"));
}

// =============================================================================
// RETRIEVAL TESTS
// =============================================================================

#[tokio::test]
async fn test_sub_resources_after_upload() {
    let app = create_test_app();
    let id = upload_sample(app.clone()).await;

    let (status, total) = get(app.clone(), &format!("/api/analysis/{}/total", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(total["totalInvestedAmount"], json!(15230.5));
    assert_eq!(total["currency"], "BRL");

    let (status, classification) =
        get(app.clone(), &format!("/api/analysis/{}/classification", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(classification["classes"].as_array().unwrap().len(), 2);

    let (status, stocks) = get(app.clone(), &format!("/api/analysis/{}/stocks", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stocks["stocks"][0]["ticker"], "PETR4");
    assert_eq!(stocks["stocks"][0]["return"], json!(369.5));

    let (status, fixed_income) =
        get(app.clone(), &format!("/api/analysis/{}/fixed-income", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fixed_income["assets"][0]["type"], "CDB");
    assert!(fixed_income["assets"][0]["maturityDate"].is_null());

    let (status, complete) = get(app, &format!("/api/analysis/{}/complete", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(complete["analysisId"], id);
    assert!(complete["createdAt"].is_string());
    assert!(complete["expiresAt"].is_string());
    assert_eq!(complete["fixedIncome"]["totalInvested"], json!(10000.0));
}

#[tokio::test]
async fn test_unknown_and_malformed_ids_look_the_same() {
    let app = create_test_app();
    let unknown = uuid_like();

    let (status_unknown, body_unknown) =
        get(app.clone(), &format!("/api/analysis/{}/complete", unknown)).await;
    let (status_malformed, body_malformed) =
        get(app, "/api/analysis/not-an-id/complete").await;

    assert_eq!(status_unknown, StatusCode::NOT_FOUND);
    assert_eq!(status_malformed, StatusCode::NOT_FOUND);
    assert_eq!(body_unknown, body_malformed);
    assert!(body_unknown["details"].as_str().unwrap().contains("30 minutes"));
}

#[tokio::test]
async fn test_delete_then_not_found() {
    let app = create_test_app();
    let id = upload_sample(app.clone()).await;

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/analysis/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = get(app.clone(), &format!("/api/analysis/{}/total", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Idempotent
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/analysis/{}", id))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_uploads_get_distinct_ids() {
    let app = create_test_app();
    let first = upload_sample(app.clone()).await;
    let second = upload_sample(app).await;
    assert_ne!(first, second);
}

#[tokio::test(start_paused = true)]
async fn test_expired_id_looks_like_unknown_id() {
    let app = create_router(create_short_lived_engine(Duration::from_secs(30)), MAX_UPLOAD);
    let id = upload_sample(app.clone()).await;

    let (status, _) = get(app.clone(), &format!("/api/analysis/{}/total", id)).await;
    assert_eq!(status, StatusCode::OK);

    tokio::time::advance(Duration::from_secs(31)).await;

    let (status_expired, body_expired) =
        get(app.clone(), &format!("/api/analysis/{}/total", id)).await;
    let (status_unknown, body_unknown) =
        get(app, &format!("/api/analysis/{}/total", uuid_like())).await;

    assert_eq!(status_expired, StatusCode::NOT_FOUND);
    assert_eq!(status_unknown, StatusCode::NOT_FOUND);
    assert_eq!(body_expired, body_unknown);
    assert!(body_expired["details"].as_str().unwrap().contains("1 minute)"));
}

// =============================================================================
// BODY LIMIT TESTS
// =============================================================================

/// Larger than the upload limit plus multipart allowance.
fn oversized_upload() -> Vec<u8> {
    let mut content = PDF.to_vec();
    content.resize(2 * 1024 * 1024, b' ');
    content
}

#[tokio::test]
async fn test_declared_oversized_body_rejected_before_handler() {
    let body = multipart_body("file", "application/pdf", &oversized_upload());
    let request = Request::builder()
        .method("POST")
        .uri("/api/analysis")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();

    let response = create_test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_undeclared_oversized_body_is_cut_off() {
    let (status, json) = send(
        create_test_app(),
        upload_request("file", "application/pdf", &oversized_upload()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["analysisId"].is_null());
}

fn uuid_like() -> String {
    "7f3c2a10-95d4-4c8e-9b1a-2f0e6d4c8b21".to_string()
}
