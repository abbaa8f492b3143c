use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use tonefit_api::{
    api::{create_router, AppState},
    error::{AppError, AppResult},
    models::{Depth, SkinToneAnalysis, Undertone},
    services::{
        classifier::ForestConfig,
        providers::{ReasonContext, TextGenerator, VisionAnalyzer},
        Explainer,
    },
};

struct FixedGenerator;

#[async_trait::async_trait]
impl TextGenerator for FixedGenerator {
    async fn explain(&self, context: &ReasonContext) -> AppResult<String> {
        Ok(format!("Stylist says {} for {}", context.score, context.undertone))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct FixedVision {
    fail: bool,
}

#[async_trait::async_trait]
impl VisionAnalyzer for FixedVision {
    async fn analyze_skin_tone(&self, _image_base64: &str) -> AppResult<SkinToneAnalysis> {
        if self.fail {
            return Err(AppError::ExternalApi("vision service unavailable".to_string()));
        }
        Ok(SkinToneAnalysis {
            undertone: Undertone::Warm,
            depth: Depth::Deep,
            gender: Some("female".to_string()),
            age: Some(34),
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

fn small_forest() -> ForestConfig {
    ForestConfig {
        n_estimators: 10,
        ..ForestConfig::default()
    }
}

fn server_with(explainer: Explainer, vision: Option<Arc<dyn VisionAnalyzer>>) -> TestServer {
    let state = AppState::with_collaborators(explainer, vision, small_forest(), 20);
    TestServer::new(create_router(Arc::new(state))).unwrap()
}

fn create_test_server() -> TestServer {
    server_with(Explainer::fallback_only(), None)
}

fn products(n: usize) -> Value {
    let palettes = [
        vec!["Navy", "Emerald"],
        vec!["Peach", "Coral", "Camel"],
        vec!["Orange", "Khaki"],
        vec!["Teal", "Burgundy", "Navy"],
        vec![],
    ];
    let categories = ["Tops", "Pants", "Dresses", "Shoes"];
    let items: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "id": format!("p{}", i),
                "name": format!("Product {}", i),
                "price": 20.0 + i as f64,
                "colors": palettes[i % palettes.len()],
                "category": categories[i % categories.len()],
                "gender": "unisex",
                "rating": 4.1,
                "reviewCount": 12
            })
        })
        .collect();
    Value::Array(items)
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_skin_tone_catalog() {
    let server = create_test_server();
    let response = server.get("/api/skin-tones").await;
    response.assert_status_ok();
    let catalog: Vec<Value> = response.json();
    assert_eq!(catalog.len(), 9);
    assert!(catalog.iter().any(|p| p["id"] == "cool_light"));
}

#[tokio::test]
async fn test_initialize_with_empty_products_is_rejected() {
    let server = create_test_server();
    let response = server
        .post("/api/initialize")
        .json(&json!({ "products": [] }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No product data provided");

    let status: Value = server.get("/api/status").await.json();
    assert_eq!(status["state"], "uninitialized");
}

#[tokio::test]
async fn test_malformed_body_is_reported_as_json_error() {
    let server = create_test_server();
    let response = server.post("/api/initialize").text("{not json").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_initialize_then_recommend_top_twenty() {
    let server = create_test_server();

    let response = server
        .post("/api/initialize")
        .json(&json!({ "products": products(25) }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Models trained successfully");

    let status: Value = server.get("/api/status").await.json();
    assert_eq!(status["state"], "trained");
    assert_eq!(status["productCount"], 25);
    assert_eq!(status["trainingRows"], 25 * 9);

    let response = server
        .post("/api/recommend")
        .json(&json!({ "userInfo": { "undertone": "cool", "depth": "light" } }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "success");

    let items = body["recommendations"].as_array().unwrap();
    assert_eq!(items.len(), 20);
    let scores: Vec<u64> = items
        .iter()
        .map(|item| item["compatibilityScore"].as_u64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert!(scores.iter().all(|s| *s <= 100));
    assert!(items.iter().all(|item| item["reason"].as_str().unwrap().starts_with("This ")));
}

#[tokio::test]
async fn test_recommend_without_any_products_is_rejected() {
    let server = create_test_server();
    let response = server
        .post("/api/recommend")
        .json(&json!({ "userInfo": { "undertone": "warm" } }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No product data available");
}

#[tokio::test]
async fn test_recommend_trains_lazily_and_persists_products() {
    let server = create_test_server();

    let response = server
        .post("/api/recommend")
        .json(&json!({ "products": products(4) }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 4);

    let status: Value = server.get("/api/status").await.json();
    assert_eq!(status["state"], "trained");
    assert_eq!(status["productCount"], 4);

    // stored table is reused when the request carries no products
    let response = server.post("/api/recommend").json(&json!({})).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_recommend_rejects_invalid_product() {
    let server = create_test_server();
    let response = server
        .post("/api/recommend")
        .json(&json!({ "products": [{ "id": "bad", "price": -1.0 }] }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_recommend_uses_text_generator() {
    let server = server_with(
        Explainer::new(Some(Arc::new(FixedGenerator)), Duration::from_secs(2)),
        None,
    );

    let response = server
        .post("/api/recommend")
        .json(&json!({
            "userInfo": { "undertone": "neutral", "depth": "deep" },
            "products": products(3)
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    for item in body["recommendations"].as_array().unwrap() {
        let expected = format!("Stylist says {} for neutral", item["compatibilityScore"]);
        assert_eq!(item["reason"], expected.as_str());
    }
}

#[tokio::test]
async fn test_compatibility_navy_red_top_for_cool_undertone() {
    let server = create_test_server();
    let response = server
        .post("/api/compatibility")
        .json(&json!({
            "product": { "id": "shirt-1", "colors": ["Navy", "Red"], "category": "Tops" },
            "userInfo": { "undertone": "cool" }
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["productId"], "shirt-1");
    assert_eq!(body["compatibilityScore"], 60);
    assert_eq!(body["compatibilityLevel"], "Medium");
    assert_eq!(body["reason"], "This tops works reasonably well with your cool skin tone.");
}

#[tokio::test]
async fn test_compatibility_scores_product_without_id() {
    let server = create_test_server();
    let response = server
        .post("/api/compatibility")
        .json(&json!({
            "product": { "colors": ["Navy", "Red"], "category": "Tops" },
            "userInfo": { "undertone": "cool" }
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["productId"], "");
    assert_eq!(body["compatibilityScore"], 60);
    assert_eq!(body["compatibilityLevel"], "Medium");
}

#[tokio::test]
async fn test_compatibility_blank_undertone_scores_baseline() {
    let server = create_test_server();
    let response = server
        .post("/api/compatibility")
        .json(&json!({
            "product": { "id": "shirt-2", "colors": ["Navy", "Red"], "category": "Pants" },
            "userInfo": { "undertone": "" }
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["compatibilityScore"], 50);
    assert_eq!(body["reason"], "This pants works reasonably well with your skin tone.");
}

#[tokio::test]
async fn test_capitalized_undertone_is_accepted() {
    let server = create_test_server();

    let response = server
        .post("/api/compatibility")
        .json(&json!({
            "product": { "id": "shirt-3", "colors": ["Navy", "Red"], "category": "Tops" },
            "userInfo": { "undertone": "Cool" }
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["compatibilityScore"], 60);

    let response = server
        .post("/api/recommend")
        .json(&json!({
            "userInfo": { "undertone": "Warm", "depth": "Light" },
            "products": products(3)
        }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_compatibility_without_colors_is_baseline() {
    let server = create_test_server();
    let response = server
        .post("/api/compatibility")
        .json(&json!({
            "product": { "id": "plain", "colors": [], "category": "Pants" },
            "userInfo": { "undertone": "warm" }
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["compatibilityScore"], 50);
    assert_eq!(body["compatibilityLevel"], "Medium");
}

#[tokio::test]
async fn test_compatibility_without_product_is_rejected() {
    let server = create_test_server();
    let response = server
        .post("/api/compatibility")
        .json(&json!({ "userInfo": { "undertone": "cool" } }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No product data provided");
}

#[tokio::test]
async fn test_analyze_skin_tone_requires_image() {
    let server = create_test_server();
    let response = server.post("/api/analyze-skin-tone").json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "No image provided");
}

#[tokio::test]
async fn test_analyze_skin_tone_rejects_invalid_base64() {
    let server = server_with(Explainer::fallback_only(), Some(Arc::new(FixedVision { fail: false })));
    let response = server
        .post("/api/analyze-skin-tone")
        .json(&json!({ "image": "not base64 !!" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_skin_tone_without_provider() {
    let server = create_test_server();
    let response = server
        .post("/api/analyze-skin-tone")
        .json(&json!({ "image": "aGVsbG8=" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analyze_skin_tone_maps_to_profile() {
    let server = server_with(Explainer::fallback_only(), Some(Arc::new(FixedVision { fail: false })));
    let response = server
        .post("/api/analyze-skin-tone")
        .json(&json!({ "image": "data:image/jpeg;base64,aGVsbG8=" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["undertone"], "warm");
    assert_eq!(body["depth"], "deep");
    assert_eq!(body["gender"], "female");
    assert_eq!(body["age"], 34);
    assert_eq!(body["skinToneId"], "warm_deep");
    assert!(!body["recommendedColors"].as_array().unwrap().is_empty());
    assert!(!body["notRecommendedColors"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_analyze_skin_tone_downstream_failure() {
    let server = server_with(Explainer::fallback_only(), Some(Arc::new(FixedVision { fail: true })));
    let response = server
        .post("/api/analyze-skin-tone")
        .json(&json!({ "image": "aGVsbG8=" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "vision service unavailable");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = create_test_server();
    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("req-123"),
        )
        .await;

    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-123");
}
