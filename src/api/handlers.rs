use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{
        default_skin_tones, find_profile, AnalyzeSkinToneRequest, CompatibilityLevel,
        CompatibilityRequest, CompatibilityResponse, EngineStatus, InitializeRequest,
        RecommendRequest, RecommendResponse, SkinToneAnalysisResponse, SkinToneProfile,
        StatusMessage,
    },
    services::{
        explanations::compatibility_reason,
        ranking::{explain_ranking, RecommendationEngine},
        scoring::simple_score,
    },
};

use super::AppState;

/// Runs CPU-bound model work off the async executor
async fn blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Background task failed: {}", e)))?
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Default skin tone catalog
pub async fn skin_tones() -> Json<Vec<SkinToneProfile>> {
    Json(default_skin_tones())
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<EngineStatus> {
    Json(state.engine().await.status())
}

/// Trains a new engine on the given products and swaps it in.
///
/// A failed initialization leaves the current engine untouched.
pub async fn initialize(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<InitializeRequest>, JsonRejection>,
) -> AppResult<Json<StatusMessage>> {
    let Json(request) = payload?;

    tracing::info!(
        request_id = %request_id,
        products = request.products.len(),
        custom_skin_tones = request.skin_tones.is_some(),
        "Initializing recommendation engine"
    );

    let profiles = request.skin_tones.unwrap_or_else(default_skin_tones);
    let products = request.products;
    let forest = state.forest.clone();

    let engine =
        blocking(move || RecommendationEngine::initialize(&products, &profiles, &forest)).await?;
    state.replace_engine(engine).await;

    tracing::info!(request_id = %request_id, "Models trained");

    Ok(Json(StatusMessage {
        status: "success",
        message: "Models trained successfully".to_string(),
    }))
}

/// Ranks the product table for a user.
///
/// Products in the request replace the stored table; an untrained engine is
/// fitted lazily. Either change is persisted for later requests unless
/// another request swapped the engine in the meantime.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> AppResult<Json<RecommendResponse>> {
    let Json(request) = payload?;
    let user = request.user_info;

    tracing::info!(
        request_id = %request_id,
        undertone = %user.undertone,
        depth = %user.depth,
        products = request.products.len(),
        "Processing recommendation request"
    );

    let current = state.engine().await;
    if request.products.is_empty() && current.products().is_none() {
        return Err(AppError::InvalidInput("No product data available".to_string()));
    }

    let snapshot = Arc::clone(&current);
    let forest = state.forest.clone();
    let top_k = state.recommend_top_k;
    let products = request.products;

    let (updated, scored) = blocking(move || {
        let updated = if products.is_empty() && current.is_trained() {
            None
        } else {
            let base = if products.is_empty() {
                current.as_ref().clone()
            } else {
                current.with_products(&products)?
            };
            Some(base.ensure_trained(&products, &forest)?)
        };

        let engine = updated.as_ref().unwrap_or(current.as_ref());
        let scored = engine.rank(user, Some(top_k))?;
        Ok((updated, scored))
    })
    .await?;

    if let Some(engine) = updated {
        if !state.replace_engine_if_current(&snapshot, engine).await {
            tracing::warn!(
                request_id = %request_id,
                "Engine was retrained concurrently; keeping the newer engine"
            );
        }
    }

    let recommendations = explain_ranking(scored, user, &state.explainer).await;

    tracing::info!(
        request_id = %request_id,
        count = recommendations.len(),
        "Recommendations generated"
    );

    Ok(Json(RecommendResponse {
        status: "success",
        recommendations,
    }))
}

/// Direct rule-based compatibility check for a single product
pub async fn compatibility(
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<CompatibilityRequest>, JsonRejection>,
) -> AppResult<Json<CompatibilityResponse>> {
    let Json(request) = payload?;

    let product = request
        .product
        .ok_or_else(|| AppError::InvalidInput("No product data provided".to_string()))?;
    product.validate_values()?;

    let undertone = request.user_info.undertone;
    let score = simple_score(&product.colors, undertone, &product.category);
    let level = CompatibilityLevel::from_score(score);

    tracing::info!(
        request_id = %request_id,
        product_id = %product.id,
        score,
        level = ?level,
        "Compatibility computed"
    );

    Ok(Json(CompatibilityResponse {
        reason: compatibility_reason(score, &product.category, undertone),
        product_id: product.id,
        compatibility_score: score,
        compatibility_level: level,
    }))
}

/// Drops a `data:<mime>;base64,` prefix when present
fn strip_data_url(image: &str) -> &str {
    let image = image.trim();
    if image.starts_with("data:") {
        if let Some((_, payload)) = image.split_once(',') {
            return payload;
        }
    }
    image
}

/// Infers skin tone from a photo and maps it to the nearest catalog profile
pub async fn analyze_skin_tone(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<AnalyzeSkinToneRequest>, JsonRejection>,
) -> AppResult<Json<SkinToneAnalysisResponse>> {
    let Json(request) = payload?;

    let image = request
        .image
        .as_deref()
        .map(strip_data_url)
        .filter(|image| !image.is_empty())
        .ok_or_else(|| AppError::InvalidInput("No image provided".to_string()))?;

    STANDARD
        .decode(image)
        .map_err(|e| AppError::InvalidInput(format!("Image is not valid base64: {}", e)))?;

    let analyzer = state.vision.as_ref().ok_or_else(|| {
        AppError::NotConfigured("Skin tone analysis is not available".to_string())
    })?;

    tracing::info!(
        request_id = %request_id,
        provider = analyzer.name(),
        image_len = image.len(),
        "Analyzing skin tone"
    );

    let analysis = analyzer.analyze_skin_tone(image).await?;

    let catalog = default_skin_tones();
    let profile = find_profile(&catalog, analysis.undertone, analysis.depth).ok_or_else(|| {
        AppError::Internal(format!(
            "No skin tone profile for {} {}",
            analysis.undertone, analysis.depth
        ))
    })?;

    tracing::info!(
        request_id = %request_id,
        skin_tone_id = %profile.id,
        "Skin tone matched"
    );

    Ok(Json(SkinToneAnalysisResponse {
        undertone: analysis.undertone,
        depth: analysis.depth,
        gender: analysis.gender,
        age: analysis.age,
        skin_tone_id: profile.id.clone(),
        skin_tone_name: profile.name.clone(),
        recommended_colors: profile.recommended_colors.clone(),
        not_recommended_colors: profile.not_recommended_colors.clone(),
    }))
}
