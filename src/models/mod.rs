use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod product;
pub mod skin_tone;

pub use product::{sample_products, Product};
pub use skin_tone::{default_skin_tones, find_profile, Depth, SkinToneProfile, Undertone};

use skin_tone::{deserialize_blank_as_default, deserialize_blank_as_none};

// ============================================================================
// Ranking
// ============================================================================

/// Skin tone attributes supplied by the user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct UserInfo {
    #[serde(deserialize_with = "deserialize_blank_as_default")]
    pub undertone: Undertone,
    #[serde(deserialize_with = "deserialize_blank_as_default")]
    pub depth: Depth,
}

/// One entry of a recommendation list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    pub product_id: String,
    pub compatibility_score: u32,
    pub reason: String,
}

// ============================================================================
// API payloads
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeRequest {
    #[serde(default)]
    pub products: Vec<Product>,
    /// Defaults to the canonical nine-profile catalog
    #[serde(default)]
    pub skin_tones: Option<Vec<SkinToneProfile>>,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default)]
    pub user_info: UserInfo,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub status: &'static str,
    pub recommendations: Vec<RankedItem>,
}

/// Undertone only; an absent undertone scores neutrally
#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct UndertoneInfo {
    #[serde(deserialize_with = "deserialize_blank_as_none")]
    pub undertone: Option<Undertone>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRequest {
    #[serde(default)]
    pub product: Option<Product>,
    #[serde(default)]
    pub user_info: UndertoneInfo,
}

/// Coarse band reported by the direct compatibility check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CompatibilityLevel {
    High,
    Medium,
    Low,
}

impl CompatibilityLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            CompatibilityLevel::High
        } else if score >= 50 {
            CompatibilityLevel::Medium
        } else {
            CompatibilityLevel::Low
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResponse {
    pub product_id: String,
    pub compatibility_score: u32,
    pub compatibility_level: CompatibilityLevel,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeSkinToneRequest {
    #[serde(default)]
    pub image: Option<String>,
}

/// Attributes inferred from a photo by the vision service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkinToneAnalysis {
    pub undertone: Undertone,
    pub depth: Depth,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinToneAnalysisResponse {
    pub undertone: Undertone,
    pub depth: Depth,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub skin_tone_id: String,
    pub skin_tone_name: String,
    pub recommended_colors: Vec<String>,
    pub not_recommended_colors: Vec<String>,
}

// ============================================================================
// Engine status
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngineLifecycle {
    Uninitialized,
    Trained,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatus {
    pub state: EngineLifecycle,
    pub product_count: usize,
    pub training_rows: usize,
    pub classes: Vec<String>,
    pub trained_at: Option<DateTime<Utc>>,
}
