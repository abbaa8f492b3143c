//! Generative AI collaborators
//!
//! The recommendation pipeline is fully rule- and model-driven; these
//! providers only add prose explanations and photo-based skin tone analysis.
//! Each capability is a trait so a deployment can swap vendors, and tests can
//! substitute mocks.

use crate::{
    error::AppResult,
    models::{Depth, SkinToneAnalysis, Undertone},
};

pub mod openai;

pub use openai::OpenAiProvider;

/// Everything an explanation may depend on
#[derive(Debug, Clone, PartialEq)]
pub struct ReasonContext {
    pub score: u32,
    pub category: String,
    pub undertone: Undertone,
    pub depth: Depth,
}

/// Produces a short natural-language explanation for a recommendation
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a one- or two-sentence explanation
    ///
    /// Callers bound this with a timeout and fall back to a template on any
    /// error, so implementations should not retry internally.
    async fn explain(&self, context: &ReasonContext) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Infers skin tone attributes from a photo
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Analyze a base64-encoded image (no data URL prefix)
    async fn analyze_skin_tone(&self, image_base64: &str) -> AppResult<SkinToneAnalysis>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
