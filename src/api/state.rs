use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::Config,
    error::AppResult,
    services::{
        classifier::ForestConfig,
        providers::{OpenAiProvider, TextGenerator, VisionAnalyzer},
        ranking::RecommendationEngine,
        Explainer,
    },
};

/// Shared application state
pub struct AppState {
    /// Current engine; replaced wholesale on (re)training
    engine: RwLock<Arc<RecommendationEngine>>,
    pub explainer: Explainer,
    pub vision: Option<Arc<dyn VisionAnalyzer>>,
    pub forest: ForestConfig,
    pub recommend_top_k: usize,
}

impl AppState {
    /// Builds state from configuration. The generation provider is only
    /// created when an API key is configured.
    pub fn new(config: &Config) -> AppResult<Self> {
        let provider = match &config.generation_api_key {
            Some(key) if !key.trim().is_empty() => Some(Arc::new(OpenAiProvider::new(
                key.clone(),
                config.generation_api_url.clone(),
                config.generation_model.clone(),
                config.generation_timeout(),
            )?)),
            _ => None,
        };

        match &provider {
            Some(_) => tracing::info!(
                model = %config.generation_model,
                api_url = %config.generation_api_url,
                "Generation provider configured"
            ),
            None => tracing::warn!(
                "No generation API key set; reasons use templates and skin tone analysis is disabled"
            ),
        }

        let generator = provider.clone().map(|p| p as Arc<dyn TextGenerator>);
        let vision = provider.map(|p| p as Arc<dyn VisionAnalyzer>);

        Ok(Self::with_collaborators(
            Explainer::new(generator, config.generation_timeout()),
            vision,
            config.forest(),
            config.recommend_top_k,
        ))
    }

    pub fn with_collaborators(
        explainer: Explainer,
        vision: Option<Arc<dyn VisionAnalyzer>>,
        forest: ForestConfig,
        recommend_top_k: usize,
    ) -> Self {
        Self {
            engine: RwLock::new(Arc::new(RecommendationEngine::default())),
            explainer,
            vision,
            forest,
            recommend_top_k,
        }
    }

    /// Snapshot of the current engine
    pub async fn engine(&self) -> Arc<RecommendationEngine> {
        self.engine.read().await.clone()
    }

    pub async fn replace_engine(&self, engine: RecommendationEngine) {
        *self.engine.write().await = Arc::new(engine);
    }

    /// Swaps in `engine` only while `expected` is still the current engine.
    ///
    /// Returns `false` and leaves the state untouched when another writer got
    /// there first.
    pub async fn replace_engine_if_current(
        &self,
        expected: &Arc<RecommendationEngine>,
        engine: RecommendationEngine,
    ) -> bool {
        let mut current = self.engine.write().await;
        if !Arc::ptr_eq(&*current, expected) {
            return false;
        }
        *current = Arc::new(engine);
        true
    }
}

impl Default for AppState {
    fn default() -> Self {
        let config = Config::default();
        Self::with_collaborators(
            Explainer::fallback_only(),
            None,
            config.forest(),
            config.recommend_top_k,
        )
    }
}
