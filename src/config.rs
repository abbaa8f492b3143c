use std::time::Duration;

use serde::Deserialize;

use crate::services::classifier::ForestConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the OpenAI-compatible text/vision generation API
    #[serde(default = "default_generation_api_url")]
    pub generation_api_url: String,

    /// API key for the generation service. Explanations fall back to
    /// templates and skin tone analysis is disabled when unset.
    #[serde(default)]
    pub generation_api_key: Option<String>,

    /// Model name sent to the generation service
    #[serde(default = "default_generation_model")]
    pub generation_model: String,

    /// Upper bound for a single generation call, in milliseconds
    #[serde(default = "default_generation_timeout_ms")]
    pub generation_timeout_ms: u64,

    /// Number of trees in the compatibility forest
    #[serde(default = "default_forest_trees")]
    pub forest_trees: usize,

    /// Seed for bootstrap and feature sampling
    #[serde(default = "default_forest_seed")]
    pub forest_seed: u64,

    /// Optional depth limit for each tree
    #[serde(default)]
    pub forest_max_depth: Option<usize>,

    /// Number of recommendations returned by `/api/recommend`
    #[serde(default = "default_recommend_top_k")]
    pub recommend_top_k: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_generation_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_generation_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_generation_timeout_ms() -> u64 {
    5000
}

fn default_forest_trees() -> usize {
    100
}

fn default_forest_seed() -> u64 {
    42
}

fn default_recommend_top_k() -> usize {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            generation_api_url: default_generation_api_url(),
            generation_api_key: None,
            generation_model: default_generation_model(),
            generation_timeout_ms: default_generation_timeout_ms(),
            forest_trees: default_forest_trees(),
            forest_seed: default_forest_seed(),
            forest_max_depth: None,
            recommend_top_k: default_recommend_top_k(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn forest(&self) -> ForestConfig {
        ForestConfig {
            n_estimators: self.forest_trees.max(1),
            seed: self.forest_seed,
            max_depth: self.forest_max_depth,
            ..ForestConfig::default()
        }
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }
}
