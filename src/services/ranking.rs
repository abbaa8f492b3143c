//! Recommendation engine: trained model plus the product table it ranks.
//!
//! An engine value is immutable once built. Re-initialization and lazy
//! training produce a new engine that the caller swaps in, so readers never
//! observe a model paired with another model's product table.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    models::{
        default_skin_tones, sample_products, EngineLifecycle, EngineStatus, Product, RankedItem,
        SkinToneProfile, UserInfo,
    },
    services::{
        classifier::{CompatibilityModel, ForestConfig, ModelInput},
        explanations::Explainer,
        features::FeatureTable,
        providers::ReasonContext,
        training::TrainingSet,
    },
};

pub const DEFAULT_TOP_K: usize = 10;

/// A product's model score before rounding and explanation
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredProduct {
    pub product_id: String,
    pub category: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    model: Option<Arc<CompatibilityModel>>,
    products: Option<Arc<FeatureTable>>,
}

impl RecommendationEngine {
    /// Extracts features, synthesizes training rows and fits a fresh model.
    pub fn initialize(
        products: &[Product],
        profiles: &[SkinToneProfile],
        config: &ForestConfig,
    ) -> AppResult<Self> {
        if products.is_empty() {
            return Err(AppError::InvalidInput("No product data provided".to_string()));
        }

        let table = FeatureTable::from_products(products)?;
        let training = TrainingSet::synthesize(products, profiles)?;
        let model = CompatibilityModel::fit(&training, config)?;

        tracing::info!(
            products = table.len(),
            profiles = profiles.len(),
            rows = training.len(),
            "Recommendation engine initialized"
        );

        Ok(Self {
            model: Some(Arc::new(model)),
            products: Some(Arc::new(table)),
        })
    }

    /// Same model, new product table
    pub fn with_products(&self, products: &[Product]) -> AppResult<Self> {
        let table = FeatureTable::from_products(products)?;
        Ok(Self {
            model: self.model.clone(),
            products: Some(Arc::new(table)),
        })
    }

    /// Returns a trained engine, fitting lazily when no model exists yet.
    ///
    /// The lazy fit uses `products` with the default profiles, or the
    /// built-in sample catalog when `products` is empty. The product table
    /// is kept as is.
    pub fn ensure_trained(&self, products: &[Product], config: &ForestConfig) -> AppResult<Self> {
        if self.model.is_some() {
            return Ok(self.clone());
        }

        let fallback;
        let products = if products.is_empty() {
            tracing::warn!("No products to train on, fitting on the sample catalog");
            fallback = sample_products();
            fallback.as_slice()
        } else {
            products
        };

        let training = TrainingSet::synthesize(products, &default_skin_tones())?;
        let model = CompatibilityModel::fit(&training, config)?;

        tracing::info!(rows = training.len(), "Model trained lazily");

        Ok(Self {
            model: Some(Arc::new(model)),
            products: self.products.clone(),
        })
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn lifecycle(&self) -> EngineLifecycle {
        if self.is_trained() {
            EngineLifecycle::Trained
        } else {
            EngineLifecycle::Uninitialized
        }
    }

    pub fn products(&self) -> Option<&FeatureTable> {
        self.products.as_deref()
    }

    pub fn trained_at(&self) -> Option<DateTime<Utc>> {
        self.model.as_ref().map(|model| model.trained_at())
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            state: self.lifecycle(),
            product_count: self.products.as_ref().map_or(0, |table| table.len()),
            training_rows: self.model.as_ref().map_or(0, |model| model.training_rows()),
            classes: self
                .model
                .as_ref()
                .map(|model| model.classes().iter().map(|c| c.to_string()).collect())
                .unwrap_or_default(),
            trained_at: self.trained_at(),
        }
    }

    /// Scores every stored product for `user` and returns the best `top_k`
    /// (default [`DEFAULT_TOP_K`]) in descending score order. Ties keep the
    /// product table order.
    pub fn rank(&self, user: UserInfo, top_k: Option<usize>) -> AppResult<Vec<ScoredProduct>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| AppError::ModelNotTrained("model has not been trained".to_string()))?;
        let table = self
            .products
            .as_ref()
            .ok_or_else(|| AppError::InvalidInput("No product data available".to_string()))?;

        let mut scored = table
            .rows()
            .iter()
            .map(|features| {
                let score = model.predict_score(&ModelInput {
                    features,
                    undertone: user.undertone,
                    depth: user.depth,
                })?;
                Ok(ScoredProduct {
                    product_id: features.product_id.clone(),
                    category: features.category.clone(),
                    score,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        // sort_by is stable
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k.unwrap_or(DEFAULT_TOP_K));

        tracing::debug!(
            candidates = table.len(),
            returned = scored.len(),
            undertone = %user.undertone,
            depth = %user.depth,
            "Products ranked"
        );

        Ok(scored)
    }
}

/// Rounds scores and attaches a reason to each ranked product.
pub async fn explain_ranking(
    scored: Vec<ScoredProduct>,
    user: UserInfo,
    explainer: &Explainer,
) -> Vec<RankedItem> {
    let rounded: Vec<u32> = scored
        .iter()
        .map(|item| item.score.round().clamp(0.0, 100.0) as u32)
        .collect();

    let contexts = scored
        .iter()
        .zip(rounded.iter())
        .map(|(item, &score)| ReasonContext {
            score,
            category: item.category.clone(),
            undertone: user.undertone,
            depth: user.depth,
        })
        .collect();
    let reasons = explainer.explain_all(contexts).await;

    scored
        .into_iter()
        .zip(rounded)
        .zip(reasons)
        .map(|((item, compatibility_score), reason)| RankedItem {
            product_id: item.product_id,
            compatibility_score,
            reason,
        })
        .collect()
}
