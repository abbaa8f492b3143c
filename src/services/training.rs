//! Synthetic training data.
//!
//! Every product is paired with every skin tone profile and labeled by the
//! profile scorer.

use crate::{
    error::{AppError, AppResult},
    models::{Depth, Product, SkinToneProfile, Undertone},
    services::{
        features::{extract_features, FeatureVector},
        scoring::{profile_score, CompatibilityClass},
    },
};

/// A product's features paired with one skin tone and its rule-derived label
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub features: FeatureVector,
    pub undertone: Undertone,
    pub depth: Depth,
    pub score: u32,
    pub class: CompatibilityClass,
}

/// Labeled table built from every product × profile pair
#[derive(Debug, Clone)]
pub struct TrainingSet {
    rows: Vec<TrainingRow>,
}

impl TrainingSet {
    /// Synthesizes the training table in product-major order.
    ///
    /// Labels come entirely from [`profile_score`]; there is no external
    /// ground truth. Fails when either input is empty since no model can be
    /// fit on zero rows.
    pub fn synthesize(products: &[Product], profiles: &[SkinToneProfile]) -> AppResult<Self> {
        if products.is_empty() {
            return Err(AppError::ModelNotTrained(
                "no products available for training".to_string(),
            ));
        }
        if profiles.is_empty() {
            return Err(AppError::ModelNotTrained(
                "no skin tone profiles available for training".to_string(),
            ));
        }

        let mut rows = Vec::with_capacity(products.len() * profiles.len());

        for product in products {
            let features = extract_features(product)?;

            for profile in profiles {
                let score = profile_score(&product.colors, &product.category, profile);
                rows.push(TrainingRow {
                    features: features.clone(),
                    undertone: profile.undertone,
                    depth: profile.depth,
                    score,
                    class: CompatibilityClass::from_score(score),
                });
            }
        }

        tracing::info!(
            products = products.len(),
            profiles = profiles.len(),
            rows = rows.len(),
            "Training set synthesized"
        );

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[TrainingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows carrying the given label
    #[cfg(test)]
    pub fn class_count(&self, class: CompatibilityClass) -> usize {
        self.rows.iter().filter(|row| row.class == class).count()
    }
}
