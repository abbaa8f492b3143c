//! Compatibility classifier trained on synthesized product × skin tone rows.

use chrono::{DateTime, Utc};

use crate::{
    error::{AppError, AppResult},
    services::{
        features::FeatureSchema,
        scoring::CompatibilityClass,
        training::{TrainingRow, TrainingSet},
    },
};

pub mod forest;
pub mod preprocess;

pub use forest::{ForestConfig, RandomForest};
pub use preprocess::{ModelInput, Preprocessor};

impl TrainingRow {
    pub fn input(&self) -> ModelInput<'_> {
        ModelInput {
            features: &self.features,
            undertone: self.undertone,
            depth: self.depth,
        }
    }
}

/// Fitted preprocessing + forest pipeline
#[derive(Debug, Clone)]
pub struct CompatibilityModel {
    preprocessor: Preprocessor,
    forest: RandomForest,
    /// Observed labels sorted by name; forest outputs follow this order
    classes: Vec<CompatibilityClass>,
    /// Raw input columns in fit order
    feature_columns: Vec<String>,
    training_rows: usize,
    trained_at: DateTime<Utc>,
}

impl CompatibilityModel {
    /// Fits the classifier on a synthesized training set.
    pub fn fit(training: &TrainingSet, config: &ForestConfig) -> AppResult<Self> {
        if training.is_empty() {
            return Err(AppError::ModelNotTrained(
                "training set is empty".to_string(),
            ));
        }

        let mut classes: Vec<CompatibilityClass> = Vec::new();
        for row in training.rows() {
            if !classes.contains(&row.class) {
                classes.push(row.class);
            }
        }
        classes.sort_by_key(|c| c.as_str());

        if !classes.contains(&CompatibilityClass::High) {
            tracing::warn!(
                classes = ?classes,
                "No training row is labeled high; scores will report the probability of the first class instead"
            );
        }

        let inputs: Vec<ModelInput<'_>> = training.rows().iter().map(TrainingRow::input).collect();
        let preprocessor = Preprocessor::fit(&inputs);
        let samples: Vec<Vec<f64>> = inputs.iter().map(|i| preprocessor.transform(i)).collect();
        let labels: Vec<usize> = training
            .rows()
            .iter()
            .map(|row| {
                classes
                    .iter()
                    .position(|c| *c == row.class)
                    .unwrap_or_default()
            })
            .collect();

        let forest = RandomForest::fit(&samples, &labels, classes.len(), config);

        tracing::info!(
            rows = training.len(),
            encoded_width = preprocessor.width(),
            trees = forest.n_trees(),
            classes = ?classes,
            "Compatibility model trained"
        );

        Ok(Self {
            preprocessor,
            forest,
            classes,
            feature_columns: FeatureSchema::get().model_columns(),
            training_rows: training.len(),
            trained_at: Utc::now(),
        })
    }

    /// Class membership probabilities, ordered like [`Self::classes`].
    ///
    /// Fails when the input's columns differ from the ones seen at fit time.
    pub fn predict_proba(&self, input: &ModelInput<'_>) -> AppResult<Vec<f64>> {
        self.check_schema(input)?;
        let encoded = self.preprocessor.transform(input);
        Ok(self.forest.predict_proba(&encoded))
    }

    /// Continuous compatibility score in `0..=100`: `100 × P(high)`.
    ///
    /// Known limitation: when the training data held no high-scoring rows the
    /// score is `100 × P(first class)` instead.
    pub fn predict_score(&self, input: &ModelInput<'_>) -> AppResult<f64> {
        let proba = self.predict_proba(input)?;
        let idx = self.high_index().unwrap_or(0);
        Ok(proba.get(idx).copied().unwrap_or(0.0) * 100.0)
    }

    /// Most probable class
    #[cfg(test)]
    pub fn predict_class(&self, input: &ModelInput<'_>) -> AppResult<CompatibilityClass> {
        let proba = self.predict_proba(input)?;
        let best = proba
            .iter()
            .enumerate()
            .fold(0, |best, (idx, p)| if *p > proba[best] { idx } else { best });
        Ok(self.classes[best])
    }

    fn check_schema(&self, input: &ModelInput<'_>) -> AppResult<()> {
        if self.feature_columns.iter().map(String::as_str).eq(input.columns()) {
            return Ok(());
        }
        Err(AppError::Internal(format!(
            "Feature schema mismatch: model was fit on [{}], input has [{}]",
            self.feature_columns.join(", "),
            input.columns().collect::<Vec<_>>().join(", ")
        )))
    }

    fn high_index(&self) -> Option<usize> {
        self.classes
            .iter()
            .position(|c| *c == CompatibilityClass::High)
    }

    pub fn classes(&self) -> &[CompatibilityClass] {
        &self.classes
    }

    pub fn training_rows(&self) -> usize {
        self.training_rows
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{default_skin_tones, Depth, Product, Undertone};
    use crate::services::features::extract_features;

    fn products() -> Vec<Product> {
        let catalog: [(&str, &[&str], &str); 6] = [
            ("warm-top", &["Peach", "Coral", "Terracotta", "Camel"], "Tops"),
            ("cool-top", &["Navy", "Lavender", "Emerald", "Silver"], "Tops"),
            ("neutral-dress", &["Teal", "Navy", "Burgundy"], "Dresses"),
            ("clash", &["Orange", "Khaki", "Light pastels"], "Pants"),
            ("plain", &[], "Accessories"),
            ("berry", &["Fuchsia", "Purple", "Gold"], "Dresses"),
        ];
        catalog
            .iter()
            .map(|(id, colors, category)| Product {
                id: id.to_string(),
                colors: colors.iter().map(|c| c.to_string()).collect(),
                category: category.to_string(),
                gender: "women".to_string(),
                price: 40.0,
                rating: 4.2,
                review_count: 18,
                ..Product::default()
            })
            .collect()
    }

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_estimators: 30,
            ..ForestConfig::default()
        }
    }

    #[test]
    fn test_fit_records_schema_and_classes() {
        let set = TrainingSet::synthesize(&products(), &default_skin_tones()).unwrap();
        let model = CompatibilityModel::fit(&set, &small_config()).unwrap();

        assert_eq!(model.training_rows(), 54);
        assert_eq!(model.feature_columns, FeatureSchema::get().model_columns());
        let names: Vec<&str> = model.classes().iter().map(|c| c.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(model.classes().contains(&CompatibilityClass::High));
    }

    #[test]
    fn test_scores_are_bounded_and_follow_labels() {
        let products = products();
        let set = TrainingSet::synthesize(&products, &default_skin_tones()).unwrap();
        let model = CompatibilityModel::fit(&set, &ForestConfig::default()).unwrap();

        let cool_top = extract_features(&products[1]).unwrap();
        let clash = extract_features(&products[3]).unwrap();
        let user = |features| ModelInput {
            features,
            undertone: Undertone::Cool,
            depth: Depth::Light,
        };

        let good = model.predict_score(&user(&cool_top)).unwrap();
        let bad = model.predict_score(&user(&clash)).unwrap();
        assert!((0.0..=100.0).contains(&good));
        assert!((0.0..=100.0).contains(&bad));
        assert!(good > bad, "good={} bad={}", good, bad);
        assert_eq!(model.predict_class(&user(&cool_top)).unwrap(), CompatibilityClass::High);
    }

    #[test]
    fn test_unknown_category_is_not_an_error() {
        let set = TrainingSet::synthesize(&products(), &default_skin_tones()).unwrap();
        let model = CompatibilityModel::fit(&set, &small_config()).unwrap();

        let unseen = extract_features(&Product {
            id: "new".to_string(),
            category: "Outerwear".to_string(),
            gender: "men".to_string(),
            colors: vec!["Navy".to_string()],
            ..Product::default()
        })
        .unwrap();
        let score = model.predict_score(&ModelInput {
            features: &unseen,
            undertone: Undertone::Neutral,
            depth: Depth::Deep,
        })
        .unwrap();
        assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn test_fit_is_reproducible() {
        let products = products();
        let set = TrainingSet::synthesize(&products, &default_skin_tones()).unwrap();
        let a = CompatibilityModel::fit(&set, &small_config()).unwrap();
        let b = CompatibilityModel::fit(&set, &small_config()).unwrap();

        for row in set.rows() {
            assert_eq!(a.predict_proba(&row.input()).unwrap(), b.predict_proba(&row.input()).unwrap());
        }
    }

    #[test]
    fn test_without_high_rows_score_uses_first_class() {
        let plain = vec![Product {
            id: "plain".to_string(),
            category: "Pants".to_string(),
            ..Product::default()
        }];
        let set = TrainingSet::synthesize(&plain, &default_skin_tones()).unwrap();
        assert_eq!(set.class_count(CompatibilityClass::High), 0);

        let model = CompatibilityModel::fit(&set, &small_config()).unwrap();
        assert_eq!(model.classes(), &[CompatibilityClass::Medium]);
        // the only class is medium, so the degenerate score is 100
        assert_eq!(model.predict_score(&set.rows()[0].input()).unwrap(), 100.0);
    }

    #[test]
    fn test_schema_mismatch_fails_inference() {
        let set = TrainingSet::synthesize(&products(), &default_skin_tones()).unwrap();
        let mut model = CompatibilityModel::fit(&set, &small_config()).unwrap();
        assert!(model.predict_score(&set.rows()[0].input()).is_ok());

        // a model fit under a different column order
        model.feature_columns.swap(0, 1);
        let result = model.predict_score(&set.rows()[0].input());
        assert!(matches!(result, Err(AppError::Internal(ref msg)) if msg.contains("schema mismatch")));

        model.feature_columns.pop();
        assert!(model.predict_proba(&set.rows()[0].input()).is_err());
    }
}
