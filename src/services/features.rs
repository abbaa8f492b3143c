//! Feature engineering for products.
//!
//! Every product is turned into the same fixed layout: two categorical fields
//! and a numeric block whose column order is decided once by [`FeatureSchema`].

use std::sync::OnceLock;

use crate::{
    error::AppResult,
    models::{Product, Undertone},
    services::color_lexicon::{self, COLOR_FAMILIES, FAMILY_COUNT},
};

pub const PRICE: usize = 0;
pub const RATING: usize = 1;
pub const REVIEW_COUNT: usize = 2;
pub const NUM_COLORS: usize = 3;
/// First `color_family_*` column
pub const FAMILY_OFFSET: usize = 4;
/// First `color_tone_*` column
pub const TONE_OFFSET: usize = FAMILY_OFFSET + FAMILY_COUNT;
/// Width of the numeric block
pub const NUMERIC_FEATURE_COUNT: usize = TONE_OFFSET + Undertone::ALL.len();

/// Categorical columns carried by a product
pub const PRODUCT_CATEGORICAL: [&str; 2] = ["category", "gender"];
/// Categorical columns contributed by the user at training/inference time
pub const USER_CATEGORICAL: [&str; 2] = ["undertone", "depth"];

/// Ordered column names of the numeric block
#[derive(Debug)]
pub struct FeatureSchema {
    numeric: Vec<String>,
}

impl FeatureSchema {
    /// The process-wide schema, derived from the color lexicon
    pub fn get() -> &'static FeatureSchema {
        static SCHEMA: OnceLock<FeatureSchema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let mut numeric = vec![
                "price".to_string(),
                "rating".to_string(),
                "review_count".to_string(),
                "num_colors".to_string(),
            ];
            numeric.extend(
                COLOR_FAMILIES
                    .iter()
                    .map(|(family, _)| format!("color_family_{}", family)),
            );
            numeric.extend(
                Undertone::ALL
                    .iter()
                    .map(|tone| format!("color_tone_{}", tone)),
            );
            debug_assert_eq!(numeric.len(), NUMERIC_FEATURE_COUNT);

            FeatureSchema { numeric }
        })
    }

    pub fn numeric_names(&self) -> &[String] {
        &self.numeric
    }

    /// Raw input columns expected by the classifier, in fit order
    pub fn model_columns(&self) -> Vec<String> {
        PRODUCT_CATEGORICAL
            .iter()
            .map(|c| c.to_string())
            .chain(self.numeric.iter().cloned())
            .chain(USER_CATEGORICAL.iter().map(|c| c.to_string()))
            .collect()
    }

    fn numeric_index(&self, name: &str) -> Option<usize> {
        self.numeric.iter().position(|n| n == name)
    }
}

/// Features extracted from a single product
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub product_id: String,
    pub category: String,
    pub gender: String,
    pub numeric: [f64; NUMERIC_FEATURE_COUNT],
}

impl FeatureVector {
    /// Looks up a numeric feature by schema name
    pub fn get(&self, name: &str) -> Option<f64> {
        FeatureSchema::get()
            .numeric_index(name)
            .map(|idx| self.numeric[idx])
    }

    /// Column names carried by this vector, categorical fields first
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        PRODUCT_CATEGORICAL.iter().copied().chain(
            FeatureSchema::get()
                .numeric_names()
                .iter()
                .map(String::as_str),
        )
    }
}

/// Extracts the feature vector of one product.
///
/// Fails when the product is malformed; see [`Product::validate`].
pub fn extract_features(product: &Product) -> AppResult<FeatureVector> {
    product.validate()?;

    let mut numeric = [0.0; NUMERIC_FEATURE_COUNT];
    numeric[PRICE] = product.price;
    numeric[RATING] = product.rating;
    numeric[REVIEW_COUNT] = product.review_count as f64;

    let num_colors = product.colors.len();
    numeric[NUM_COLORS] = num_colors as f64;

    if num_colors > 0 {
        let mut family_counts = [0usize; FAMILY_COUNT];
        let mut tone_counts = [0usize; Undertone::ALL.len()];

        for color in &product.colors {
            if let Some(idx) = color_lexicon::family_index(color) {
                family_counts[idx] += 1;
            }
            let tone = color_lexicon::tone_of(color);
            if let Some(idx) = Undertone::ALL.iter().position(|t| *t == tone) {
                tone_counts[idx] += 1;
            }
        }

        let total = num_colors as f64;
        for (idx, count) in family_counts.iter().enumerate() {
            numeric[FAMILY_OFFSET + idx] = *count as f64 / total;
        }
        for (idx, count) in tone_counts.iter().enumerate() {
            numeric[TONE_OFFSET + idx] = *count as f64 / total;
        }
    }

    Ok(FeatureVector {
        product_id: product.id.clone(),
        category: product.category.clone(),
        gender: product.gender.clone(),
        numeric,
    })
}

/// Feature vectors for a batch of products, in input order
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    rows: Vec<FeatureVector>,
}

impl FeatureTable {
    /// Builds the table, failing the whole batch on the first malformed product
    pub fn from_products(products: &[Product]) -> AppResult<Self> {
        let rows = products
            .iter()
            .map(extract_features)
            .collect::<AppResult<Vec<_>>>()?;

        tracing::debug!(products = rows.len(), "Feature table built");

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn product(id: &str, colors: &[&str], category: &str) -> Product {
        Product {
            id: id.to_string(),
            colors: colors.iter().map(|c| c.to_string()).collect(),
            category: category.to_string(),
            gender: "unisex".to_string(),
            price: 25.0,
            rating: 4.0,
            review_count: 10,
            ..Product::default()
        }
    }

    #[test]
    fn test_schema_layout() {
        let schema = FeatureSchema::get();
        let names = schema.numeric_names();
        assert_eq!(names.len(), NUMERIC_FEATURE_COUNT);
        assert_eq!(names[PRICE], "price");
        assert_eq!(names[NUM_COLORS], "num_colors");
        assert_eq!(names[FAMILY_OFFSET], "color_family_red");
        assert_eq!(names[TONE_OFFSET - 1], "color_family_neutral");
        assert_eq!(names[TONE_OFFSET], "color_tone_warm");
        assert_eq!(names[NUMERIC_FEATURE_COUNT - 1], "color_tone_neutral");

        let columns = schema.model_columns();
        assert_eq!(columns.first().map(String::as_str), Some("category"));
        assert_eq!(columns.last().map(String::as_str), Some("depth"));
        assert_eq!(columns.len(), NUMERIC_FEATURE_COUNT + 4);
    }

    #[test]
    fn test_color_fractions() {
        let features = extract_features(&product("p1", &["Navy", "Red", "Sky Blue", "Heather"], "Tops")).unwrap();

        assert_eq!(features.get("num_colors"), Some(4.0));
        assert_eq!(features.get("color_family_blue"), Some(0.5));
        assert_eq!(features.get("color_family_red"), Some(0.25));
        assert_eq!(features.get("color_family_green"), Some(0.0));
        // Navy, Sky Blue cool; Red warm; Heather unknown -> neutral
        assert_eq!(features.get("color_tone_cool"), Some(0.5));
        assert_eq!(features.get("color_tone_warm"), Some(0.25));
        assert_eq!(features.get("color_tone_neutral"), Some(0.25));
        assert_eq!(features.get("price"), Some(25.0));
        assert_eq!(features.get("review_count"), Some(10.0));
        assert_eq!(features.category, "Tops");
    }

    #[test]
    fn test_empty_colors_yield_zero_fractions() {
        let features = extract_features(&product("p1", &[], "Tops")).unwrap();
        assert_eq!(features.get("num_colors"), Some(0.0));
        assert!(features.numeric[FAMILY_OFFSET..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_schema_is_identical_across_products() {
        let a = extract_features(&product("a", &["Navy"], "Tops")).unwrap();
        let b = extract_features(&product("b", &[], "Shoes")).unwrap();
        let c = extract_features(&product("c", &["Chartreuse", "Rust", "Ivory"], "")).unwrap();
        assert!(a.names().eq(b.names()));
        assert!(b.names().eq(c.names()));
        assert_eq!(a.names().count(), NUMERIC_FEATURE_COUNT + PRODUCT_CATEGORICAL.len());
        assert_eq!(a.numeric.len(), c.numeric.len());
    }

    #[test]
    fn test_table_fails_whole_batch_on_malformed_product() {
        let mut bad = product("bad", &["Red"], "Tops");
        bad.price = f64::NAN;
        let products = vec![product("ok", &["Navy"], "Tops"), bad];

        let result = FeatureTable::from_products(&products);
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_table_preserves_input_order() {
        let products = vec![product("x", &[], ""), product("y", &[], ""), product("z", &[], "")];
        let table = FeatureTable::from_products(&products).unwrap();
        let ids: Vec<&str> = table.rows().iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }
}
