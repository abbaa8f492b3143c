use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A clothing product as received from the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    /// Unique identifier within a batch
    pub id: String,
    pub name: String,
    pub description: String,
    /// Price, must be finite and non-negative
    pub price: f64,
    pub currency: String,
    /// Free-text color names in display order
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    /// Free-text category label (e.g. "Tops")
    pub category: String,
    pub retailer: String,
    /// Free-text gender label (e.g. "unisex")
    pub gender: String,
    pub rating: f64,
    pub review_count: u32,
}

impl Product {
    /// Checks that the record can be turned into a feature vector.
    ///
    /// A single malformed product fails the whole batch, so callers never
    /// receive a ranking with a silently missing item.
    pub fn validate(&self) -> AppResult<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Product '{}' is missing an id",
                self.name
            )));
        }

        self.validate_values()
    }

    /// Numeric checks only; a standalone product does not need an id.
    pub fn validate_values(&self) -> AppResult<()> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::InvalidInput(format!(
                "Product {} has an invalid price: {}",
                self.id, self.price
            )));
        }

        if !self.rating.is_finite() {
            return Err(AppError::InvalidInput(format!(
                "Product {} has an invalid rating: {}",
                self.id, self.rating
            )));
        }

        Ok(())
    }
}

/// Built-in catalog used when the engine has to train without client data
pub fn sample_products() -> Vec<Product> {
    vec![Product {
        id: "1".to_string(),
        name: "Classic Cotton T-shirt".to_string(),
        description: "A comfortable cotton t-shirt for everyday wear. Perfect for casual outings and relaxed settings.".to_string(),
        price: 19.99,
        currency: "USD".to_string(),
        colors: ["White", "Black", "Navy", "Red", "Olive Green"]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        sizes: ["S", "M", "L", "XL"].iter().map(|s| s.to_string()).collect(),
        category: "Tops".to_string(),
        retailer: "Amazon".to_string(),
        gender: "unisex".to_string(),
        rating: 4.5,
        review_count: 120,
    }]
}
