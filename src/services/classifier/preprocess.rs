//! Column preprocessing: numeric standardization and one-hot encoding.

use crate::{
    models::{Depth, Undertone},
    services::features::{FeatureVector, NUMERIC_FEATURE_COUNT, USER_CATEGORICAL},
};

/// Number of categorical columns seen by the model
pub const CATEGORICAL_COLUMNS: usize = 4;

/// One row of classifier input: product features merged with a skin tone
#[derive(Debug, Clone, Copy)]
pub struct ModelInput<'a> {
    pub features: &'a FeatureVector,
    pub undertone: Undertone,
    pub depth: Depth,
}

impl<'a> ModelInput<'a> {
    /// `category, gender, undertone, depth`
    pub fn categorical(&self) -> [&'a str; CATEGORICAL_COLUMNS] {
        [
            self.features.category.as_str(),
            self.features.gender.as_str(),
            self.undertone.as_str(),
            self.depth.as_str(),
        ]
    }

    pub fn numeric(&self) -> &'a [f64; NUMERIC_FEATURE_COUNT] {
        &self.features.numeric
    }

    /// Raw column names of this row: product columns, then user columns
    pub fn columns(&self) -> impl Iterator<Item = &'static str> {
        self.features.names().chain(USER_CATEGORICAL.iter().copied())
    }
}

/// Zero-mean, unit-variance scaling fit on training data only
#[derive(Debug, Clone)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    pub fn fit<'a>(rows: impl Iterator<Item = &'a [f64; NUMERIC_FEATURE_COUNT]>) -> Self {
        let mut sums = vec![0.0; NUMERIC_FEATURE_COUNT];
        let mut sums_sq = vec![0.0; NUMERIC_FEATURE_COUNT];
        let mut count = 0usize;

        for row in rows {
            for (idx, value) in row.iter().enumerate() {
                sums[idx] += value;
                sums_sq[idx] += value * value;
            }
            count += 1;
        }

        let n = count.max(1) as f64;
        let means: Vec<f64> = sums.iter().map(|s| s / n).collect();
        let scales = sums_sq
            .iter()
            .zip(means.iter())
            .map(|(sq, mean)| {
                let variance = (sq / n - mean * mean).max(0.0);
                let std = variance.sqrt();
                // constant columns pass through centered
                if std > f64::EPSILON {
                    std
                } else {
                    1.0
                }
            })
            .collect();

        Self { means, scales }
    }

    pub fn transform_into(&self, values: &[f64], out: &mut Vec<f64>) {
        out.extend(
            values
                .iter()
                .zip(self.means.iter().zip(self.scales.iter()))
                .map(|(value, (mean, scale))| (value - mean) / scale),
        );
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }
}

/// One-hot encoding with sorted categories; unseen values encode as zeros
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit<'a>(rows: impl Iterator<Item = [&'a str; CATEGORICAL_COLUMNS]>) -> Self {
        let mut categories: Vec<Vec<String>> = vec![Vec::new(); CATEGORICAL_COLUMNS];

        for row in rows {
            for (column, value) in categories.iter_mut().zip(row.iter()) {
                if let Err(pos) = column.binary_search_by(|c| c.as_str().cmp(value)) {
                    column.insert(pos, value.to_string());
                }
            }
        }

        Self { categories }
    }

    pub fn transform_into(&self, row: &[&str; CATEGORICAL_COLUMNS], out: &mut Vec<f64>) {
        for (column, value) in self.categories.iter().zip(row.iter()) {
            out.extend(
                column
                    .iter()
                    .map(|category| if category == value { 1.0 } else { 0.0 }),
            );
        }
    }

    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    #[cfg(test)]
    pub fn categories(&self, column: usize) -> &[String] {
        &self.categories[column]
    }
}

/// Scaled numeric block followed by the one-hot blocks
#[derive(Debug, Clone)]
pub struct Preprocessor {
    scaler: StandardScaler,
    encoder: OneHotEncoder,
}

impl Preprocessor {
    pub fn fit(inputs: &[ModelInput<'_>]) -> Self {
        Self {
            scaler: StandardScaler::fit(inputs.iter().map(|input| input.numeric())),
            encoder: OneHotEncoder::fit(inputs.iter().map(|input| input.categorical())),
        }
    }

    pub fn transform(&self, input: &ModelInput<'_>) -> Vec<f64> {
        let mut encoded = Vec::with_capacity(self.width());
        self.scaler.transform_into(input.numeric(), &mut encoded);
        self.encoder.transform_into(&input.categorical(), &mut encoded);
        encoded
    }

    pub fn width(&self) -> usize {
        self.scaler.width() + self.encoder.width()
    }
}
