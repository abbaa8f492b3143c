pub mod classifier;
pub mod color_lexicon;
pub mod explanations;
pub mod features;
pub mod providers;
pub mod ranking;
pub mod scoring;
pub mod training;

pub use explanations::Explainer;
pub use ranking::RecommendationEngine;
