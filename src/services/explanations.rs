//! Recommendation reasons.
//!
//! A configured [`TextGenerator`] is tried first under a timeout; any error,
//! timeout or empty answer falls back to a deterministic template so callers
//! always get a reason.

use std::{sync::Arc, time::Duration};

use crate::{
    models::Undertone,
    services::providers::{ReasonContext, TextGenerator},
};

#[derive(Clone)]
pub struct Explainer {
    generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl Explainer {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Template-only explainer
    pub fn fallback_only() -> Self {
        Self::new(None, Duration::ZERO)
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    pub async fn explain(&self, context: &ReasonContext) -> String {
        let Some(generator) = &self.generator else {
            return fallback_reason(context);
        };

        match tokio::time::timeout(self.timeout, generator.explain(context)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(Ok(_)) => {
                tracing::warn!(provider = generator.name(), "Empty explanation, using template");
                fallback_reason(context)
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    provider = generator.name(),
                    error = %e,
                    "Explanation failed, using template"
                );
                fallback_reason(context)
            }
            Err(_) => {
                tracing::warn!(
                    provider = generator.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Explanation timed out, using template"
                );
                fallback_reason(context)
            }
        }
    }

    /// Explains every context concurrently; output order matches input order.
    pub async fn explain_all(&self, contexts: Vec<ReasonContext>) -> Vec<String> {
        if self.generator.is_none() {
            return contexts.iter().map(fallback_reason).collect();
        }

        let handles: Vec<_> = contexts
            .iter()
            .cloned()
            .map(|context| {
                let explainer = self.clone();
                tokio::spawn(async move { explainer.explain(&context).await })
            })
            .collect();

        let mut reasons = Vec::with_capacity(handles.len());
        for (handle, context) in handles.into_iter().zip(contexts.iter()) {
            match handle.await {
                Ok(reason) => reasons.push(reason),
                Err(e) => {
                    tracing::error!(error = %e, "Explanation task failed");
                    reasons.push(fallback_reason(context));
                }
            }
        }
        reasons
    }
}

fn category_noun(category: &str) -> String {
    if category.trim().is_empty() {
        "item".to_string()
    } else {
        category.to_lowercase()
    }
}

/// Deterministic reason for a ranked item, banded on the reported score
pub fn fallback_reason(context: &ReasonContext) -> String {
    let category = category_noun(&context.category);

    match context.score {
        80.. => format!(
            "This {} perfectly complements your {} {} skin tone.",
            category, context.undertone, context.depth
        ),
        60..=79 => format!(
            "This {} works well with your {} {} skin tone.",
            category, context.undertone, context.depth
        ),
        40..=59 => format!("This {} is compatible with your skin tone.", category),
        _ => format!("This {} has neutral compatibility with your skin tone.", category),
    }
}

/// Reason reported by the direct compatibility check
pub fn compatibility_reason(score: u32, category: &str, undertone: Option<Undertone>) -> String {
    let category = category_noun(category);
    let tone = match undertone {
        Some(undertone) => format!("your {} skin tone", undertone),
        None => "your skin tone".to_string(),
    };

    if score >= 80 {
        format!("This {} perfectly complements {}.", category, tone)
    } else if score >= 50 {
        format!("This {} works reasonably well with {}.", category, tone)
    } else {
        format!("This {} may not be the most flattering for {}.", category, tone)
    }
}
