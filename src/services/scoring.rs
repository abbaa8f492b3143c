//! Rule-based compatibility scoring.
//!
//! Scores start from a neutral 50 and move by fixed additive steps; the
//! result is always clamped to `0..=100`.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    models::{SkinToneProfile, Undertone},
    services::color_lexicon,
};

pub const NEUTRAL_SCORE: i32 = 50;
const MATCH_BONUS: i32 = 10;
const NEUTRAL_BONUS: i32 = 5;
const CLASH_PENALTY: i32 = 5;
const PROFILE_MATCH: i32 = 10;
const PROFILE_MISMATCH: i32 = 10;
const CATEGORY_BONUS: i32 = 5;

/// Garment types that sit close to the face and dominate an outfit
const PROMINENT_CATEGORIES: [&str; 2] = ["Tops", "Dresses"];

const HIGH_THRESHOLD: i32 = 70;
const MEDIUM_THRESHOLD: i32 = 40;

/// Discretized training label
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityClass {
    Low,
    Medium,
    High,
}

impl CompatibilityClass {
    pub fn from_score(score: u32) -> Self {
        let score = score as i32;
        if score >= HIGH_THRESHOLD {
            CompatibilityClass::High
        } else if score >= MEDIUM_THRESHOLD {
            CompatibilityClass::Medium
        } else {
            CompatibilityClass::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityClass::Low => "low",
            CompatibilityClass::Medium => "medium",
            CompatibilityClass::High => "high",
        }
    }
}

impl Display for CompatibilityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn clamp(score: i32) -> u32 {
    score.clamp(0, 100) as u32
}

fn category_bonus(category: &str) -> i32 {
    if PROMINENT_CATEGORIES.contains(&category) {
        CATEGORY_BONUS
    } else {
        0
    }
}

/// Color-theory score of a color list against a single undertone, without
/// the category adjustment.
pub fn color_compatibility(colors: &[String], undertone: Option<Undertone>) -> u32 {
    let Some(undertone) = undertone else {
        return NEUTRAL_SCORE as u32;
    };
    if colors.is_empty() {
        return NEUTRAL_SCORE as u32;
    }

    let score = colors.iter().fold(NEUTRAL_SCORE, |score, color| {
        let tone = color_lexicon::tone_of(color);
        if tone == undertone {
            score + MATCH_BONUS
        } else if tone == Undertone::Neutral || undertone == Undertone::Neutral {
            score + NEUTRAL_BONUS
        } else {
            score - CLASH_PENALTY
        }
    });

    clamp(score)
}

/// Simple scorer: color theory against one undertone plus the category bonus.
pub fn simple_score(colors: &[String], undertone: Option<Undertone>, category: &str) -> u32 {
    let base = color_compatibility(colors, undertone) as i32;
    clamp(base + category_bonus(category))
}

/// Labeled scorer used to synthesize training data.
///
/// Each color gains once if it overlaps any recommended phrase and loses once
/// if it overlaps any discouraged phrase; overlap is case-insensitive
/// containment in either direction.
pub fn profile_score(colors: &[String], category: &str, profile: &SkinToneProfile) -> u32 {
    let recommended: Vec<String> = profile
        .recommended_colors
        .iter()
        .map(|c| c.to_lowercase())
        .collect();
    let discouraged: Vec<String> = profile
        .not_recommended_colors
        .iter()
        .map(|c| c.to_lowercase())
        .collect();

    let overlaps = |color: &str, phrase: &str| phrase.contains(color) || color.contains(phrase);

    let mut score = NEUTRAL_SCORE;
    for color in colors {
        let color = color.to_lowercase();
        if recommended.iter().any(|phrase| overlaps(&color, phrase)) {
            score += PROFILE_MATCH;
        }
        if discouraged.iter().any(|phrase| overlaps(&color, phrase)) {
            score -= PROFILE_MISMATCH;
        }
    }

    clamp(score + category_bonus(category))
}
