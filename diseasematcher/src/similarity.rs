//! Disease-name similarity used to link the two scraped catalogs.
//!
//! Scores are in [0.0, 1.0]:
//! - 1.0 when the normalized names are identical
//! - 0.85 when one normalized name contains the other
//! - otherwise the Dice coefficient over the unique tokens longer than two
//!   characters
//!
//! A relationship row belongs to a disease when the score reaches
//! [`MATCH_THRESHOLD`].

use std::collections::HashSet;

use crate::text::{normalize, significant_tokens};

pub const EXACT_SCORE: f64 = 1.0;
pub const SUBSTRING_SCORE: f64 = 0.85;
pub const MATCH_THRESHOLD: f64 = 0.6;

/// Similarity between two free-text disease names.
///
/// An empty normalized name on either side scores 0.0, otherwise the empty
/// string would count as a substring of everything.
///
/// ```
/// use diseasematcher::similarity::similarity;
///
/// assert_eq!(similarity("Diabetes", "diabetes mellitus"), 0.85);
/// assert_eq!(similarity("Asthma", "asthma"), 1.0);
/// ```
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    normalized_similarity(&a, &b)
}

/// [`similarity`] over names that are already normalized.
#[must_use]
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a == b {
        return EXACT_SCORE;
    }

    if a.contains(b) || b.contains(a) {
        return SUBSTRING_SCORE;
    }

    token_dice(a, b)
}

/// Dice coefficient over unique significant tokens.
///
/// Duplicate tokens inside one name count once.
#[must_use]
pub fn token_dice(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<&str> = significant_tokens(a).collect();
    let tokens_b: HashSet<&str> = significant_tokens(b).collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let common = tokens_a.intersection(&tokens_b).count();
    (2 * common) as f64 / (tokens_a.len() + tokens_b.len()) as f64
}

#[must_use]
pub fn is_match(a: &str, b: &str) -> bool {
    similarity(a, b) >= MATCH_THRESHOLD
}
