//! Best-match selection against the known-entity registry.
//!
//! A proposed name matches at most one known entity: the single
//! highest-scoring candidate at or above the threshold, with ties
//! broken by registry order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::similarity::string_similarity;
use crate::types::KnownEntity;

/// Default similarity threshold for name matching.
///
/// Permissive enough to catch minor misspellings ("Draco Arion" vs
/// "Draco Arrion") while avoiding false merges between genuinely
/// different short names.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;

/// Configuration for name reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Similarity threshold for matching (0.0 - 1.0).
    /// Proposed names scoring below this are treated as new entities.
    /// Default: 0.7
    pub similarity_threshold: f32,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl ReconcilerConfig {
    /// Create a config with a custom threshold, clamped to [0, 1].
    pub fn with_threshold(threshold: f32) -> Self {
        Self {
            similarity_threshold: threshold.clamp(0.0, 1.0),
        }
    }
}

/// Find the best-matching known entity for a proposed name.
///
/// Scores every candidate and keeps the maximum at or above
/// `threshold`. The running best is replaced only on a strictly
/// greater score, so the first of equal-scoring candidates wins.
/// Returns the canonical name, or `None` when nothing reaches the
/// threshold (always the case for an empty registry).
pub fn find_best_match<'a>(
    query: &str,
    known_entities: &'a [KnownEntity],
    threshold: f32,
) -> Option<&'a str> {
    let mut best: Option<(&str, f32)> = None;

    for entity in known_entities {
        let score = string_similarity(query, &entity.name);
        if score >= threshold && best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((&entity.name, score));
        }
    }

    best.map(|(name, _)| name)
}

/// Registry index with an exact-match fast path.
///
/// Exact (case-insensitive) hits resolve through a hash lookup before
/// falling back to the full fuzzy scan. An exact hit scores 1.0 and
/// cannot be beaten under the strict-greater tie-break, and the map
/// keeps the first occurrence of duplicate lower-cased names, so
/// resolution is identical to [`find_best_match`].
pub struct NameIndex<'a> {
    known_entities: &'a [KnownEntity],
    by_lowercase_name: HashMap<String, &'a str>,
}

impl<'a> NameIndex<'a> {
    /// Build an index over the registry.
    pub fn new(known_entities: &'a [KnownEntity]) -> Self {
        let mut by_lowercase_name = HashMap::with_capacity(known_entities.len());
        for entity in known_entities {
            by_lowercase_name
                .entry(entity.name.to_lowercase())
                .or_insert(entity.name.as_str());
        }

        Self {
            known_entities,
            by_lowercase_name,
        }
    }

    /// Resolve a proposed name to its canonical form, if any.
    pub fn resolve(&self, query: &str, threshold: f32) -> Option<&'a str> {
        if threshold <= 1.0 {
            if let Some(name) = self.by_lowercase_name.get(&query.to_lowercase()) {
                return Some(name);
            }
        }

        find_best_match(query, self.known_entities, threshold)
    }
}
