//! Batch reconciliation of proposed names against the registry.
//!
//! Rewrites a freshly extracted batch so every name that matches an
//! already-known entity uses that entity's canonical spelling.
//! Unmatched names pass through verbatim and become candidates for
//! new entities when the caller persists the batch.

use tracing::debug;

use crate::matcher::{NameIndex, ReconcilerConfig};
use crate::types::{ExtractedEntity, ExtractionBatch, KnownEntity};

/// Reconciles extracted entity names against known entities.
pub struct Reconciler {
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a new reconciler.
    pub fn new(config: ReconcilerConfig) -> Self {
        Self { config }
    }

    /// Create a reconciler with the default configuration.
    pub fn default_config() -> Self {
        Self::new(ReconcilerConfig::default())
    }

    /// Get the config.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    /// Rewrite a batch so matching names use their canonical forms.
    ///
    /// Entity names and relationship endpoints are resolved
    /// independently against the same static registry; descriptions
    /// and labels are never touched. Endpoints resolve against
    /// persisted knowledge only, never against sibling entities
    /// proposed in the same batch, so a typo'd endpoint either lands
    /// on a known entity or stays a literal new name for the caller
    /// to persist.
    ///
    /// The input is not mutated; a fresh batch is returned. With an
    /// empty registry the input is echoed back unchanged.
    pub fn reconcile(
        &self,
        batch: &ExtractionBatch,
        known_entities: &[KnownEntity],
    ) -> ExtractionBatch {
        if known_entities.is_empty() {
            return batch.clone();
        }

        let index = NameIndex::new(known_entities);
        let threshold = self.config.similarity_threshold;
        let mut rewrites = 0usize;

        let entities = batch
            .entities
            .iter()
            .map(|entity| match canonicalize(&index, threshold, &entity.name) {
                Some(canonical) => {
                    debug!("Normalized entity '{}' -> '{}'", entity.name, canonical);
                    rewrites += 1;
                    ExtractedEntity {
                        name: canonical,
                        description: entity.description.clone(),
                    }
                }
                None => entity.clone(),
            })
            .collect();

        let relationships = batch
            .relationships
            .iter()
            .map(|rel| {
                let mut rel = rel.clone();
                if let Some(canonical) = canonicalize(&index, threshold, &rel.source) {
                    debug!("Normalized relationship source '{}' -> '{}'", rel.source, canonical);
                    rewrites += 1;
                    rel.source = canonical;
                }
                if let Some(canonical) = canonicalize(&index, threshold, &rel.target) {
                    debug!("Normalized relationship target '{}' -> '{}'", rel.target, canonical);
                    rewrites += 1;
                    rel.target = canonical;
                }
                rel
            })
            .collect();

        if rewrites > 0 {
            debug!(
                "Reconciled batch against {} known entities ({} names rewritten)",
                known_entities.len(),
                rewrites
            );
        }

        ExtractionBatch {
            entities,
            relationships,
            answer: batch.answer.clone(),
            is_question: batch.is_question,
        }
    }
}

/// Resolve one proposed name, returning the canonical spelling when a
/// registry match exists and differs from the proposed form.
fn canonicalize(index: &NameIndex<'_>, threshold: f32, name: &str) -> Option<String> {
    let canonical = index.resolve(name, threshold)?;
    if canonical == name {
        return None;
    }
    Some(canonical.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExtractedRelationship;

    fn known(entries: &[&str]) -> Vec<KnownEntity> {
        entries
            .iter()
            .map(|n| KnownEntity::new(*n).with_description("persisted"))
            .collect()
    }

    #[test]
    fn test_rewrites_fuzzy_relationship_target() {
        let batch = ExtractionBatch {
            entities: vec![ExtractedEntity::new("King Eldor")],
            relationships: vec![ExtractedRelationship::new(
                "King Eldor",
                "Draco Arrion",
                "brother of",
            )],
            ..Default::default()
        };
        let registry = known(&["King Eldor", "Draco Arion"]);

        let result = Reconciler::default_config().reconcile(&batch, &registry);

        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].name, "King Eldor");
        assert_eq!(result.relationships.len(), 1);
        assert_eq!(result.relationships[0].source, "King Eldor");
        assert_eq!(result.relationships[0].target, "Draco Arion");
        assert_eq!(result.relationships[0].label, "brother of");
    }

    #[test]
    fn test_empty_registry_echoes_batch() {
        let batch = ExtractionBatch {
            entities: vec![ExtractedEntity::new("Lorron Gasku")],
            relationships: vec![ExtractedRelationship::new(
                "Lorron Gasku",
                "Captain Aris Vorn",
                "killer of",
            )],
            ..Default::default()
        };

        let result = Reconciler::default_config().reconcile(&batch, &[]);
        assert_eq!(result, batch);
    }

    #[test]
    fn test_unmatched_names_pass_through() {
        let batch = ExtractionBatch {
            entities: vec![ExtractedEntity::new("Battle of Eldoria")],
            ..Default::default()
        };
        let registry = known(&["King Eldor"]);

        let result = Reconciler::default_config().reconcile(&batch, &registry);
        assert_eq!(result.entities[0].name, "Battle of Eldoria");
    }

    #[test]
    fn test_descriptions_never_merged() {
        let batch = ExtractionBatch {
            entities: vec![ExtractedEntity::new("king eldor").with_description("Rules Eldoria.")],
            ..Default::default()
        };
        let registry = known(&["King Eldor"]);

        let result = Reconciler::default_config().reconcile(&batch, &registry);
        assert_eq!(result.entities[0].name, "King Eldor");
        assert_eq!(result.entities[0].description, "Rules Eldoria.");
    }

    #[test]
    fn test_endpoints_resolve_against_registry_not_siblings() {
        // "Mira Voss" is proposed in the same batch but absent from the
        // registry; the endpoint's typo must not be matched to the
        // sibling, it passes through as written.
        let batch = ExtractionBatch {
            entities: vec![ExtractedEntity::new("Mira Voss")],
            relationships: vec![ExtractedRelationship::new(
                "King Eldor",
                "Mira Vosss",
                "advisor of",
            )],
            ..Default::default()
        };
        let registry = known(&["King Eldor"]);

        let result = Reconciler::default_config().reconcile(&batch, &registry);
        assert_eq!(result.entities[0].name, "Mira Voss");
        assert_eq!(result.relationships[0].target, "Mira Vosss");
    }

    #[test]
    fn test_consistent_substitution() {
        let batch = ExtractionBatch {
            entities: vec![ExtractedEntity::new("draco arion")],
            relationships: vec![ExtractedRelationship::new(
                "King Eldor",
                "Draco Arionn",
                "brother of",
            )],
            ..Default::default()
        };
        let registry = known(&["King Eldor", "Draco Arion"]);

        let result = Reconciler::default_config().reconcile(&batch, &registry);
        assert_eq!(result.entities[0].name, result.relationships[0].target);
        assert_eq!(result.entities[0].name, "Draco Arion");
    }

    #[test]
    fn test_idempotent_over_own_output() {
        let batch = ExtractionBatch {
            entities: vec![
                ExtractedEntity::new("king eldor"),
                ExtractedEntity::new("Draco Arrion"),
            ],
            relationships: vec![ExtractedRelationship::new(
                "king eldor",
                "Draco Arrion",
                "brother of",
            )],
            ..Default::default()
        };
        let registry = known(&["King Eldor", "Draco Arion"]);

        let reconciler = Reconciler::default_config();
        let once = reconciler.reconcile(&batch, &registry);
        let twice = reconciler.reconcile(&once, &registry);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_never_fabricates_names() {
        let batch = ExtractionBatch {
            entities: vec![
                ExtractedEntity::new("Lorron Gasku"),
                ExtractedEntity::new("captain aris vorn"),
                ExtractedEntity::new("Battle of Eldoria"),
            ],
            relationships: vec![
                ExtractedRelationship::new("Lorron Gasku", "Captain Aris Vorn", "killer of"),
                ExtractedRelationship::new("Lorron Gasku", "Eldorria", "enemy of"),
            ],
            ..Default::default()
        };
        let registry = known(&["Captain Aris Vorn", "Eldoria"]);

        let result = Reconciler::default_config().reconcile(&batch, &registry);

        let mut allowed: Vec<&str> = Vec::new();
        allowed.extend(batch.entities.iter().map(|e| e.name.as_str()));
        allowed.extend(
            batch
                .relationships
                .iter()
                .flat_map(|r| [r.source.as_str(), r.target.as_str()]),
        );
        allowed.extend(registry.iter().map(|e| e.name.as_str()));

        for name in result
            .entities
            .iter()
            .map(|e| e.name.as_str())
            .chain(result.relationships.iter().flat_map(|r| [r.source.as_str(), r.target.as_str()]))
        {
            assert!(allowed.contains(&name), "fabricated name {:?}", name);
        }
    }

    #[test]
    fn test_answer_fields_pass_through() {
        let batch = ExtractionBatch {
            entities: vec![],
            relationships: vec![],
            answer: Some("King Eldor rules Eldoria.".to_string()),
            is_question: true,
        };
        let registry = known(&["King Eldor"]);

        let result = Reconciler::default_config().reconcile(&batch, &registry);
        assert_eq!(result.answer.as_deref(), Some("King Eldor rules Eldoria."));
        assert!(result.is_question);
    }

    #[test]
    fn test_custom_threshold() {
        // At threshold 1.0 only exact (case-insensitive) hits rewrite.
        let batch = ExtractionBatch {
            entities: vec![
                ExtractedEntity::new("draco arion"),
                ExtractedEntity::new("Draco Arrion"),
            ],
            ..Default::default()
        };
        let registry = known(&["Draco Arion"]);

        let strict = Reconciler::new(ReconcilerConfig::with_threshold(1.0));
        let result = strict.reconcile(&batch, &registry);
        assert_eq!(result.entities[0].name, "Draco Arion");
        assert_eq!(result.entities[1].name, "Draco Arrion");
    }
}
