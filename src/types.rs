//! Extraction batch and registry data model.
//!
//! These are the types shared between the extraction step, the
//! reconciler, and the caller's graph store: entities and
//! relationships as the model proposed them, and the registry of
//! entities the caller has already persisted.

use serde::{Deserialize, Serialize};

/// An entity proposed by the extraction step.
///
/// The name is free-form text as it appeared in the source and may be
/// misspelled or cased differently than an already-known entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    /// The entity name as written.
    pub name: String,
    /// Facts stated about the entity; empty when none were given.
    #[serde(default)]
    pub description: String,
}

impl ExtractedEntity {
    /// Create a new extracted entity with an empty description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    /// Add a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A relationship proposed by the extraction step.
///
/// `source` and `target` are entity names as written, not ids. The
/// label is a free-text predicate phrase ("killer of", "brother of").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRelationship {
    /// Source entity name.
    pub source: String,
    /// Target entity name.
    pub target: String,
    /// Free-text predicate phrase.
    #[serde(default)]
    pub label: String,
}

impl ExtractedRelationship {
    /// Create a new extracted relationship.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: label.into(),
        }
    }
}

/// An entity already persisted in the caller's graph store.
///
/// The registry is supplied fresh on every reconciliation call; this
/// crate never adds, removes, or reorders entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownEntity {
    /// Canonical entity name.
    pub name: String,
    /// Persisted description.
    #[serde(default)]
    pub description: String,
}

impl KnownEntity {
    /// Create a new known entity with an empty description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    /// Add a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Output of one extraction call.
///
/// When the input was a question rather than new world information,
/// the model answers through `answer`/`is_question` instead of (or in
/// addition to) proposing entities; reconciliation carries both fields
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionBatch {
    /// Proposed entities.
    #[serde(default)]
    pub entities: Vec<ExtractedEntity>,
    /// Proposed relationships.
    #[serde(default)]
    pub relationships: Vec<ExtractedRelationship>,
    /// Direct answer text, when the input was a question.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Whether the model treated the input as a question.
    #[serde(default, rename = "isQuestion")]
    pub is_question: bool,
}

impl ExtractionBatch {
    /// Check if the batch proposes nothing.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }

    /// Get entity count.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Get relationship count.
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }
}
