//! mythos - Entity-name reconciliation for LLM-extracted knowledge graphs.
//!
//! When a language model extracts entities and relationships from free
//! text, the same real-world entity shows up under slightly different
//! spellings and casings across calls ("Draco Arion" vs "Draco
//! Arrion"). This crate decides, for each proposed name, whether it
//! refers to an entity the caller already knows, and rewrites the
//! batch to the canonical names so the caller's upsert finds a single
//! node per entity. Unmatched names pass through verbatim and become
//! new entities.
//!
//! Matching is plain Levenshtein similarity with a threshold (default
//! 0.7); everything is a pure, synchronous transformation with no
//! internal state, so concurrent callers need no coordination.
//!
//! # Example
//!
//! ```
//! use mythos::{ExtractedRelationship, ExtractionBatch, KnownEntity, Reconciler};
//!
//! let batch = ExtractionBatch {
//!     relationships: vec![ExtractedRelationship::new(
//!         "King Eldor",
//!         "Draco Arrion",
//!         "brother of",
//!     )],
//!     ..Default::default()
//! };
//! let known = vec![
//!     KnownEntity::new("King Eldor"),
//!     KnownEntity::new("Draco Arion"),
//! ];
//!
//! let reconciler = Reconciler::default_config();
//! let normalized = reconciler.reconcile(&batch, &known);
//! assert_eq!(normalized.relationships[0].target, "Draco Arion");
//! ```

pub mod error;
pub mod matcher;
pub mod parse;
pub mod reconcile;
pub mod similarity;
pub mod types;

// Re-export commonly used types
pub use error::{MythosError, MythosResult};
pub use matcher::{find_best_match, NameIndex, ReconcilerConfig, DEFAULT_SIMILARITY_THRESHOLD};
pub use parse::{parse_extraction, sanitize_registry};
pub use reconcile::Reconciler;
pub use similarity::{levenshtein, string_similarity};
pub use types::{ExtractedEntity, ExtractedRelationship, ExtractionBatch, KnownEntity};
