//! Parsing of extraction responses into typed batches.
//!
//! The extraction model replies with JSON, sometimes wrapped in a
//! markdown code fence and sometimes mildly malformed. Parsing strips
//! the fence, retries with common fixes, and drops entries that lack
//! a usable name rather than failing the whole batch.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{MythosError, MythosResult};
use crate::types::{ExtractedEntity, ExtractedRelationship, ExtractionBatch, KnownEntity};

/// Fallback label for relationships the model left unlabeled.
const DEFAULT_RELATIONSHIP_LABEL: &str = "related to";

/// Raw JSON structures for response parsing.
/// These allow flexible parsing before converting to typed structs.
mod raw {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct RawEntity {
        pub name: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct RawRelationship {
        pub source: Option<String>,
        #[serde(alias = "from")]
        pub _source_alt: Option<String>,
        pub target: Option<String>,
        #[serde(alias = "to")]
        pub _target_alt: Option<String>,
        #[serde(alias = "relation", alias = "type")]
        pub label: Option<String>,
    }

    impl RawRelationship {
        pub fn source(&self) -> Option<&str> {
            self.source.as_deref().or(self._source_alt.as_deref())
        }

        pub fn target(&self) -> Option<&str> {
            self.target.as_deref().or(self._target_alt.as_deref())
        }
    }

    #[derive(Debug, Deserialize)]
    pub struct RawExtraction {
        #[serde(default)]
        pub entities: Vec<RawEntity>,
        #[serde(default)]
        pub relationships: Vec<RawRelationship>,
        pub answer: Option<String>,
        #[serde(default, alias = "isQuestion")]
        pub is_question: bool,
    }
}

/// Parse an extraction response into a typed batch.
///
/// Handles the model's usual quirks: a surrounding code fence, single
/// quotes, trailing commas, alias field names, and entries with
/// missing fields. An empty response parses to an empty batch; a
/// response that is not JSON at all is an error for the caller's
/// handler to report.
pub fn parse_extraction(content: &str) -> MythosResult<ExtractionBatch> {
    let content = content.trim();
    if content.is_empty() {
        return Ok(ExtractionBatch::default());
    }

    let json_str = extract_json(content);

    let raw: raw::RawExtraction = match serde_json::from_str(json_str) {
        Ok(parsed) => parsed,
        Err(err) => match lenient_parse(json_str) {
            Some(parsed) => parsed,
            None => {
                tracing::warn!("Failed to parse extraction response: {}", err);
                return Err(MythosError::parse(format!(
                    "extraction response is not valid JSON: {}",
                    err
                )));
            }
        },
    };

    let entities = raw.entities.into_iter().filter_map(convert_entity).collect();
    let relationships = raw
        .relationships
        .into_iter()
        .filter_map(convert_relationship)
        .collect();

    Ok(ExtractionBatch {
        entities,
        relationships,
        answer: raw
            .answer
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()),
        is_question: raw.is_question,
    })
}

/// Drop registry entries without a usable name and trim the rest.
///
/// Entries that lost their name upstream cannot anchor a match.
/// Order is preserved; the matching tie-break depends on it.
pub fn sanitize_registry(entries: impl IntoIterator<Item = KnownEntity>) -> Vec<KnownEntity> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let name = entry.name.trim().to_string();
            if name.is_empty() {
                return None;
            }
            Some(KnownEntity {
                name,
                description: entry.description.trim().to_string(),
            })
        })
        .collect()
}

/// Extract JSON from a response that may wrap it in a code fence.
fn extract_json(content: &str) -> &str {
    static JSON_BLOCK: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").unwrap());

    if let Some(caps) = JSON_BLOCK.captures(content) {
        if let Some(m) = caps.get(1) {
            return m.as_str().trim();
        }
    }

    content
}

/// Retry parsing after fixing common model JSON mistakes.
fn lenient_parse(json_str: &str) -> Option<raw::RawExtraction> {
    let fixed = json_str
        .replace('\'', "\"")
        .replace(",]", "]")
        .replace(",}", "}");

    serde_json::from_str(&fixed).ok()
}

/// Convert a raw entity, dropping entries without a usable name.
fn convert_entity(raw: raw::RawEntity) -> Option<ExtractedEntity> {
    let name = raw.name?.trim().to_string();
    if name.is_empty() {
        return None;
    }

    let description = raw
        .description
        .map(|d| d.trim().to_string())
        .unwrap_or_default();

    Some(ExtractedEntity { name, description })
}

/// Convert a raw relationship, dropping entries missing an endpoint.
fn convert_relationship(raw: raw::RawRelationship) -> Option<ExtractedRelationship> {
    let source = raw.source()?.trim().to_string();
    let target = raw.target()?.trim().to_string();
    if source.is_empty() || target.is_empty() {
        return None;
    }

    let label = raw
        .label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_RELATIONSHIP_LABEL)
        .to_string();

    Some(ExtractedRelationship {
        source,
        target,
        label,
    })
}
