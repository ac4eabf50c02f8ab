//! Footnote domain model.
//!
//! # Responsibility
//! - Define the definition/reference records produced by the parser.
//! - Provide lookup projections used by the reconciler and sync engine.
//!
//! # Invariants
//! - `ref_id` is unique within one document's definition set; when the raw
//!   text defines the same ref twice, the last occurrence wins.
//! - Parsed structures are transient: recomputed from text on every pass,
//!   never cached across sync calls.

use std::collections::BTreeMap;
use std::ops::Range;

/// One `[^ref]: body` definition extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootnoteDefinition {
    /// Trimmed marker id between `[^` and `]`.
    pub ref_id: String,
    /// Body text with continuation-line indentation stripped.
    pub body: String,
    /// Byte span of the whole definition block, continuations included.
    pub span: Range<usize>,
}

/// One in-body `[^ref]` occurrence that is not a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FootnoteReference {
    /// Trimmed marker id between `[^` and `]`.
    pub ref_id: String,
    /// Byte span of the marker itself.
    pub span: Range<usize>,
}

/// Parser output for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFootnotes {
    pub definitions: Vec<FootnoteDefinition>,
    pub references: Vec<FootnoteReference>,
}

impl ParsedFootnotes {
    /// Collapses definitions into a `ref -> body` map; last occurrence wins.
    pub fn definition_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for definition in &self.definitions {
            map.insert(definition.ref_id.clone(), definition.body.clone());
        }
        map
    }

    /// Counts in-body references per ref id.
    pub fn reference_counts(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for reference in &self.references {
            *counts.entry(reference.ref_id.clone()).or_default() += 1;
        }
        counts
    }

    /// Returns whether at least one in-body reference to `ref_id` exists.
    pub fn has_reference(&self, ref_id: &str) -> bool {
        self.references
            .iter()
            .any(|reference| reference.ref_id == ref_id)
    }
}

#[cfg(test)]
mod tests {
    use super::{FootnoteDefinition, FootnoteReference, ParsedFootnotes};

    fn definition(ref_id: &str, body: &str) -> FootnoteDefinition {
        FootnoteDefinition {
            ref_id: ref_id.to_string(),
            body: body.to_string(),
            span: 0..0,
        }
    }

    #[test]
    fn definition_map_keeps_last_duplicate() {
        let parsed = ParsedFootnotes {
            definitions: vec![definition("1", "first"), definition("1", "second")],
            references: vec![],
        };
        let map = parsed.definition_map();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("1").map(String::as_str), Some("second"));
    }

    #[test]
    fn reference_counts_accumulate_per_ref() {
        let parsed = ParsedFootnotes {
            definitions: vec![],
            references: vec![
                FootnoteReference {
                    ref_id: "a".to_string(),
                    span: 0..4,
                },
                FootnoteReference {
                    ref_id: "a".to_string(),
                    span: 8..12,
                },
                FootnoteReference {
                    ref_id: "b".to_string(),
                    span: 16..20,
                },
            ],
        };
        let counts = parsed.reference_counts();
        assert_eq!(counts.get("a"), Some(&2));
        assert_eq!(counts.get("b"), Some(&1));
        assert!(parsed.has_reference("a"));
        assert!(!parsed.has_reference("c"));
    }
}
