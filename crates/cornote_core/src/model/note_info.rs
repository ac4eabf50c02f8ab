//! Document identity, roles and the per-Source registry entry.
//!
//! # Responsibility
//! - Define `DocId` and the path convention binding a Source to its derived
//!   Cue/Summary documents.
//! - Define the persisted `NoteInfo` record.
//!
//! # Invariants
//! - A document's role is fully determined by its path: `<basename>-cue.md`
//!   and `<basename>-summary.md` siblings of the Source are derived.
//! - Suffixes are constants, not user-facing configuration.

use serde::{Deserialize, Serialize};

/// Host-scoped document identity (a vault-relative path).
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type DocId = String;

/// Derived-document suffix appended to the Source basename.
pub const CUE_SUFFIX: &str = "-cue";
/// Derived-document suffix appended to the Source basename.
pub const SUMMARY_SUFFIX: &str = "-summary";

const MARKDOWN_EXT: &str = ".md";

/// Role a document plays in one Cornell triple, derived from its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRole {
    Source,
    Cue,
    Summary,
}

/// Registry entry binding a Source to its derived documents.
///
/// Created lazily on first access; pruned only during a full rebuild when
/// the Source no longer exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteInfo {
    pub source_id: DocId,
    #[serde(default)]
    pub cue_id: Option<DocId>,
    #[serde(default)]
    pub summary_id: Option<DocId>,
    /// Unix epoch milliseconds of the last Source→Cue content change.
    #[serde(default)]
    pub last_sync_source_to_cue: Option<i64>,
    /// Unix epoch milliseconds of the last Cue→Source content change.
    #[serde(default)]
    pub last_sync_cue_to_source: Option<i64>,
}

impl NoteInfo {
    /// Creates an entry with Cue/Summary identities inferred from the path
    /// convention. No timestamps are set.
    pub fn inferred(source_id: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            cue_id: Some(cue_id_for(source_id)),
            summary_id: Some(summary_id_for(source_id)),
            last_sync_source_to_cue: None,
            last_sync_cue_to_source: None,
        }
    }
}

/// Splits a doc id into (stem, extension-with-dot).
fn split_ext(doc_id: &str) -> (&str, &str) {
    match doc_id.strip_suffix(MARKDOWN_EXT) {
        Some(stem) => (stem, MARKDOWN_EXT),
        None => (doc_id, ""),
    }
}

/// Determines the role implied by a document path.
pub fn role_of(doc_id: &str) -> DocumentRole {
    let (stem, _) = split_ext(doc_id);
    if stem.ends_with(CUE_SUFFIX) {
        DocumentRole::Cue
    } else if stem.ends_with(SUMMARY_SUFFIX) {
        DocumentRole::Summary
    } else {
        DocumentRole::Source
    }
}

/// Cue document id for a Source id, same folder, fixed suffix.
pub fn cue_id_for(source_id: &str) -> DocId {
    let (stem, ext) = split_ext(source_id);
    format!("{stem}{CUE_SUFFIX}{ext}")
}

/// Summary document id for a Source id, same folder, fixed suffix.
pub fn summary_id_for(source_id: &str) -> DocId {
    let (stem, ext) = split_ext(source_id);
    format!("{stem}{SUMMARY_SUFFIX}{ext}")
}

/// Infers the Source id from a derived document's path.
///
/// Returns `None` when the path carries no derived suffix.
pub fn inferred_source_id(doc_id: &str) -> Option<DocId> {
    let (stem, ext) = split_ext(doc_id);
    let base = stem
        .strip_suffix(CUE_SUFFIX)
        .or_else(|| stem.strip_suffix(SUMMARY_SUFFIX))?;
    Some(format!("{base}{ext}"))
}

/// Display title for a document: basename without folder or extension.
pub fn doc_title(doc_id: &str) -> &str {
    let (stem, _) = split_ext(doc_id);
    stem.rsplit('/').next().unwrap_or(stem)
}
