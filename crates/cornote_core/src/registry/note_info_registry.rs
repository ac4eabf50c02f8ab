//! In-memory NoteInfo index.
//!
//! # Responsibility
//! - Map each Source identity to its derived-document identities and
//!   last-sync timestamps.
//! - Resolve a derived document back to its Source, with a logged
//!   path-convention fallback.
//!
//! # Invariants
//! - The session is the single writer; entries are never removed outside
//!   `rebuild`.
//! - `get_or_create` inserts an inferred entry but has no other side
//!   effects.

use crate::model::note_info::{cue_id_for, inferred_source_id, summary_id_for, DocId, NoteInfo};
use log::{debug, info};
use std::collections::BTreeMap;

/// Counts reported by [`NoteInfoRegistry::rebuild`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Registry of NoteInfo entries keyed by Source identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteInfoRegistry {
    entries: BTreeMap<DocId, NoteInfo>,
}

impl NoteInfoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the registry from a persisted map.
    pub fn from_map(entries: BTreeMap<DocId, NoteInfo>) -> Self {
        Self { entries }
    }

    /// Snapshot for persistence.
    pub fn to_map(&self) -> BTreeMap<DocId, NoteInfo> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, source_id: &str) -> Option<&NoteInfo> {
        self.entries.get(source_id)
    }

    /// Returns the entry for a Source, inserting one with Cue/Summary
    /// identities inferred from the path convention when absent.
    pub fn get_or_create(&mut self, source_id: &str) -> &mut NoteInfo {
        self.entries
            .entry(source_id.to_string())
            .or_insert_with(|| NoteInfo::inferred(source_id))
    }

    /// Replaces the entry for a Source.
    pub fn set(&mut self, source_id: &str, info: NoteInfo) {
        self.entries.insert(source_id.to_string(), info);
    }

    /// Resolves the Source for any document id.
    ///
    /// A Source id resolves to itself. Derived ids are first looked up in
    /// stored entries; when that misses, the path-convention inference is
    /// tried as a best-effort fallback and its use is logged.
    pub fn resolve_source(&self, doc_id: &str) -> Option<DocId> {
        if self.entries.contains_key(doc_id) {
            return Some(doc_id.to_string());
        }
        for (source_id, info) in &self.entries {
            if info.cue_id.as_deref() == Some(doc_id)
                || info.summary_id.as_deref() == Some(doc_id)
            {
                return Some(source_id.clone());
            }
        }
        let inferred = inferred_source_id(doc_id)?;
        debug!(
            "event=resolve_source module=registry status=fallback doc={doc_id} inferred={inferred}"
        );
        Some(inferred)
    }

    /// Reconciles the registry against the current Source set.
    ///
    /// Adds inferred entries for unknown Sources, re-points entries whose
    /// derived identities drifted from the path convention, and prunes
    /// entries whose Source no longer exists.
    pub fn rebuild(&mut self, all_source_ids: &[DocId]) -> RebuildReport {
        let mut report = RebuildReport::default();

        for source_id in all_source_ids {
            let expected_cue = cue_id_for(source_id);
            let expected_summary = summary_id_for(source_id);
            match self.entries.get_mut(source_id) {
                Some(info) => {
                    let drifted = info.cue_id.as_deref() != Some(expected_cue.as_str())
                        || info.summary_id.as_deref() != Some(expected_summary.as_str());
                    if drifted {
                        info.cue_id = Some(expected_cue);
                        info.summary_id = Some(expected_summary);
                        report.updated += 1;
                    }
                }
                None => {
                    self.entries
                        .insert(source_id.clone(), NoteInfo::inferred(source_id));
                    report.added += 1;
                }
            }
        }

        let before = self.entries.len();
        self.entries
            .retain(|source_id, _| all_source_ids.iter().any(|known| known == source_id));
        report.removed = before - self.entries.len();

        info!(
            "event=registry_rebuild module=registry status=ok added={} updated={} removed={}",
            report.added, report.updated, report.removed
        );
        report
    }
}
