//! Persisted settings and state blob schema.
//!
//! # Responsibility
//! - Define every key of the host-persisted blob; the host stores it
//!   opaquely, this core owns the schema.
//!
//! # Invariants
//! - Wire keys are camelCase and stable.
//! - Unknown/missing keys deserialize to defaults so older blobs load.

use crate::model::mode::StudyMode;
use crate::model::note_info::{DocId, NoteInfo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Relative pane widths in percent; applied only across panes present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaneWidthRatio {
    pub left: u16,
    pub center: u16,
    pub right: u16,
}

impl Default for PaneWidthRatio {
    fn default() -> Self {
        Self {
            left: 30,
            center: 40,
            right: 30,
        }
    }
}

/// User-facing policy switches plus restore state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Prefix suggested for newly minted footnote refs.
    pub cue_prefix: String,
    /// Mode to restore at startup; never `ShowAll`.
    pub last_mode: Option<StudyMode>,
    /// Source restored together with `last_mode`.
    pub last_source_id: Option<DocId>,
    pub pane_width_ratio: PaneWidthRatio,
    /// Forces the Cue pane read-only regardless of the mode's default.
    pub enforce_cue_preview: bool,
    /// Enables debounced auto-sync on document-modify events.
    pub sync_on_save: bool,
    /// Cue→Source: strip in-body references whose definition was deleted.
    pub delete_references_on_definition_delete: bool,
    /// Source→Cue: drop definitions that have no reference left.
    pub delete_definitions_on_reference_delete: bool,
    /// Back-link rendered into the Cue header; `{source}` is replaced.
    pub link_to_source_template: String,
    /// Back-link rendered into the Summary header; `{cue}` is replaced.
    pub link_to_cue_template: String,
    /// Host-side rendering switch; stored here, never branched on in core.
    pub enable_navigation: bool,
    /// Host-side rendering switch; stored here, never branched on in core.
    pub enable_highlight: bool,
    /// `false` is a documented no-op: footnotes are always appended at the
    /// end of the Source (a warning is logged when the flag is off).
    pub move_footnotes_to_end: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cue_prefix: "c".to_string(),
            last_mode: None,
            last_source_id: None,
            pane_width_ratio: PaneWidthRatio::default(),
            enforce_cue_preview: true,
            sync_on_save: true,
            delete_references_on_definition_delete: false,
            delete_definitions_on_reference_delete: false,
            link_to_source_template: "[[{source}]]".to_string(),
            link_to_cue_template: "[[{cue}]]".to_string(),
            enable_navigation: true,
            enable_highlight: true,
            move_footnotes_to_end: true,
        }
    }
}

impl Settings {
    /// Renders the Source back-link for a given source title.
    pub fn render_source_link(&self, source_title: &str) -> String {
        self.link_to_source_template.replace("{source}", source_title)
    }

    /// Renders the Cue back-link for a given cue title.
    pub fn render_cue_link(&self, cue_title: &str) -> String {
        self.link_to_cue_template.replace("{cue}", cue_title)
    }
}

/// The full blob handed to the host `StateStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedState {
    pub settings: Settings,
    pub note_info_map: BTreeMap<DocId, NoteInfo>,
}
