//! Core domain logic for Cornote.
//! This crate is the single source of truth for sync and layout invariants.

pub mod host;
pub mod layout;
pub mod logging;
pub mod model;
pub mod parser;
pub mod reconcile;
pub mod registry;
pub mod session;
pub mod settings;
pub mod sync;

pub use host::{
    Clock, DocumentStore, HostError, HostResult, SlotBehavior, SlotHandle, SlotInfo, StateStore,
    SystemClock, ViewHost,
};
pub use layout::{ActivateTrigger, LayoutError, ViewSlotAssignment};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::footnote::{FootnoteDefinition, FootnoteReference, ParsedFootnotes};
pub use model::mode::{PanePosition, StudyMode};
pub use model::note_info::{DocId, DocumentRole, NoteInfo};
pub use parser::parse_footnotes;
pub use reconcile::{build_cue_content, rebuild_source_content};
pub use registry::{NoteInfoRegistry, RebuildReport};
pub use session::{Activity, ActivityRegister, CornoteSession};
pub use settings::{PaneWidthRatio, PersistedState, Settings};
pub use sync::{SkipReason, SyncError, SyncOutcome, SyncTrigger};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
