//! Session coordinator.
//!
//! # Responsibility
//! - Own all cross-operation state: settings, NoteInfo registry, slot
//!   assignment, activity register and the auto-sync gate.
//! - Dispatch modify events to the right sync direction.
//!
//! # Invariants
//! - Single-threaded cooperative model: operations never overlap; the
//!   activity register drops (never queues) contending requests.
//! - Shared state is mutated only while the register is held.

use crate::host::{Clock, DocumentStore, StateStore, ViewHost};
use crate::layout::ViewSlotAssignment;
use crate::model::mode::StudyMode;
use crate::model::note_info::{role_of, DocId, DocumentRole};
use crate::registry::{NoteInfoRegistry, RebuildReport};
use crate::settings::{PersistedState, Settings};
use crate::sync::{LeadingEdgeGate, SkipReason, SyncDirection, SyncError, SyncOutcome, SyncTrigger};
use log::{debug, info, warn};
use std::sync::Arc;

/// Quiescence window for auto-triggered syncs.
pub const AUTO_SYNC_DEBOUNCE_MS: i64 = 500;
/// Post-sync window during which stale modify events are dropped.
pub const AUTO_SYNC_GRACE_MS: i64 = 400;

/// What the core is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    Idle,
    Syncing,
    ModeSwitching,
}

impl Activity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Syncing => "sync",
            Self::ModeSwitching => "mode-switch",
        }
    }
}

/// Single-slot mutual-exclusion register replacing ambient boolean flags.
///
/// Exactly one non-idle activity may hold the register; a second request
/// is rejected with the holder so callers can surface or skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityRegister {
    current: Activity,
}

impl Default for ActivityRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityRegister {
    pub fn new() -> Self {
        Self {
            current: Activity::Idle,
        }
    }

    pub fn current(self) -> Activity {
        self.current
    }

    /// Claims the register for `next`; returns the current holder when it
    /// is already taken.
    pub fn try_begin(&mut self, next: Activity) -> Result<(), Activity> {
        debug_assert_ne!(next, Activity::Idle, "cannot begin the idle activity");
        if self.current != Activity::Idle {
            return Err(self.current);
        }
        self.current = next;
        Ok(())
    }

    /// Returns the register to idle. Always reached through the guarded
    /// exit path of the holding operation.
    pub fn release(&mut self) {
        self.current = Activity::Idle;
    }
}

/// Process-wide coordinator for sync and layout operations.
///
/// Holds the host collaborators and every piece of shared state named by
/// the ownership rules: the registry (sync + layout writers go through
/// here) and the view-slot assignment (layout only).
pub struct CornoteSession {
    pub(crate) docs: Arc<dyn DocumentStore>,
    pub(crate) views: Arc<dyn ViewHost>,
    pub(crate) state: Arc<dyn StateStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) settings: Settings,
    pub(crate) registry: NoteInfoRegistry,
    pub(crate) activity: ActivityRegister,
    pub(crate) assignment: ViewSlotAssignment,
    pub(crate) active_mode: Option<StudyMode>,
    pub(crate) active_source: Option<DocId>,
    pub(crate) gate: LeadingEdgeGate,
    pub(crate) grace_until_ms: i64,
}

impl CornoteSession {
    /// Creates a session, restoring settings and the registry from the
    /// host state store. A load failure falls back to defaults and is
    /// logged; it never aborts startup.
    pub fn new(
        docs: Arc<dyn DocumentStore>,
        views: Arc<dyn ViewHost>,
        state: Arc<dyn StateStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let persisted = match state.load() {
            Ok(Some(persisted)) => persisted,
            Ok(None) => PersistedState::default(),
            Err(err) => {
                warn!("event=state_load module=session status=error detail={err}");
                PersistedState::default()
            }
        };
        info!(
            "event=session_start module=session status=ok entries={} version={}",
            persisted.note_info_map.len(),
            env!("CARGO_PKG_VERSION")
        );
        Self {
            docs,
            views,
            state,
            clock,
            settings: persisted.settings,
            registry: NoteInfoRegistry::from_map(persisted.note_info_map),
            activity: ActivityRegister::new(),
            assignment: ViewSlotAssignment::default(),
            active_mode: None,
            active_source: None,
            gate: LeadingEdgeGate::new(AUTO_SYNC_DEBOUNCE_MS),
            grace_until_ms: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn registry(&self) -> &NoteInfoRegistry {
        &self.registry
    }

    pub fn activity(&self) -> Activity {
        self.activity.current()
    }

    pub fn active_mode(&self) -> Option<StudyMode> {
        self.active_mode
    }

    pub fn active_source(&self) -> Option<&str> {
        self.active_source.as_deref()
    }

    pub fn assignment(&self) -> &ViewSlotAssignment {
        &self.assignment
    }

    /// Reconciles the registry against the current Source set and
    /// persists the result.
    pub fn rebuild_registry(&mut self, all_source_ids: &[DocId]) -> RebuildReport {
        let report = self.registry.rebuild(all_source_ids);
        self.persist();
        report
    }

    /// Modify-event entry point; debounced, role-dispatched, never fatal.
    pub fn on_document_modified(&mut self, doc_id: &str) -> Result<SyncOutcome, SyncError> {
        if !self.settings.sync_on_save {
            return Ok(SyncOutcome::Skipped(SkipReason::SyncDisabled));
        }
        let direction = match role_of(doc_id) {
            DocumentRole::Source => SyncDirection::SourceToCue,
            DocumentRole::Cue => SyncDirection::CueToSource,
            DocumentRole::Summary => {
                return Ok(SyncOutcome::Skipped(SkipReason::IgnoredRole));
            }
        };

        let now_ms = self.clock.now_ms();
        if now_ms < self.grace_until_ms {
            debug!(
                "event=auto_sync module=session status=skip reason=cooldown doc={doc_id}"
            );
            return Ok(SyncOutcome::Skipped(SkipReason::Cooldown));
        }
        let key = format!("{}:{doc_id}", direction.as_str());
        if !self.gate.try_fire(&key, now_ms) {
            debug!(
                "event=auto_sync module=session status=skip reason=debounced doc={doc_id}"
            );
            return Ok(SyncOutcome::Skipped(SkipReason::Debounced));
        }

        match direction {
            SyncDirection::SourceToCue => self.sync_source_to_cue(doc_id, SyncTrigger::Auto),
            SyncDirection::CueToSource => self.sync_cue_to_source(doc_id, SyncTrigger::Auto),
        }
    }

    /// Cancels pending debounce state and persists the registry.
    pub fn shutdown(&mut self) {
        self.gate.cancel_all();
        self.persist();
        info!("event=session_shutdown module=session status=ok");
    }

    /// Writes the settings + registry blob through the host state store.
    /// Failure is logged; the in-memory state stays authoritative and the
    /// next successful operation persists it again.
    pub(crate) fn persist(&mut self) {
        let state = PersistedState {
            settings: self.settings.clone(),
            note_info_map: self.registry.to_map(),
        };
        if let Err(err) = self.state.save(&state) {
            warn!("event=state_persist module=session status=error detail={err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Activity, ActivityRegister, CornoteSession};
    use crate::host::memory::{FixedClock, MemoryDocumentStore, MemoryStateStore, MemoryViewHost};
    use crate::layout::{ActivateTrigger, LayoutError};
    use crate::model::mode::StudyMode;
    use crate::sync::{SkipReason, SyncError, SyncOutcome, SyncTrigger};
    use std::sync::Arc;

    fn session_with_docs(docs: Arc<MemoryDocumentStore>) -> CornoteSession {
        CornoteSession::new(
            docs,
            Arc::new(MemoryViewHost::new()),
            Arc::new(MemoryStateStore::new()),
            Arc::new(FixedClock::at(10_000)),
        )
    }

    #[test]
    fn register_allows_one_holder_at_a_time() {
        let mut register = ActivityRegister::new();
        assert_eq!(register.current(), Activity::Idle);
        register
            .try_begin(Activity::Syncing)
            .expect("idle register should be claimable");
        assert_eq!(
            register.try_begin(Activity::ModeSwitching),
            Err(Activity::Syncing)
        );
        register.release();
        register
            .try_begin(Activity::ModeSwitching)
            .expect("released register should be claimable");
    }

    #[test]
    fn held_register_short_circuits_manual_and_auto_syncs() {
        let docs = Arc::new(MemoryDocumentStore::new());
        docs.insert("note.md", "Body [^1].\n\n[^1]: x\n");
        let mut session = session_with_docs(docs.clone());

        session
            .activity
            .try_begin(Activity::ModeSwitching)
            .expect("register should be claimable");

        let manual = session.sync_source_to_cue("note.md", SyncTrigger::Manual);
        assert_eq!(manual, Err(SyncError::Busy(Activity::ModeSwitching)));

        let auto = session.sync_source_to_cue("note.md", SyncTrigger::Auto);
        assert_eq!(auto, Ok(SyncOutcome::Skipped(SkipReason::Busy)));

        // The short-circuited calls mutated nothing.
        assert!(docs.text("note-cue.md").is_none());
        assert_eq!(session.registry().len(), 0);
    }

    #[test]
    fn held_register_short_circuits_mode_switches() {
        let docs = Arc::new(MemoryDocumentStore::new());
        docs.insert("note.md", "Body [^1].\n\n[^1]: x\n");
        let views = Arc::new(MemoryViewHost::new());
        let mut session = CornoteSession::new(
            docs.clone(),
            views.clone(),
            Arc::new(MemoryStateStore::new()),
            Arc::new(FixedClock::at(10_000)),
        );

        session
            .activity
            .try_begin(Activity::Syncing)
            .expect("register should be claimable");

        let result = session.activate_mode(
            StudyMode::ShowAll,
            Some("note.md"),
            ActivateTrigger::Command,
        );
        assert_eq!(result, Err(LayoutError::Busy(Activity::Syncing)));

        // The short-circuited switch mutated nothing.
        assert_eq!(views.slot_count(), 0);
        assert!(docs.text("note-cue.md").is_none());
        assert_eq!(session.registry().len(), 0);
        assert!(session.assignment().is_empty());
    }

    #[test]
    fn summary_edits_are_ignored_by_auto_sync() {
        let docs = Arc::new(MemoryDocumentStore::new());
        let mut session = session_with_docs(docs);
        let outcome = session
            .on_document_modified("note-summary.md")
            .expect("summary events never fail");
        assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::IgnoredRole));
    }

    #[test]
    fn sync_on_save_off_disables_auto_sync() {
        let docs = Arc::new(MemoryDocumentStore::new());
        docs.insert("note.md", "text");
        let mut session = session_with_docs(docs);
        session.settings_mut().sync_on_save = false;
        let outcome = session
            .on_document_modified("note.md")
            .expect("disabled sync never fails");
        assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::SyncDisabled));
    }
}
