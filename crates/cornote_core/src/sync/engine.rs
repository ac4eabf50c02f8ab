//! Directional sync operations.
//!
//! # Responsibility
//! - Run one Source→Cue or Cue→Source pass: read, parse, reconcile, write
//!   if changed, update the registry, request a preview refresh.
//!
//! # Invariants
//! - Exactly one operation holds the activity register for its full
//!   duration; the register is released on every exit path.
//! - The registry is only updated after the target write succeeded, so a
//!   failed pass never commits a partial entry.
//! - Completion arms a grace window that drops stale auto triggers.

use crate::host::{HostError, SlotBehavior};
use crate::model::note_info::{cue_id_for, doc_title};
use crate::parser::parse_footnotes;
use crate::reconcile::{build_cue_content, initial_cue_text, rebuild_source_content};
use crate::session::{Activity, CornoteSession, AUTO_SYNC_GRACE_MS};
use crate::sync::{SkipReason, SyncError, SyncOutcome, SyncTrigger};
use log::{info, warn};

impl CornoteSession {
    /// Mirrors the Source's footnote definitions into its Cue document.
    pub fn sync_source_to_cue(
        &mut self,
        source_id: &str,
        trigger: SyncTrigger,
    ) -> Result<SyncOutcome, SyncError> {
        if let Err(holder) = self.activity.try_begin(Activity::Syncing) {
            return contention(holder, trigger, "source_to_cue", source_id);
        }
        let result = self.sync_source_to_cue_locked(source_id);
        self.finish_sync();
        result
    }

    /// Writes the Cue's footnote definitions back into the Source.
    pub fn sync_cue_to_source(
        &mut self,
        cue_id: &str,
        trigger: SyncTrigger,
    ) -> Result<SyncOutcome, SyncError> {
        if let Err(holder) = self.activity.try_begin(Activity::Syncing) {
            return contention(holder, trigger, "cue_to_source", cue_id);
        }
        let result = self.sync_cue_to_source_locked(cue_id);
        self.finish_sync();
        result
    }

    /// Source→Cue pass with the register already held. Also called from
    /// the layout state machine while it holds the mode switch.
    pub(crate) fn sync_source_to_cue_locked(
        &mut self,
        source_id: &str,
    ) -> Result<SyncOutcome, SyncError> {
        let source_text = self.docs.read(source_id).map_err(|err| match err {
            HostError::DocumentNotFound(_) => SyncError::SourceNotFound(source_id.to_string()),
            other => SyncError::Host(other),
        })?;
        let parsed = parse_footnotes(&source_text);

        let source_title = doc_title(source_id).to_string();
        let cue_id = self
            .registry
            .get_or_create(source_id)
            .cue_id
            .clone()
            .unwrap_or_else(|| cue_id_for(source_id));
        let initial = initial_cue_text(&source_title, &self.settings);
        let cue_id = match self.docs.create_if_missing(&cue_id, &initial) {
            Ok(resolved) => resolved,
            Err(err) => {
                // The stored pointer may aim at an uncreatable path; drop
                // it so the next pass re-infers from the convention.
                self.registry.get_or_create(source_id).cue_id = None;
                self.persist();
                warn!(
                    "event=sync module=sync direction=source_to_cue status=error \
                     doc={source_id} detail={err}"
                );
                return Err(SyncError::CueUnresolvable(cue_id));
            }
        };

        let mut definitions = parsed.definition_map();
        if self.settings.delete_definitions_on_reference_delete {
            definitions.retain(|ref_id, _| parsed.has_reference(ref_id));
        }

        let existing = self.docs.read(&cue_id)?;
        let next = build_cue_content(&existing, &source_title, &definitions, &self.settings);
        let changed = next != existing;
        if changed {
            self.docs.write(&cue_id, &next)?;
        }

        let now_ms = self.clock.now_ms();
        let entry = self.registry.get_or_create(source_id);
        entry.cue_id = Some(cue_id.clone());
        if changed {
            entry.last_sync_source_to_cue = Some(now_ms);
        }
        self.persist();

        if changed {
            self.refresh_preview_slot(&cue_id);
        }
        info!(
            "event=sync module=sync direction=source_to_cue status=ok doc={source_id} \
             definitions={} changed={changed}",
            definitions.len()
        );
        Ok(if changed {
            SyncOutcome::Updated
        } else {
            SyncOutcome::Unchanged
        })
    }

    fn sync_cue_to_source_locked(&mut self, cue_id: &str) -> Result<SyncOutcome, SyncError> {
        let cue_text = self.docs.read(cue_id)?;
        // Only the Cue's definitions are authoritative; its own references
        // are irrelevant for this direction.
        let definitions = parse_footnotes(&cue_text).definition_map();

        let source_id = self
            .registry
            .resolve_source(cue_id)
            .ok_or_else(|| SyncError::SourceNotFound(cue_id.to_string()))?;
        if !self.docs.exists(&source_id) {
            return Err(SyncError::SourceNotFound(cue_id.to_string()));
        }

        let source_text = self.docs.read(&source_id)?;
        let next = rebuild_source_content(
            &source_text,
            &definitions,
            self.settings.delete_references_on_definition_delete,
            self.settings.move_footnotes_to_end,
        );
        let changed = next != source_text;
        if changed {
            self.docs.write(&source_id, &next)?;
        }

        let now_ms = self.clock.now_ms();
        let entry = self.registry.get_or_create(&source_id);
        entry.cue_id = Some(cue_id.to_string());
        if changed {
            entry.last_sync_cue_to_source = Some(now_ms);
        }
        self.persist();

        info!(
            "event=sync module=sync direction=cue_to_source status=ok doc={cue_id} \
             definitions={} changed={changed}",
            definitions.len()
        );
        Ok(if changed {
            SyncOutcome::Updated
        } else {
            SyncOutcome::Unchanged
        })
    }

    /// Guaranteed exit path: arms the stale-event grace window, then
    /// releases the register.
    fn finish_sync(&mut self) {
        self.grace_until_ms = self.clock.now_ms() + AUTO_SYNC_GRACE_MS;
        self.activity.release();
    }

    /// Asks the host to re-render the Cue when it sits in a read-only slot.
    fn refresh_preview_slot(&mut self, cue_id: &str) {
        let slot = self
            .views
            .open_slots()
            .into_iter()
            .find(|slot| slot.doc_id == cue_id)
            .map(|slot| slot.handle);
        if let Some(handle) = slot {
            if self.views.slot_behavior(handle) == Some(SlotBehavior::Preview) {
                self.views.refresh(handle);
            }
        }
    }
}

fn contention(
    holder: Activity,
    trigger: SyncTrigger,
    direction: &str,
    doc_id: &str,
) -> Result<SyncOutcome, SyncError> {
    match trigger {
        SyncTrigger::Manual => Err(SyncError::Busy(holder)),
        SyncTrigger::Auto => {
            info!(
                "event=sync module=sync direction={direction} status=skip reason=busy \
                 holder={} doc={doc_id}",
                holder.as_str()
            );
            Ok(SyncOutcome::Skipped(SkipReason::Busy))
        }
    }
}
