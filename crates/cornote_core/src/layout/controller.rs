//! Mode activation, teardown and startup restoration.
//!
//! # Responsibility
//! - Drive the layout state machine: resolve the Source, ensure derived
//!   documents, sync the Cue, then acquire/arrange/configure slots.
//!
//! # Invariants
//! - The mode switch holds the activity register for its full duration.
//! - Any failure between resolution and scroll tears the layout down and
//!   clears the persisted restore state, so a broken layout never comes
//!   back at startup.

use crate::host::{SlotBehavior, SlotHandle};
use crate::layout::{ActivateTrigger, LayoutError};
use crate::model::mode::{PanePosition, StudyMode};
use crate::model::note_info::{cue_id_for, doc_title, role_of, summary_id_for, DocId, DocumentRole};
use crate::reconcile::{initial_cue_text, initial_summary_text};
use crate::session::{Activity, CornoteSession};
use log::{info, warn};
use std::collections::BTreeSet;

const SHOW_ALL_WIDTHS: [u16; 3] = [33, 34, 33];

impl CornoteSession {
    /// Activates a study mode for a Source document.
    ///
    /// With no `target_source`, the currently focused document is used; a
    /// focused Cue or Summary resolves back to its Source.
    pub fn activate_mode(
        &mut self,
        mode: StudyMode,
        target_source: Option<&str>,
        trigger: ActivateTrigger,
    ) -> Result<(), LayoutError> {
        if let Err(holder) = self.activity.try_begin(Activity::ModeSwitching) {
            return Err(LayoutError::Busy(holder));
        }
        let result = self.activate_mode_locked(mode, target_source, trigger);
        if let Err(err) = &result {
            warn!(
                "event=mode_switch module=layout status=error mode={} detail={err}",
                mode.as_str()
            );
            self.teardown_slots();
            self.settings.last_mode = None;
            self.settings.last_source_id = None;
            self.persist();
        }
        self.activity.release();
        result
    }

    /// Detaches every tracked slot and returns to the idle layout state.
    pub fn teardown_layout(&mut self) -> Result<(), LayoutError> {
        if let Err(holder) = self.activity.try_begin(Activity::ModeSwitching) {
            return Err(LayoutError::Busy(holder));
        }
        self.teardown_slots();
        self.activity.release();
        Ok(())
    }

    /// Re-activates the persisted last mode/source, if any.
    ///
    /// The persisted state is cleared before the attempt so a repeatedly
    /// failing restore cannot loop. Returns `false` when there was nothing
    /// to restore.
    pub fn restore_last_layout(&mut self) -> Result<bool, LayoutError> {
        let (Some(mode), Some(source_id)) =
            (self.settings.last_mode, self.settings.last_source_id.clone())
        else {
            return Ok(false);
        };
        // ShowAll is never persisted; ignore it in blobs that carry it.
        if mode == StudyMode::ShowAll {
            return Ok(false);
        }
        self.settings.last_mode = None;
        self.settings.last_source_id = None;
        self.persist();

        self.activate_mode(mode, Some(&source_id), ActivateTrigger::Restore)?;
        Ok(true)
    }

    fn activate_mode_locked(
        &mut self,
        mode: StudyMode,
        target_source: Option<&str>,
        trigger: ActivateTrigger,
    ) -> Result<(), LayoutError> {
        // Resolve the Source document.
        let requested = match target_source {
            Some(target) => target.to_string(),
            None => self
                .views
                .focused_document()
                .ok_or(LayoutError::NoTargetDocument)?,
        };
        let source_id = match role_of(&requested) {
            DocumentRole::Source => requested,
            DocumentRole::Cue | DocumentRole::Summary => self
                .registry
                .resolve_source(&requested)
                .ok_or(LayoutError::SourceNotResolved(requested))?,
        };
        if !self.docs.exists(&source_id) {
            return Err(LayoutError::SourceNotResolved(source_id));
        }

        let required = mode.required_positions();

        // Source change invalidates every slot; a mode change within the
        // same Source only drops positions the new mode does not need.
        if self.active_source.as_deref() != Some(source_id.as_str()) {
            self.teardown_slots();
        } else {
            for position in [PanePosition::Left, PanePosition::Center, PanePosition::Right] {
                if !required.contains(&position) {
                    if let Some(handle) = self.assignment.take(position) {
                        self.views.detach(handle);
                    }
                }
            }
        }

        // Ensure the derived documents exist.
        let source_title = doc_title(&source_id).to_string();
        let cue_id = self
            .registry
            .get_or_create(&source_id)
            .cue_id
            .clone()
            .unwrap_or_else(|| cue_id_for(&source_id));
        let cue_id = self
            .docs
            .create_if_missing(&cue_id, &initial_cue_text(&source_title, &self.settings))?;

        let mut summary_id = None;
        if required.contains(&PanePosition::Right) {
            let expected = self
                .registry
                .get_or_create(&source_id)
                .summary_id
                .clone()
                .unwrap_or_else(|| summary_id_for(&source_id));
            let cue_title = doc_title(&cue_id).to_string();
            let created = self.docs.create_if_missing(
                &expected,
                &initial_summary_text(&source_title, &cue_title, &self.settings),
            )?;
            summary_id = Some(created);
        }

        let entry = self.registry.get_or_create(&source_id);
        entry.cue_id = Some(cue_id.clone());
        if let Some(summary) = &summary_id {
            entry.summary_id = Some(summary.clone());
        }

        if mode != StudyMode::ShowAll && trigger != ActivateTrigger::Restore {
            self.settings.last_mode = Some(mode);
            self.settings.last_source_id = Some(source_id.clone());
        }
        self.persist();

        // The Cue must reflect the current Source before any pane shows it.
        self.sync_source_to_cue_locked(&source_id)
            .map_err(LayoutError::Sync)?;

        let doc_for = |position: PanePosition| -> DocId {
            match position {
                PanePosition::Left => cue_id.clone(),
                PanePosition::Center => source_id.clone(),
                PanePosition::Right => summary_id
                    .clone()
                    .unwrap_or_else(|| summary_id_for(&source_id)),
            }
        };

        // Acquire one slot per required position: tracked slot first, then
        // any open slot already hosting the document, then a new slot.
        let mut claimed: BTreeSet<SlotHandle> = BTreeSet::new();
        for &position in required {
            let doc_id = doc_for(position);
            let inventory = self.views.open_slots();
            let tracked = self.assignment.get(position);
            let tracked_hosts_doc = tracked.is_some_and(|handle| {
                inventory
                    .iter()
                    .any(|slot| slot.handle == handle && slot.doc_id == doc_id)
            });

            let chosen = match (tracked, tracked_hosts_doc) {
                (Some(handle), true) => handle,
                (stale, _) => {
                    if let Some(handle) = stale {
                        self.assignment.take(position);
                        self.views.detach(handle);
                    }
                    let reusable = inventory
                        .iter()
                        .find(|slot| {
                            slot.doc_id == doc_id
                                && !claimed.contains(&slot.handle)
                                && !self.assignment.contains(slot.handle)
                        })
                        .map(|slot| slot.handle);
                    match reusable {
                        Some(handle) => handle,
                        None => self.views.allocate_slot(position, &doc_id)?,
                    }
                }
            };

            let showing = self
                .views
                .open_slots()
                .into_iter()
                .find(|slot| slot.handle == chosen)
                .map(|slot| slot.doc_id);
            if showing.as_deref() != Some(doc_id.as_str()) {
                self.views.open_document(chosen, &doc_id)?;
            }
            claimed.insert(chosen);
            self.assignment.set(position, chosen);
        }

        // Arrange left-to-right, then apply behavior, widths and focus.
        let handles: Vec<SlotHandle> = required
            .iter()
            .filter_map(|&position| self.assignment.get(position))
            .collect();
        self.views.arrange(&handles)?;

        for &position in required {
            if let Some(handle) = self.assignment.get(position) {
                let behavior = if position == PanePosition::Left && self.settings.enforce_cue_preview
                {
                    SlotBehavior::Preview
                } else {
                    mode.nominal_behavior(position)
                };
                self.views.set_behavior(handle, behavior)?;
            }
        }

        let configured: Vec<(SlotHandle, u16)> = required
            .iter()
            .filter_map(|&position| {
                self.assignment
                    .get(position)
                    .map(|handle| (handle, self.width_for(mode, position)))
            })
            .collect();
        self.views.set_widths(&normalize_widths(&configured))?;

        if let Some(handle) = self.assignment.get(mode.focus_position()) {
            self.views.focus(handle)?;
        }

        for &position in required {
            if let Some(handle) = self.assignment.get(position) {
                let text = self.docs.read(&doc_for(position))?;
                let line = section_line(&text, position.section_header());
                self.views.scroll_to_line(handle, line)?;
            }
        }

        self.active_mode = Some(mode);
        self.active_source = Some(source_id.clone());
        info!(
            "event=mode_switch module=layout status=ok mode={} source={source_id} panes={}",
            mode.as_str(),
            required.len()
        );
        Ok(())
    }

    fn width_for(&self, mode: StudyMode, position: PanePosition) -> u16 {
        if mode == StudyMode::ShowAll {
            return match position {
                PanePosition::Left => SHOW_ALL_WIDTHS[0],
                PanePosition::Center => SHOW_ALL_WIDTHS[1],
                PanePosition::Right => SHOW_ALL_WIDTHS[2],
            };
        }
        let ratio = self.settings.pane_width_ratio;
        match position {
            PanePosition::Left => ratio.left,
            PanePosition::Center => ratio.center,
            PanePosition::Right => ratio.right,
        }
    }

    /// Detaches every tracked slot and leaves the active layout state.
    pub(crate) fn teardown_slots(&mut self) {
        for handle in self.assignment.clear() {
            self.views.detach(handle);
        }
        self.active_mode = None;
        self.active_source = None;
    }
}

/// Rescales configured percentages over the present slots so they sum to
/// 100; the last slot absorbs the rounding remainder.
fn normalize_widths(configured: &[(SlotHandle, u16)]) -> Vec<(SlotHandle, u16)> {
    let total: u32 = configured.iter().map(|(_, width)| u32::from(*width)).sum();
    if configured.is_empty() || total == 0 {
        return configured.to_vec();
    }
    let mut assigned = 0u32;
    configured
        .iter()
        .enumerate()
        .map(|(index, (handle, width))| {
            let share = if index + 1 == configured.len() {
                100 - assigned
            } else {
                (u32::from(*width) * 100 + total / 2) / total
            };
            assigned += share;
            (*handle, share as u16)
        })
        .collect()
}

/// Zero-based line of the first section header match, top otherwise.
fn section_line(text: &str, header: &str) -> u32 {
    let needle = header.to_ascii_lowercase();
    for (index, line) in text.lines().enumerate() {
        if line.trim().to_ascii_lowercase().starts_with(&needle) {
            return index as u32;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::{normalize_widths, section_line};
    use crate::host::SlotHandle;

    #[test]
    fn two_pane_widths_rescale_to_a_full_split() {
        let left = SlotHandle::mint();
        let center = SlotHandle::mint();
        let widths = normalize_widths(&[(left, 30), (center, 40)]);
        assert_eq!(widths, vec![(left, 43), (center, 57)]);
    }

    #[test]
    fn widths_already_summing_to_hundred_pass_through() {
        let a = SlotHandle::mint();
        let b = SlotHandle::mint();
        let c = SlotHandle::mint();
        assert_eq!(
            normalize_widths(&[(a, 33), (b, 34), (c, 33)]),
            vec![(a, 33), (b, 34), (c, 33)]
        );
    }

    #[test]
    fn zero_total_widths_are_left_untouched() {
        let a = SlotHandle::mint();
        assert_eq!(normalize_widths(&[(a, 0)]), vec![(a, 0)]);
        assert_eq!(normalize_widths(&[]), vec![]);
    }

    #[test]
    fn section_line_matches_case_insensitively() {
        let text = "intro\n\n## cue\nbody\n";
        assert_eq!(section_line(text, "## CUE"), 2);
    }

    #[test]
    fn missing_header_scrolls_to_top() {
        assert_eq!(section_line("no headers here\n", "## SUMMARY"), 0);
    }

    #[test]
    fn only_line_starts_count_as_headers() {
        let text = "mentions ## CUE inline\n## CUE\n";
        assert_eq!(section_line(text, "## CUE"), 1);
    }
}
