//! In-memory host implementations.
//!
//! # Responsibility
//! - Provide reference `DocumentStore`/`ViewHost`/`StateStore`/`Clock`
//!   implementations for tests and demos, with call recording and failure
//!   switches.
//!
//! # Invariants
//! - No real I/O; everything lives behind interior mutability so handles
//!   can be shared as `Arc<dyn _>` while tests keep their own clone.

use crate::host::{
    Clock, DocumentStore, HostError, HostResult, SlotBehavior, SlotHandle, SlotInfo, StateStore,
    ViewHost,
};
use crate::model::mode::PanePosition;
use crate::model::note_info::DocId;
use crate::settings::PersistedState;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

/// Map-backed document store.
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<BTreeMap<DocId, String>>,
    fail_create: Mutex<BTreeSet<DocId>>,
    fail_write: Mutex<BTreeSet<DocId>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a document.
    pub fn insert(&self, doc_id: &str, text: &str) {
        self.docs
            .lock()
            .expect("document map lock")
            .insert(doc_id.to_string(), text.to_string());
    }

    /// Returns current text, `None` when absent.
    pub fn text(&self, doc_id: &str) -> Option<String> {
        self.docs.lock().expect("document map lock").get(doc_id).cloned()
    }

    /// Makes future `create_if_missing` calls fail for one id.
    pub fn fail_creation_of(&self, doc_id: &str) {
        self.fail_create
            .lock()
            .expect("fail-create lock")
            .insert(doc_id.to_string());
    }

    /// Makes future `write` calls fail for one id.
    pub fn fail_writes_to(&self, doc_id: &str) {
        self.fail_write
            .lock()
            .expect("fail-write lock")
            .insert(doc_id.to_string());
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read(&self, doc_id: &str) -> HostResult<String> {
        self.text(doc_id)
            .ok_or_else(|| HostError::DocumentNotFound(doc_id.to_string()))
    }

    fn write(&self, doc_id: &str, text: &str) -> HostResult<()> {
        if self.fail_write.lock().expect("fail-write lock").contains(doc_id) {
            return Err(HostError::Io {
                doc_id: doc_id.to_string(),
                message: "write rejected by test switch".to_string(),
            });
        }
        self.insert(doc_id, text);
        Ok(())
    }

    fn create_if_missing(&self, doc_id: &str, initial: &str) -> HostResult<DocId> {
        if self.text(doc_id).is_some() {
            return Ok(doc_id.to_string());
        }
        if self.fail_create.lock().expect("fail-create lock").contains(doc_id) {
            return Err(HostError::Io {
                doc_id: doc_id.to_string(),
                message: "creation rejected by test switch".to_string(),
            });
        }
        self.insert(doc_id, initial);
        Ok(doc_id.to_string())
    }

    fn exists(&self, doc_id: &str) -> bool {
        self.text(doc_id).is_some()
    }
}

struct SlotState {
    handle: SlotHandle,
    doc_id: DocId,
    behavior: SlotBehavior,
}

/// Recording view host with an explicit slot inventory.
#[derive(Default)]
pub struct MemoryViewHost {
    slots: Mutex<Vec<SlotState>>,
    focused_slot: Mutex<Option<SlotHandle>>,
    focused_doc: Mutex<Option<DocId>>,
    arranged: Mutex<Vec<Vec<SlotHandle>>>,
    widths: Mutex<Vec<Vec<(SlotHandle, u16)>>>,
    scrolls: Mutex<Vec<(SlotHandle, u32)>>,
    refreshes: Mutex<Vec<SlotHandle>>,
    fail_allocation: Mutex<bool>,
}

impl MemoryViewHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the document focused by the user before any layout runs.
    pub fn set_focused_document(&self, doc_id: &str) {
        *self.focused_doc.lock().expect("focused-doc lock") = Some(doc_id.to_string());
    }

    /// Makes future allocations fail.
    pub fn fail_allocations(&self) {
        *self.fail_allocation.lock().expect("fail-allocation lock") = true;
    }

    /// Pre-opens a slot outside layout control, as a user-opened pane.
    pub fn preopen_slot(&self, doc_id: &str) -> SlotHandle {
        let handle = SlotHandle::mint();
        self.slots.lock().expect("slot lock").push(SlotState {
            handle,
            doc_id: doc_id.to_string(),
            behavior: SlotBehavior::Edit,
        });
        handle
    }

    pub fn slot_count(&self) -> usize {
        self.slots.lock().expect("slot lock").len()
    }

    pub fn slot_for_doc(&self, doc_id: &str) -> Option<SlotHandle> {
        self.slots
            .lock()
            .expect("slot lock")
            .iter()
            .find(|slot| slot.doc_id == doc_id)
            .map(|slot| slot.handle)
    }

    pub fn behavior_of(&self, handle: SlotHandle) -> Option<SlotBehavior> {
        self.slots
            .lock()
            .expect("slot lock")
            .iter()
            .find(|slot| slot.handle == handle)
            .map(|slot| slot.behavior)
    }

    /// Most recent arrangement order, if any.
    pub fn last_arranged(&self) -> Option<Vec<SlotHandle>> {
        self.arranged.lock().expect("arranged lock").last().cloned()
    }

    /// Most recent width assignment, if any.
    pub fn last_widths(&self) -> Option<Vec<(SlotHandle, u16)>> {
        self.widths.lock().expect("widths lock").last().cloned()
    }

    /// Line last scrolled to for one slot.
    pub fn scrolled_to(&self, handle: SlotHandle) -> Option<u32> {
        self.scrolls
            .lock()
            .expect("scrolls lock")
            .iter()
            .rev()
            .find(|(scrolled, _)| *scrolled == handle)
            .map(|(_, line)| *line)
    }

    pub fn refresh_count(&self, handle: SlotHandle) -> usize {
        self.refreshes
            .lock()
            .expect("refreshes lock")
            .iter()
            .filter(|refreshed| **refreshed == handle)
            .count()
    }

    pub fn focused_slot(&self) -> Option<SlotHandle> {
        *self.focused_slot.lock().expect("focused-slot lock")
    }
}

impl ViewHost for MemoryViewHost {
    fn allocate_slot(&self, _position: PanePosition, doc_id: &str) -> HostResult<SlotHandle> {
        if *self.fail_allocation.lock().expect("fail-allocation lock") {
            return Err(HostError::View {
                message: "allocation rejected by test switch".to_string(),
            });
        }
        Ok(self.preopen_slot(doc_id))
    }

    fn open_document(&self, slot: SlotHandle, doc_id: &str) -> HostResult<()> {
        let mut slots = self.slots.lock().expect("slot lock");
        match slots.iter_mut().find(|state| state.handle == slot) {
            Some(state) => {
                state.doc_id = doc_id.to_string();
                Ok(())
            }
            None => Err(HostError::View {
                message: format!("unknown slot {slot}"),
            }),
        }
    }

    fn arrange(&self, handles: &[SlotHandle]) -> HostResult<()> {
        self.arranged
            .lock()
            .expect("arranged lock")
            .push(handles.to_vec());
        Ok(())
    }

    fn detach(&self, slot: SlotHandle) {
        self.slots
            .lock()
            .expect("slot lock")
            .retain(|state| state.handle != slot);
        let mut focused = self.focused_slot.lock().expect("focused-slot lock");
        if *focused == Some(slot) {
            *focused = None;
        }
    }

    fn set_behavior(&self, slot: SlotHandle, behavior: SlotBehavior) -> HostResult<()> {
        let mut slots = self.slots.lock().expect("slot lock");
        match slots.iter_mut().find(|state| state.handle == slot) {
            Some(state) => {
                state.behavior = behavior;
                Ok(())
            }
            None => Err(HostError::View {
                message: format!("unknown slot {slot}"),
            }),
        }
    }

    fn set_widths(&self, widths: &[(SlotHandle, u16)]) -> HostResult<()> {
        self.widths.lock().expect("widths lock").push(widths.to_vec());
        Ok(())
    }

    fn focus(&self, slot: SlotHandle) -> HostResult<()> {
        *self.focused_slot.lock().expect("focused-slot lock") = Some(slot);
        Ok(())
    }

    fn scroll_to_line(&self, slot: SlotHandle, line: u32) -> HostResult<()> {
        self.scrolls.lock().expect("scrolls lock").push((slot, line));
        Ok(())
    }

    fn refresh(&self, slot: SlotHandle) {
        self.refreshes.lock().expect("refreshes lock").push(slot);
    }

    fn focused_document(&self) -> Option<DocId> {
        let slots = self.slots.lock().expect("slot lock");
        if let Some(handle) = *self.focused_slot.lock().expect("focused-slot lock") {
            if let Some(state) = slots.iter().find(|state| state.handle == handle) {
                return Some(state.doc_id.clone());
            }
        }
        self.focused_doc.lock().expect("focused-doc lock").clone()
    }

    fn open_slots(&self) -> Vec<SlotInfo> {
        self.slots
            .lock()
            .expect("slot lock")
            .iter()
            .map(|state| SlotInfo {
                handle: state.handle,
                doc_id: state.doc_id.clone(),
            })
            .collect()
    }

    fn slot_behavior(&self, slot: SlotHandle) -> Option<SlotBehavior> {
        self.behavior_of(slot)
    }
}

/// State store keeping the blob in memory.
#[derive(Default)]
pub struct MemoryStateStore {
    state: Mutex<Option<PersistedState>>,
    fail_save: Mutex<bool>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
            fail_save: Mutex::new(false),
        }
    }

    pub fn fail_saves(&self) {
        *self.fail_save.lock().expect("fail-save lock") = true;
    }

    /// Last saved blob, if any.
    pub fn saved(&self) -> Option<PersistedState> {
        self.state.lock().expect("state lock").clone()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> HostResult<Option<PersistedState>> {
        Ok(self.saved())
    }

    fn save(&self, state: &PersistedState) -> HostResult<()> {
        if *self.fail_save.lock().expect("fail-save lock") {
            return Err(HostError::Io {
                doc_id: "<state>".to_string(),
                message: "save rejected by test switch".to_string(),
            });
        }
        *self.state.lock().expect("state lock") = Some(state.clone());
        Ok(())
    }
}

/// Manually advanced clock.
#[derive(Default)]
pub struct FixedClock {
    now_ms: Mutex<i64>,
}

impl FixedClock {
    pub fn at(now_ms: i64) -> Self {
        Self {
            now_ms: Mutex::new(now_ms),
        }
    }

    pub fn advance(&self, delta_ms: i64) {
        *self.now_ms.lock().expect("clock lock") += delta_ms;
    }

    pub fn set(&self, now_ms: i64) {
        *self.now_ms.lock().expect("clock lock") = now_ms;
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        *self.now_ms.lock().expect("clock lock")
    }
}
