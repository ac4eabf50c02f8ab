//! Host collaborator contracts.
//!
//! # Responsibility
//! - Define the traits through which the core consumes document storage,
//!   view hosting, persisted-state storage and wall-clock time.
//! - Keep every host detail (vault layout, pane splitting, blob format)
//!   outside the core.
//!
//! # Invariants
//! - All trait methods take `&self`; implementations own their interior
//!   mutability. The core holds collaborators as `Arc<dyn _>`.

pub mod memory;

use crate::model::mode::PanePosition;
use crate::model::note_info::DocId;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type HostResult<T> = Result<T, HostError>;

/// Failure reported by a host collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The addressed document does not exist.
    DocumentNotFound(DocId),
    /// Read/write/create failure on one document.
    Io { doc_id: DocId, message: String },
    /// View slot could not be created, arranged or populated.
    View { message: String },
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DocumentNotFound(doc_id) => write!(f, "document not found: {doc_id}"),
            Self::Io { doc_id, message } => write!(f, "document i/o failed for {doc_id}: {message}"),
            Self::View { message } => write!(f, "view host failure: {message}"),
        }
    }
}

impl Error for HostError {}

/// Opaque handle for one host view slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotHandle(Uuid);

impl SlotHandle {
    /// Mints a fresh handle; called by host implementations when a slot is
    /// allocated.
    pub fn mint() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for SlotHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot:{}", self.0)
    }
}

/// View behavior applied to one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotBehavior {
    /// Editable view.
    Edit,
    /// Read-only rendered view.
    Preview,
}

/// Inventory row describing one open slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    pub handle: SlotHandle,
    pub doc_id: DocId,
}

/// Document storage primitives owned by the host.
pub trait DocumentStore {
    fn read(&self, doc_id: &str) -> HostResult<String>;
    fn write(&self, doc_id: &str, text: &str) -> HostResult<()>;
    /// Creates the document with `initial` content when absent; returns the
    /// id either way.
    fn create_if_missing(&self, doc_id: &str, initial: &str) -> HostResult<DocId>;
    fn exists(&self, doc_id: &str) -> bool;
}

/// View-hosting primitives owned by the host workspace.
pub trait ViewHost {
    /// Allocates a new slot at `position` showing `doc_id`.
    fn allocate_slot(&self, position: PanePosition, doc_id: &str) -> HostResult<SlotHandle>;
    /// Opens `doc_id` into an existing slot.
    fn open_document(&self, slot: SlotHandle, doc_id: &str) -> HostResult<()>;
    /// Arranges slots into one horizontal sequence in the given order.
    fn arrange(&self, handles: &[SlotHandle]) -> HostResult<()>;
    /// Detaches a slot; unknown handles are ignored.
    fn detach(&self, slot: SlotHandle);
    fn set_behavior(&self, slot: SlotHandle, behavior: SlotBehavior) -> HostResult<()>;
    /// Applies relative width percentages to the listed slots.
    fn set_widths(&self, widths: &[(SlotHandle, u16)]) -> HostResult<()>;
    fn focus(&self, slot: SlotHandle) -> HostResult<()>;
    /// Scrolls a slot to a zero-based line.
    fn scroll_to_line(&self, slot: SlotHandle, line: u32) -> HostResult<()>;
    /// Asks the host to re-render a slot after its document changed on disk.
    fn refresh(&self, slot: SlotHandle);
    /// Document shown in the currently focused slot, if any.
    fn focused_document(&self) -> Option<DocId>;
    /// Inventory of all open slots, queried by the layout state machine.
    fn open_slots(&self) -> Vec<SlotInfo>;
    /// Current behavior for a slot, `None` for unknown handles.
    fn slot_behavior(&self, slot: SlotHandle) -> Option<SlotBehavior>;
}

/// Persisted-state storage owned by the host.
pub trait StateStore {
    fn load(&self) -> HostResult<Option<crate::settings::PersistedState>>;
    fn save(&self, state: &crate::settings::PersistedState) -> HostResult<()>;
}

/// Wall-clock abstraction so debounce and grace windows are testable.
pub trait Clock {
    /// Current time as Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0)
    }
}
