//! Mode/layout state machine types.

pub mod controller;

use crate::host::{HostError, SlotHandle};
use crate::model::mode::PanePosition;
use crate::model::note_info::DocId;
use crate::session::Activity;
use crate::sync::SyncError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// How a mode activation was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivateTrigger {
    /// User command; updates the persisted last-mode/last-source state.
    Command,
    /// Startup restoration; skips the save-last-state step.
    Restore,
}

/// Layout state machine failure. Any failure tears the in-progress layout
/// down and clears the persisted restore state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// A sync or another mode switch holds the activity register.
    Busy(Activity),
    /// Neither a target nor a focused document was available.
    NoTargetDocument,
    /// The document could not be resolved to an existing Source.
    SourceNotResolved(DocId),
    /// The pre-layout Source→Cue sync failed.
    Sync(SyncError),
    /// A slot could not be created, arranged or populated.
    Host(HostError),
}

impl Display for LayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy(activity) => write!(
                f,
                "mode switch rejected: {} is in progress, please retry",
                activity.as_str()
            ),
            Self::NoTargetDocument => {
                write!(f, "no target document: open a note or pass one explicitly")
            }
            Self::SourceNotResolved(doc_id) => {
                write!(f, "no source document could be resolved for {doc_id}")
            }
            Self::Sync(err) => write!(f, "pre-layout sync failed: {err}"),
            Self::Host(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LayoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sync(err) => Some(err),
            Self::Host(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HostError> for LayoutError {
    fn from(value: HostError) -> Self {
        Self::Host(value)
    }
}

/// Which view slot currently hosts which pane position.
///
/// Owned exclusively by the layout state machine; a handle appears in at
/// most one position at any time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewSlotAssignment {
    left: Option<SlotHandle>,
    center: Option<SlotHandle>,
    right: Option<SlotHandle>,
}

impl ViewSlotAssignment {
    pub fn get(&self, position: PanePosition) -> Option<SlotHandle> {
        match position {
            PanePosition::Left => self.left,
            PanePosition::Center => self.center,
            PanePosition::Right => self.right,
        }
    }

    /// Assigns a handle to a position, evicting it from any other position
    /// first so the at-most-one invariant holds.
    pub fn set(&mut self, position: PanePosition, handle: SlotHandle) {
        for other in [PanePosition::Left, PanePosition::Center, PanePosition::Right] {
            if other != position && self.get(other) == Some(handle) {
                self.take(other);
            }
        }
        match position {
            PanePosition::Left => self.left = Some(handle),
            PanePosition::Center => self.center = Some(handle),
            PanePosition::Right => self.right = Some(handle),
        }
    }

    pub fn take(&mut self, position: PanePosition) -> Option<SlotHandle> {
        match position {
            PanePosition::Left => self.left.take(),
            PanePosition::Center => self.center.take(),
            PanePosition::Right => self.right.take(),
        }
    }

    pub fn contains(&self, handle: SlotHandle) -> bool {
        [self.left, self.center, self.right].contains(&Some(handle))
    }

    /// All tracked position/handle pairs, left to right.
    pub fn tracked(&self) -> Vec<(PanePosition, SlotHandle)> {
        let mut pairs = Vec::new();
        if let Some(handle) = self.left {
            pairs.push((PanePosition::Left, handle));
        }
        if let Some(handle) = self.center {
            pairs.push((PanePosition::Center, handle));
        }
        if let Some(handle) = self.right {
            pairs.push((PanePosition::Right, handle));
        }
        pairs
    }

    /// Empties the assignment, returning the handles that were tracked.
    pub fn clear(&mut self) -> Vec<SlotHandle> {
        let handles = self.tracked().into_iter().map(|(_, handle)| handle).collect();
        *self = Self::default();
        handles
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.center.is_none() && self.right.is_none()
    }
}
