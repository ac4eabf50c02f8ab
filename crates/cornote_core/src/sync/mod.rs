//! Footnote synchronization engine.

pub mod debounce;
pub mod engine;

pub use debounce::LeadingEdgeGate;

use crate::host::HostError;
use crate::model::note_info::DocId;
use crate::session::Activity;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Direction of one synchronization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    SourceToCue,
    CueToSource,
}

impl SyncDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceToCue => "source_to_cue",
            Self::CueToSource => "cue_to_source",
        }
    }
}

/// Who asked for the sync; decides how contention is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// Explicit user command: contention becomes a [`SyncError::Busy`].
    Manual,
    /// Modify-event trigger: contention is a logged skip.
    Auto,
}

/// Why an auto-triggered sync did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another sync or a mode switch holds the activity register.
    Busy,
    /// Inside the post-sync grace window for stale modify events.
    Cooldown,
    /// Suppressed by the leading-edge debounce window.
    Debounced,
    /// `sync_on_save` is disabled.
    SyncDisabled,
    /// The modified document plays no syncable role (Summary).
    IgnoredRole,
}

/// Result of one requested sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Target document content changed and was written.
    Updated,
    /// Reconciliation produced identical content; nothing written.
    Unchanged,
    /// The pass did not run.
    Skipped(SkipReason),
}

/// Sync engine failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A manual command arrived while another operation held the register.
    Busy(Activity),
    /// No Source document could be resolved for a Cue.
    SourceNotFound(DocId),
    /// The Cue document could not be resolved or created.
    CueUnresolvable(DocId),
    /// Read/write failure from the host.
    Host(HostError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy(activity) => {
                write!(f, "sync rejected: {} is in progress, please retry", activity.as_str())
            }
            Self::SourceNotFound(doc_id) => {
                write!(f, "no source document could be resolved for {doc_id}")
            }
            Self::CueUnresolvable(doc_id) => {
                write!(f, "cue document could not be resolved or created for {doc_id}")
            }
            Self::Host(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Host(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HostError> for SyncError {
    fn from(value: HostError) -> Self {
        Self::Host(value)
    }
}
