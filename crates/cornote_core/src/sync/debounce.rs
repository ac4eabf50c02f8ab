//! Leading-edge gate for auto-triggered syncs.
//!
//! # Responsibility
//! - Collapse a burst of modify events into a single sync call: the first
//!   event fires, later events inside the quiescence window are dropped
//!   (never queued for replay).
//!
//! # Invariants
//! - The window is fixed and does not extend on suppressed events.
//! - `cancel_all` clears every armed key; used at shutdown.

use std::collections::BTreeMap;

/// Per-key leading-edge suppression windows.
#[derive(Debug, Clone)]
pub struct LeadingEdgeGate {
    window_ms: i64,
    last_fire_ms: BTreeMap<String, i64>,
}

impl LeadingEdgeGate {
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms,
            last_fire_ms: BTreeMap::new(),
        }
    }

    /// Returns `true` when the event for `key` should fire now, arming the
    /// suppression window; `false` when it falls inside the window.
    pub fn try_fire(&mut self, key: &str, now_ms: i64) -> bool {
        if let Some(last) = self.last_fire_ms.get(key) {
            if now_ms < last + self.window_ms {
                return false;
            }
        }
        self.last_fire_ms.insert(key.to_string(), now_ms);
        true
    }

    /// Number of keys currently armed.
    pub fn armed(&self) -> usize {
        self.last_fire_ms.len()
    }

    /// Drops all suppression state.
    pub fn cancel_all(&mut self) {
        self.last_fire_ms.clear();
    }
}
