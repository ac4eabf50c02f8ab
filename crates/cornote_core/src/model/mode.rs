//! Study modes and pane positions.
//!
//! # Responsibility
//! - Map each mode to its required pane positions, nominal view behaviors
//!   and focus target.
//! - Own the section-header convention used for scroll targeting.
//!
//! # Invariants
//! - The position → document mapping is fixed: Left hosts the Cue, Center
//!   the Source, Right the Summary.

use crate::host::SlotBehavior;
use serde::{Deserialize, Serialize};

/// Pane layout selector for the Cornell view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StudyMode {
    /// Write main notes while the cue column is visible.
    Capture,
    /// Answer cues from memory into the summary column.
    Recall,
    /// Re-read main notes and refine the summary.
    Review,
    /// All three panes side by side.
    ShowAll,
}

/// Horizontal pane position inside the Cornell layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanePosition {
    /// Hosts the Cue document.
    Left,
    /// Hosts the Source document.
    Center,
    /// Hosts the Summary document.
    Right,
}

impl StudyMode {
    /// Pane positions this mode requires, in left-to-right order.
    pub fn required_positions(self) -> &'static [PanePosition] {
        match self {
            Self::Capture => &[PanePosition::Left, PanePosition::Center],
            Self::Recall => &[PanePosition::Left, PanePosition::Right],
            Self::Review => &[PanePosition::Center, PanePosition::Right],
            Self::ShowAll => &[
                PanePosition::Left,
                PanePosition::Center,
                PanePosition::Right,
            ],
        }
    }

    /// Position that receives focus once the layout settles.
    pub fn focus_position(self) -> PanePosition {
        match self {
            Self::Capture | Self::ShowAll => PanePosition::Center,
            Self::Recall | Self::Review => PanePosition::Right,
        }
    }

    /// Nominal view behavior for one position, before policy overrides.
    pub fn nominal_behavior(self, position: PanePosition) -> SlotBehavior {
        match (self, position) {
            (Self::Recall, PanePosition::Left) => SlotBehavior::Preview,
            (Self::Review, PanePosition::Center) => SlotBehavior::Preview,
            _ => SlotBehavior::Edit,
        }
    }

    /// Stable identifier used in logs and persisted state.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Recall => "recall",
            Self::Review => "review",
            Self::ShowAll => "show-all",
        }
    }
}

impl PanePosition {
    /// Section header scrolled to when this pane opens.
    pub fn section_header(self) -> &'static str {
        match self {
            Self::Left => "## CUE",
            Self::Center => "## MAIN",
            Self::Right => "## SUMMARY",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PanePosition, StudyMode};
    use crate::host::SlotBehavior;

    #[test]
    fn required_positions_match_mode_table() {
        assert_eq!(
            StudyMode::Capture.required_positions(),
            &[PanePosition::Left, PanePosition::Center]
        );
        assert_eq!(
            StudyMode::Recall.required_positions(),
            &[PanePosition::Left, PanePosition::Right]
        );
        assert_eq!(
            StudyMode::Review.required_positions(),
            &[PanePosition::Center, PanePosition::Right]
        );
        assert_eq!(StudyMode::ShowAll.required_positions().len(), 3);
    }

    #[test]
    fn focus_targets_center_or_right() {
        assert_eq!(StudyMode::Capture.focus_position(), PanePosition::Center);
        assert_eq!(StudyMode::ShowAll.focus_position(), PanePosition::Center);
        assert_eq!(StudyMode::Recall.focus_position(), PanePosition::Right);
        assert_eq!(StudyMode::Review.focus_position(), PanePosition::Right);
    }

    #[test]
    fn recall_presents_cues_read_only_by_default() {
        assert_eq!(
            StudyMode::Recall.nominal_behavior(PanePosition::Left),
            SlotBehavior::Preview
        );
        assert_eq!(
            StudyMode::Recall.nominal_behavior(PanePosition::Right),
            SlotBehavior::Edit
        );
        assert_eq!(
            StudyMode::ShowAll.nominal_behavior(PanePosition::Left),
            SlotBehavior::Edit
        );
    }

    #[test]
    fn mode_serializes_kebab_case() {
        let json = serde_json::to_string(&StudyMode::ShowAll).expect("mode should serialize");
        assert_eq!(json, "\"show-all\"");
        let back: StudyMode = serde_json::from_str("\"capture\"").expect("mode should parse");
        assert_eq!(back, StudyMode::Capture);
    }
}
