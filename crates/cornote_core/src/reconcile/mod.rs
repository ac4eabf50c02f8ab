//! Pure content reconciliation for Cue and Source documents.
//!
//! Both entry points are deterministic text functions: running either one
//! twice on its own output with the same inputs is a no-op.

pub mod cue;
pub mod order;
pub mod source;

pub use cue::{build_cue_content, initial_cue_text, initial_summary_text, CUE_ACTION_BLOCK};
pub use order::natural_cmp;
pub use source::rebuild_source_content;

/// Emits one definition block: head line plus two-space indented
/// continuation lines, so the output re-parses into the same body.
pub(crate) fn render_definition(ref_id: &str, body: &str) -> String {
    let mut lines = body.lines();
    let head = lines.next().unwrap_or_default();
    let mut rendered = format!("[^{ref_id}]: {head}");
    for continuation in lines {
        rendered.push_str("\n  ");
        rendered.push_str(continuation);
    }
    rendered
}

/// Collapses runs of three or more consecutive blank lines to exactly one.
pub(crate) fn collapse_blank_runs(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut blanks = 0usize;
    let mut pending: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            blanks += 1;
            pending.push(line);
        } else {
            if blanks >= 3 {
                out.push("");
            } else {
                out.append(&mut pending);
            }
            pending.clear();
            blanks = 0;
            out.push(line);
        }
    }
    if blanks >= 3 {
        out.push("");
    } else {
        out.append(&mut pending);
    }
    let mut collapsed = out.join("\n");
    if text.ends_with('\n') && !collapsed.ends_with('\n') {
        collapsed.push('\n');
    }
    collapsed
}
