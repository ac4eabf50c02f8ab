//! Cue document builder.
//!
//! # Responsibility
//! - Rebuild Cue content from an authoritative definition map while
//!   preserving the user's header portion.
//!
//! # Invariants
//! - The header (everything before the first definition or the action
//!   block) survives untouched apart from the guaranteed back-link.
//! - Definitions are emitted in natural ref order.
//! - Output is stable under re-application (idempotent).

use crate::parser::parse_footnotes;
use crate::reconcile::order::natural_cmp;
use crate::reconcile::{collapse_blank_runs, render_definition};
use crate::settings::Settings;
use std::collections::BTreeMap;

/// Interaction placeholder appended after the definitions. The host's
/// renderer turns this fence into reveal/conceal buttons.
pub const CUE_ACTION_BLOCK: &str = "```cornote-actions\nreveal-all conceal-all\n```";

const CUE_ACTION_FENCE: &str = "```cornote-actions";

/// Header written into a freshly created Cue document.
pub fn initial_cue_text(source_title: &str, settings: &Settings) -> String {
    format!(
        "{}\n\n## CUE\n",
        settings.render_source_link(source_title)
    )
}

/// Header written into a freshly created Summary document.
pub fn initial_summary_text(source_title: &str, cue_title: &str, settings: &Settings) -> String {
    format!(
        "{}\n{}\n\n## SUMMARY\n",
        settings.render_source_link(source_title),
        settings.render_cue_link(cue_title)
    )
}

/// Rebuilds Cue content from the authoritative definition map.
///
/// Preserves the existing header, guarantees a back-link to the Source,
/// emits definitions sorted naturally by ref, appends the interaction
/// block when at least one definition exists, and collapses runs of three
/// or more blank lines to one.
pub fn build_cue_content(
    existing_cue: &str,
    source_title: &str,
    definitions: &BTreeMap<String, String>,
    settings: &Settings,
) -> String {
    let mut header = header_of(existing_cue).trim_end().to_string();

    let source_link = settings.render_source_link(source_title);
    if header.is_empty() {
        header = format!("{source_link}\n\n## CUE");
    } else if !header.contains(&source_link) {
        header = format!("{source_link}\n\n{header}");
    }

    let mut out = header;
    if !definitions.is_empty() {
        let mut refs: Vec<&String> = definitions.keys().collect();
        refs.sort_by(|a, b| natural_cmp(a, b));

        out.push_str("\n\n");
        let rendered: Vec<String> = refs
            .iter()
            .map(|ref_id| render_definition(ref_id, &definitions[*ref_id]))
            .collect();
        out.push_str(&rendered.join("\n"));
        out.push_str("\n\n");
        out.push_str(CUE_ACTION_BLOCK);
    }
    out.push('\n');

    collapse_blank_runs(&out)
}

/// Content before the first definition or the action block, whichever
/// comes first; the whole text when neither exists.
fn header_of(existing_cue: &str) -> &str {
    let first_definition = parse_footnotes(existing_cue)
        .definitions
        .first()
        .map(|definition| definition.span.start);
    let fence = existing_cue.find(CUE_ACTION_FENCE);
    let cut = match (first_definition, fence) {
        (Some(definition), Some(fence)) => definition.min(fence),
        (Some(definition), None) => definition,
        (None, Some(fence)) => fence,
        (None, None) => existing_cue.len(),
    };
    &existing_cue[..cut]
}
