//! Source document rebuilder.
//!
//! # Responsibility
//! - Rewrite the Source against an authoritative definition map: remove
//!   existing definition blocks, optionally strip orphaned references,
//!   re-append the full sorted definition block at the end.
//!
//! # Invariants
//! - Body text other than footnote markers and definition blocks is never
//!   touched.
//! - Exactly one blank line separates the body from the definition block;
//!   trailing whitespace collapses to a single newline.
//! - Output is stable under re-application (idempotent).

use crate::parser::{parse_footnotes, reference_regex};
use crate::reconcile::order::natural_cmp;
use crate::reconcile::render_definition;
use log::warn;
use std::collections::{BTreeMap, BTreeSet};

/// Rebuilds Source content from the authoritative definition map.
///
/// Refs present in the body but absent from `definitions` are orphans:
/// when `delete_orphan_references` is set their in-body markers are
/// stripped. The `move_to_end = false` placement policy is unspecified and
/// intentionally not implemented; the rebuilt block is always appended at
/// the end and a warning is logged when the flag is off.
pub fn rebuild_source_content(
    source_text: &str,
    definitions: &BTreeMap<String, String>,
    delete_orphan_references: bool,
    move_to_end: bool,
) -> String {
    if !move_to_end {
        warn!(
            "event=rebuild_source module=reconcile status=warn \
             detail=move_footnotes_to_end_off_not_supported placement=append_at_end"
        );
    }

    let parsed = parse_footnotes(source_text);

    // Body without definition blocks.
    let mut body = String::with_capacity(source_text.len());
    let mut cursor = 0;
    for definition in &parsed.definitions {
        if definition.span.start > cursor {
            body.push_str(&source_text[cursor..definition.span.start]);
        }
        cursor = cursor.max(definition.span.end);
    }
    if cursor < source_text.len() {
        body.push_str(&source_text[cursor..]);
    }

    if delete_orphan_references {
        let orphaned: BTreeSet<&String> = parsed
            .references
            .iter()
            .map(|reference| &reference.ref_id)
            .filter(|ref_id| !definitions.contains_key(*ref_id))
            .collect();
        for ref_id in orphaned {
            body = reference_regex(ref_id).replace_all(&body, "").into_owned();
        }
    }

    let mut out = body.trim_end().to_string();
    if !definitions.is_empty() {
        let mut refs: Vec<&String> = definitions.keys().collect();
        refs.sort_by(|a, b| natural_cmp(a, b));

        out.push_str("\n\n");
        let rendered: Vec<String> = refs
            .iter()
            .map(|ref_id| render_definition(ref_id, &definitions[*ref_id]))
            .collect();
        out.push_str(&rendered.join("\n"));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::rebuild_source_content;
    use std::collections::BTreeMap;

    fn defs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(ref_id, body)| (ref_id.to_string(), body.to_string()))
            .collect()
    }

    #[test]
    fn definitions_move_to_a_single_sorted_tail_block() {
        let source = "[^b]: old beta\nIntro [^a] then [^b].\n\n[^a]: old alpha\n";
        let rebuilt = rebuild_source_content(
            source,
            &defs(&[("a", "new alpha"), ("b", "new beta")]),
            false,
            true,
        );
        assert_eq!(
            rebuilt,
            "Intro [^a] then [^b].\n\n[^a]: new alpha\n[^b]: new beta\n"
        );
    }

    #[test]
    fn orphan_references_are_kept_unless_policy_enabled() {
        let source = "See [^gone] and [^kept].\n\n[^kept]: body\n";
        let kept = rebuild_source_content(source, &defs(&[("kept", "body")]), false, true);
        assert!(kept.contains("[^gone]"));

        let stripped = rebuild_source_content(source, &defs(&[("kept", "body")]), true, true);
        assert!(!stripped.contains("[^gone]"));
        assert!(stripped.contains("[^kept]"));
    }

    #[test]
    fn refs_with_regex_metacharacters_strip_literally() {
        let source = "Pair [^a.b] and [^axb].\n";
        let rebuilt = rebuild_source_content(source, &defs(&[("axb", "x")]), true, true);
        assert!(!rebuilt.contains("[^a.b]"));
        assert!(rebuilt.contains("[^axb]"), "literal dot must not match x");
    }

    #[test]
    fn brand_new_definitions_are_appended() {
        let source = "Body only.\n";
        let rebuilt = rebuild_source_content(source, &defs(&[("n1", "added")]), false, true);
        assert_eq!(rebuilt, "Body only.\n\n[^n1]: added\n");
    }

    #[test]
    fn empty_definition_map_leaves_plain_body() {
        let source = "Body.\n\n[^a]: dropped\n";
        let rebuilt = rebuild_source_content(source, &BTreeMap::new(), false, true);
        assert_eq!(rebuilt, "Body.\n");
    }

    #[test]
    fn rebuild_is_idempotent() {
        let source = "Heading\n\nUse [^c2] and [^c10].\n\n[^c10]: ten\n[^c2]: two\n";
        let map = defs(&[("c2", "two"), ("c10", "ten\ncontinued")]);
        for flag in [false, true] {
            let once = rebuild_source_content(source, &map, flag, true);
            let twice = rebuild_source_content(&once, &map, flag, true);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn flag_off_still_appends_at_end() {
        let source = "Body [^a].\n\n[^a]: x\n";
        let rebuilt = rebuild_source_content(source, &defs(&[("a", "x")]), false, false);
        assert!(rebuilt.ends_with("[^a]: x\n"));
    }

    #[test]
    fn multiline_bodies_round_trip_through_rebuild() {
        let map = defs(&[("a", "first\nsecond")]);
        let once = rebuild_source_content("Body [^a].\n", &map, false, true);
        assert!(once.contains("[^a]: first\n  second\n"));
        let twice = rebuild_source_content(&once, &map, false, true);
        assert_eq!(once, twice);
    }
}
