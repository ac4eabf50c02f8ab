//! Footnote definition/reference parser.
//!
//! # Responsibility
//! - Extract `[^ref]: body` definitions (with indented continuation lines)
//!   and `[^ref]` references from raw text.
//!
//! # Invariants
//! - Pure and deterministic; no state, no side effects.
//! - Ref ids are matched literally: any later text search built from a ref
//!   must go through [`reference_regex`], which escapes regex
//!   metacharacters.

use crate::model::footnote::{FootnoteDefinition, FootnoteReference, ParsedFootnotes};
use once_cell::sync::Lazy;
use regex::Regex;

static DEFINITION_LINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*\[\^([^\]\r\n]+)\]:[ \t]?(.*)$").expect("valid definition regex")
});
static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\^([^\]\r\n]+)\]").expect("valid reference regex"));
static CONTINUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?: {2,}|\t)\S").expect("valid continuation regex"));

/// Extracts all footnote definitions and references from `text`.
///
/// A definition is a line starting (after optional leading whitespace) with
/// `[^ref]:`; its body continues on subsequent lines indented by two or
/// more spaces or a tab. A reference is any `[^ref]` occurrence not
/// immediately followed by `:`. Absence of matches yields empty vectors.
pub fn parse_footnotes(text: &str) -> ParsedFootnotes {
    let mut lines: Vec<(usize, &str)> = Vec::new();
    let mut offset = 0;
    for raw in text.split_inclusive('\n') {
        lines.push((offset, raw));
        offset += raw.len();
    }

    let mut definitions = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        let (start, raw) = lines[index];
        let line = raw.trim_end_matches(['\n', '\r']);
        let Some(caps) = DEFINITION_LINE_RE.captures(line) else {
            index += 1;
            continue;
        };

        let ref_id = caps[1].trim().to_string();
        let mut body_lines = vec![caps[2].trim().to_string()];
        let mut end = start + raw.len();
        let mut next = index + 1;
        while next < lines.len() {
            let (continuation_start, continuation_raw) = lines[next];
            let continuation = continuation_raw.trim_end_matches(['\n', '\r']);
            if !CONTINUATION_RE.is_match(continuation)
                || DEFINITION_LINE_RE.is_match(continuation)
            {
                break;
            }
            body_lines.push(continuation.trim().to_string());
            end = continuation_start + continuation_raw.len();
            next += 1;
        }

        let body = body_lines.join("\n").trim().to_string();
        definitions.push(FootnoteDefinition {
            ref_id,
            body,
            span: start..end,
        });
        index = next;
    }

    let mut references = Vec::new();
    for caps in REFERENCE_RE.captures_iter(text) {
        let Some(marker) = caps.get(0) else { continue };
        // A trailing colon makes the occurrence a definition head, not a
        // reference.
        if text[marker.end()..].starts_with(':') {
            continue;
        }
        references.push(FootnoteReference {
            ref_id: caps[1].trim().to_string(),
            span: marker.start()..marker.end(),
        });
    }

    ParsedFootnotes {
        definitions,
        references,
    }
}

/// Builds a regex matching the literal `[^ref]` marker for one ref id.
///
/// The ref is escaped first, so ids containing regex metacharacters match
/// literally.
pub fn reference_regex(ref_id: &str) -> Regex {
    let pattern = format!(r"\[\^{}\]", regex::escape(ref_id));
    Regex::new(&pattern).expect("escaped marker pattern is always valid")
}
