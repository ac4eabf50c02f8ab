//! Footnote extraction from raw document text.

pub mod footnotes;

pub use footnotes::{parse_footnotes, reference_regex};
