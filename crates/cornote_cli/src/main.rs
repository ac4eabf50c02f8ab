//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `cornote_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("cornote_core version={}", cornote_core::core_version());

    let parsed = cornote_core::parse_footnotes("See [^c1] and [^c2].\n\n[^c1]: alpha\n[^c2]: beta\n");
    println!(
        "cornote_core parse definitions={} references={}",
        parsed.definitions.len(),
        parsed.references.len()
    );
}
