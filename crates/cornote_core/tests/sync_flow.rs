//! End-to-end sync behavior over the in-memory hosts.

mod common;

use common::Harness;
use cornote_core::host::{SlotBehavior, ViewHost};
use cornote_core::sync::SkipReason;
use cornote_core::{SyncError, SyncOutcome, SyncTrigger};

const SOURCE: &str = "## MAIN\nSee [^a] and [^b].\n\n[^a]: x\n[^b]: y\n";

#[test]
fn source_to_cue_mirrors_definitions_without_main_section() {
    let h = Harness::new();
    h.docs.insert("note.md", SOURCE);
    let mut session = h.session();

    let outcome = session
        .sync_source_to_cue("note.md", SyncTrigger::Manual)
        .expect("sync should run");
    assert_eq!(outcome, SyncOutcome::Updated);

    let cue = h.docs.text("note-cue.md").expect("cue created");
    assert!(cue.starts_with("[[note]]\n"));
    assert!(cue.contains("## CUE"));
    assert!(!cue.contains("## MAIN"));
    assert_eq!(cue.matches("[^a]: x").count(), 1);
    assert_eq!(cue.matches("[^b]: y").count(), 1);
    // References stay in the Source; only definitions cross over.
    assert!(!cue.contains("See [^a]"));
}

#[test]
fn cue_edits_flow_back_and_keep_source_references() {
    let h = Harness::new();
    h.docs.insert("note.md", SOURCE);
    let mut session = h.session();
    session
        .sync_source_to_cue("note.md", SyncTrigger::Manual)
        .expect("initial sync");

    let edited = h
        .docs
        .text("note-cue.md")
        .expect("cue created")
        .replace("[^a]: x", "[^a]: x2");
    h.docs.insert("note-cue.md", &edited);

    let outcome = session
        .sync_cue_to_source("note-cue.md", SyncTrigger::Manual)
        .expect("writeback should run");
    assert_eq!(outcome, SyncOutcome::Updated);

    let source = h.docs.text("note.md").expect("source present");
    assert!(source.contains("See [^a] and [^b]."));
    assert!(source.contains("[^a]: x2"));
    assert!(source.contains("[^b]: y"));
    assert!(source.ends_with("\n"));
}

#[test]
fn round_trip_without_edits_reports_unchanged() {
    let h = Harness::new();
    h.docs.insert("note.md", SOURCE);
    let mut session = h.session();

    session
        .sync_source_to_cue("note.md", SyncTrigger::Manual)
        .expect("first pass");
    assert_eq!(
        session.sync_source_to_cue("note.md", SyncTrigger::Manual),
        Ok(SyncOutcome::Unchanged)
    );
    assert_eq!(
        session.sync_cue_to_source("note-cue.md", SyncTrigger::Manual),
        Ok(SyncOutcome::Unchanged)
    );
    assert_eq!(h.docs.text("note.md").as_deref(), Some(SOURCE));
}

#[test]
fn unreferenced_definitions_are_pruned_from_cue_only_when_enabled() {
    let h = Harness::new();
    h.docs
        .insert("note.md", "Body with [^keep].\n\n[^keep]: a\n[^gone]: b\n");
    let mut session = h.session();
    session.settings_mut().delete_definitions_on_reference_delete = true;

    session
        .sync_source_to_cue("note.md", SyncTrigger::Manual)
        .expect("sync should run");

    let cue = h.docs.text("note-cue.md").expect("cue created");
    assert!(cue.contains("[^keep]: a"));
    assert!(!cue.contains("[^gone]"));
    // Pruning is a Cue-side policy; the Source keeps its definition.
    assert_eq!(
        h.docs.text("note.md").as_deref(),
        Some("Body with [^keep].\n\n[^keep]: a\n[^gone]: b\n")
    );
}

#[test]
fn cue_creation_failure_clears_the_stored_pointer() {
    let h = Harness::new();
    h.docs.insert("note.md", SOURCE);
    h.docs.fail_creation_of("note-cue.md");
    let mut session = h.session();

    let result = session.sync_source_to_cue("note.md", SyncTrigger::Manual);
    assert_eq!(
        result,
        Err(SyncError::CueUnresolvable("note-cue.md".to_string()))
    );
    assert_eq!(
        session
            .registry()
            .get("note.md")
            .and_then(|info| info.cue_id.clone()),
        None
    );
    // The register is released on the failure path too.
    assert_eq!(session.activity(), cornote_core::Activity::Idle);
}

#[test]
fn writeback_fails_when_no_source_can_be_resolved() {
    let h = Harness::new();
    h.docs.insert("orphan-cue.md", "[^c1]: lonely\n");
    let mut session = h.session();

    let result = session.sync_cue_to_source("orphan-cue.md", SyncTrigger::Manual);
    assert_eq!(
        result,
        Err(SyncError::SourceNotFound("orphan-cue.md".to_string()))
    );
}

#[test]
fn failed_cue_write_commits_no_registry_timestamp() {
    let h = Harness::new();
    h.docs.insert("note.md", SOURCE);
    h.docs.fail_writes_to("note-cue.md");
    let mut session = h.session();

    let result = session.sync_source_to_cue("note.md", SyncTrigger::Manual);
    assert!(matches!(result, Err(SyncError::Host(_))));
    assert_eq!(
        session
            .registry()
            .get("note.md")
            .and_then(|info| info.last_sync_source_to_cue),
        None
    );
    assert!(h.state.saved().is_none());
}

#[test]
fn preview_slot_is_refreshed_only_when_content_changed() {
    let h = Harness::new();
    h.docs.insert("note.md", SOURCE);
    let slot = h.views.preopen_slot("note-cue.md");
    h.views
        .set_behavior(slot, SlotBehavior::Preview)
        .expect("behavior");
    let mut session = h.session();

    session
        .sync_source_to_cue("note.md", SyncTrigger::Manual)
        .expect("first pass");
    assert_eq!(h.views.refresh_count(slot), 1);

    session
        .sync_source_to_cue("note.md", SyncTrigger::Manual)
        .expect("second pass");
    assert_eq!(h.views.refresh_count(slot), 1);
}

#[test]
fn auto_sync_is_debounced_and_grace_guarded() {
    let h = Harness::new();
    h.docs.insert("note.md", SOURCE);
    let mut session = h.session();

    assert_eq!(
        session.on_document_modified("note.md"),
        Ok(SyncOutcome::Updated)
    );
    // Within the post-sync grace window the event is stale.
    assert_eq!(
        session.on_document_modified("note.md"),
        Ok(SyncOutcome::Skipped(SkipReason::Cooldown))
    );

    h.clock.advance(500);
    assert_eq!(
        session.on_document_modified("note.md"),
        Ok(SyncOutcome::Unchanged)
    );

    h.clock.advance(100);
    assert_eq!(
        session.on_document_modified("note.md"),
        Ok(SyncOutcome::Skipped(SkipReason::Cooldown))
    );
}

#[test]
fn registry_survives_a_restart_through_the_state_store() {
    let h = Harness::new();
    h.docs.insert("note.md", SOURCE);
    let mut first = h.session();
    first
        .sync_source_to_cue("note.md", SyncTrigger::Manual)
        .expect("sync should run");
    first.shutdown();

    let second = h.session();
    let info = second
        .registry()
        .get("note.md")
        .expect("entry restored from blob");
    assert_eq!(info.cue_id.as_deref(), Some("note-cue.md"));
    assert_eq!(info.last_sync_source_to_cue, Some(100_000));
}
