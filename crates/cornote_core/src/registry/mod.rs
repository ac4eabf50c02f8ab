//! Source → derived-document registry.

pub mod note_info_registry;

pub use note_info_registry::{NoteInfoRegistry, RebuildReport};
