//! Domain model types shared across the core.
//!
//! # Responsibility
//! - Define footnote records, document identity/role rules and study modes.
//! - Keep these types free of host and I/O concerns.

pub mod footnote;
pub mod mode;
pub mod note_info;
