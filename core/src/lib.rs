//! Prev/next sequencing links between notes, stored in each note's header.
//!
//! The heart of the crate is [`frontmatter`], which rewrites the header block
//! of a note without disturbing anything else in it, and [`edit`], which runs
//! that rewrite against a [`storage::DocumentStore`].

pub mod edit;
pub mod event;
pub mod frontmatter;
pub mod navigation;
pub mod settings;
pub mod storage;
pub mod suggest;

pub use edit::{edit_field, link_notes, EditError, LinkOutcome};
pub use frontmatter::{Link, LinkKey};
pub use settings::SequencerSettings;
