//! Document storage: where note content is read from and written back to.
//!
//! The frontmatter editor only needs two things from storage: read the full
//! text of a document, and replace it in one piece. That contract is the
//! [`DocumentStore`] trait. Resolution and suggestions additionally need to
//! enumerate documents, which is what [`DocumentIndex`] adds.
//!
//! # Core Concepts
//!
//! *   **[`DocumentRef`]:** A stable, vault-relative identity for one note, such as
//!     `Book/Chapter 1.md`. Always uses `/` separators and never escapes the vault.
//! *   **[`Vault`]:** A directory of markdown notes on disk. It contains a special
//!     `.sequencer` subdirectory holding `config.json` with the vault id and the
//!     user's settings. Vaults are [`Vault::create`]d once and [`Vault::open`]ed
//!     afterwards.
//! *   **[`MemoryStore`]:** An in-memory store with the same behavior, for tests and
//!     for embedding the editor where notes do not live on disk.
//!
//! # Writes
//!
//! A write always replaces the whole document. The vault writes to a temporary
//! sibling file and renames it over the target, so readers observe either the
//! old or the new content and never a partial write. There is no locking: when
//! two writes race, the last one wins.
//!
//! Every successful write is announced on the store's `on.document_changed`
//! listener list (see [`crate::event`]).
//!
//! # Asynchronous API
//!
//! All I/O is `async` and runs on `tokio`. Fallible operations return
//! [`Result<T>`], with [`Error`] describing what went wrong.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use sequencer_core::storage::{DocumentStore, Vault};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let vault = Vault::create("my-notes").await?;
//!     let doc = vault.create_document("Chapter 1").await?;
//!     vault.write(&doc, "# Chapter 1\n").await?;
//!     assert_eq!(vault.read(&doc).await?, "# Chapter 1\n");
//!     Ok(())
//! }
//! ```

pub use self::document::DocumentRef;
pub use self::memory::MemoryStore;
pub use self::resolve::{resolve_link, resolve_link_in, unresolved_links};
pub use self::vault::Vault;

mod document;
mod memory;
mod metadata;
mod resolve;
mod vault;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

pub const INTERNAL_DIR_NAME: &str = ".sequencer";
pub const VAULT_CONFIG_FILENAME: &str = "config.json";
pub const NOTE_EXTENSION: &str = "md";

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Vault configuration serialization/deserialization error")]
    Config(#[from] serde_json::Error),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Document already exists: {0}")]
    DocumentExists(String),

    #[error("Invalid document path: {0}")]
    InvalidDocumentPath(String),

    #[error("Path is outside the vault: {0}")]
    PathOutsideVault(PathBuf),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Path is not a valid vault (missing '.sequencer' subdirectory): {0}")]
    NotAVault(PathBuf),

    #[error("Cannot create vault: '.sequencer' already exists in {0}")]
    VaultCreationConflict(PathBuf),

    #[error("Cannot create vault: path exists and is a file: {0}")]
    PathIsFile(PathBuf),

    #[error("Vault configuration file is missing or invalid: {0}")]
    InvalidVaultConfig(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Whole-content access to documents.
///
/// Implementations must make `write` all-or-nothing from the caller's point
/// of view. No ordering is promised between concurrent calls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the current full text of `document`.
    async fn read(&self, document: &DocumentRef) -> Result<String>;

    /// Replaces the full text of `document` with `content`.
    async fn write(&self, document: &DocumentRef, content: &str) -> Result<()>;
}

/// Enumeration of the documents a store holds.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// All documents, sorted by path.
    async fn list_documents(&self) -> Result<Vec<DocumentRef>>;
}
