//! The read-transform-write pipeline behind every link edit.
//!
//! Each call reads the target document from the store, rewrites its header
//! with [`frontmatter::rewrite`], and writes the whole result back. Nothing is
//! cached between calls, so every edit transforms the content of its own
//! read. Failed edits write nothing and are never retried.

use futures::future;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::frontmatter::{self, Link, LinkKey, RewriteError};
use crate::settings::SequencerSettings;
use crate::storage::{self, DocumentRef, DocumentStore};

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Invalid frontmatter in '{document}': header block is never closed (cannot set '{key}')")]
    MalformedHeader { document: DocumentRef, key: LinkKey },

    #[error("Failed to read '{document}' (setting '{key}')")]
    StoreRead {
        document: DocumentRef,
        key: LinkKey,
        #[source]
        source: storage::Error,
    },

    #[error("Failed to write '{document}' (setting '{key}')")]
    StoreWrite {
        document: DocumentRef,
        key: LinkKey,
        #[source]
        source: storage::Error,
    },
}

impl EditError {
    /// The document the failed edit targeted.
    pub fn document(&self) -> &DocumentRef {
        match self {
            EditError::MalformedHeader { document, .. }
            | EditError::StoreRead { document, .. }
            | EditError::StoreWrite { document, .. } => document,
        }
    }

    pub fn key(&self) -> LinkKey {
        match self {
            EditError::MalformedHeader { key, .. }
            | EditError::StoreRead { key, .. }
            | EditError::StoreWrite { key, .. } => *key,
        }
    }
}

/// Sets `key` to `value` in the header of `document`.
///
/// `value` is written as given; use [`Link::to_field_value`] to produce the
/// quoted link form.
#[instrument(skip(store, value), fields(document = %document, key = %key))]
pub async fn edit_field<S>(
    store: &S,
    document: &DocumentRef,
    key: LinkKey,
    value: &str,
) -> Result<(), EditError>
where
    S: DocumentStore + ?Sized,
{
    let content = store.read(document).await.map_err(|source| EditError::StoreRead {
        document: document.clone(),
        key,
        source,
    })?;

    let updated = frontmatter::rewrite(&content, key, value).map_err(|e| match e {
        RewriteError::MalformedHeader => EditError::MalformedHeader {
            document: document.clone(),
            key,
        },
    })?;

    if updated == content {
        debug!("Field already up to date");
    }

    store.write(document, &updated).await.map_err(|source| EditError::StoreWrite {
        document: document.clone(),
        key,
        source,
    })?;

    debug!("Field written");
    Ok(())
}

/// The edits made by [`link_notes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    /// Edited with the requested key.
    pub source: DocumentRef,
    /// Edited with the inverse key, when reciprocal links are on.
    pub reciprocal: Option<DocumentRef>,
}

/// Links `from` to `to` under `key`, and `to` back to `from` under the
/// inverse key when `settings.reciprocal_links` is on.
///
/// The two edits are independent. They run concurrently unless both target
/// the same document, and both run to completion even if one fails; the
/// first error is returned.
#[instrument(skip(store, settings), fields(from = %from, to = %to, key = %key))]
pub async fn link_notes<S>(
    store: &S,
    settings: &SequencerSettings,
    from: &DocumentRef,
    key: LinkKey,
    to: &DocumentRef,
) -> Result<LinkOutcome, EditError>
where
    S: DocumentStore + ?Sized,
{
    let forward_value = Link::new(to.basename()).to_field_value();
    let forward = edit_field(store, from, key, &forward_value);

    if !settings.reciprocal_links {
        forward.await?;
        info!("Linked {} -> {}", from, to);
        return Ok(LinkOutcome { source: from.clone(), reciprocal: None });
    }

    let back_value = Link::new(from.basename()).to_field_value();
    let back = edit_field(store, to, key.inverse(), &back_value);

    let (forward_result, back_result) = if from == to {
        // Same document: each edit must read the other's result
        let forward_result = forward.await;
        (forward_result, back.await)
    } else {
        future::join(forward, back).await
    };
    forward_result?;
    back_result?;

    info!("Linked {} <-> {}", from, to);
    Ok(LinkOutcome {
        source: from.clone(),
        reciprocal: Some(to.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn doc(path: &str) -> DocumentRef {
        DocumentRef::new(path).unwrap()
    }

    const NO_RECIPROCAL: SequencerSettings = SequencerSettings {
        reciprocal_links: false,
        only_sibling_files: true,
    };

    #[tokio::test]
    async fn edit_field_end_to_end() {
        let store = MemoryStore::new();
        store.insert(doc("X.md"), "---\nprev: \"[[A]]\"\n---\nBody text\n").await;

        edit_field(&store, &doc("X.md"), LinkKey::Next, "\"[[B]]\"").await.unwrap();

        assert_eq!(
            store.get(&doc("X.md")).await.unwrap(),
            "---\nprev: \"[[A]]\"\nnext: \"[[B]]\"\n---\nBody text\n"
        );
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn repeated_edit_is_idempotent() {
        let store = MemoryStore::new();
        store.insert(doc("X.md"), "Body\n").await;

        edit_field(&store, &doc("X.md"), LinkKey::Prev, "\"[[A]]\"").await.unwrap();
        let first = store.get(&doc("X.md")).await.unwrap();
        edit_field(&store, &doc("X.md"), LinkKey::Prev, "\"[[A]]\"").await.unwrap();

        assert_eq!(store.get(&doc("X.md")).await.unwrap(), first);
        assert_eq!(first, "---\nprev: \"[[A]]\"\n---\nBody\n");
    }

    #[tokio::test]
    async fn malformed_header_is_never_written() {
        let store = MemoryStore::new();
        let original = "---\nprev: \"[[A]]\"\nBody without a closing delimiter\n";
        store.insert(doc("X.md"), original).await;

        let err = edit_field(&store, &doc("X.md"), LinkKey::Next, "\"[[B]]\"").await.unwrap_err();

        assert!(matches!(err, EditError::MalformedHeader { .. }));
        assert_eq!(err.document(), &doc("X.md"));
        assert_eq!(err.key(), LinkKey::Next);
        assert_eq!(store.get(&doc("X.md")).await.unwrap(), original);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn store_errors_are_tagged() {
        let store = MemoryStore::new();
        let err = edit_field(&store, &doc("Missing.md"), LinkKey::Prev, "x").await.unwrap_err();
        assert!(matches!(
            err,
            EditError::StoreRead { source: storage::Error::DocumentNotFound(_), .. }
        ));

        store.insert(doc("Locked.md"), "Body").await;
        store.reject_writes_to(doc("Locked.md")).await;
        let err = edit_field(&store, &doc("Locked.md"), LinkKey::Prev, "x").await.unwrap_err();
        assert!(matches!(err, EditError::StoreWrite { key: LinkKey::Prev, .. }));
        assert_eq!(store.get(&doc("Locked.md")).await.unwrap(), "Body");
    }

    #[tokio::test]
    async fn reciprocal_link_edits_both_notes() {
        let store = MemoryStore::new();
        store.insert(doc("X.md"), "X body\n").await;
        store.insert(doc("Book/Y.md"), "---\ntags: y\n---\nY body\n").await;

        let outcome = link_notes(
            &store,
            &SequencerSettings::default(),
            &doc("X.md"),
            LinkKey::Next,
            &doc("Book/Y.md"),
        )
        .await
        .unwrap();

        assert_eq!(outcome.reciprocal, Some(doc("Book/Y.md")));
        assert_eq!(
            store.get(&doc("X.md")).await.unwrap(),
            "---\nnext: \"[[Y]]\"\n---\nX body\n"
        );
        assert_eq!(
            store.get(&doc("Book/Y.md")).await.unwrap(),
            "---\ntags: y\nprev: \"[[X]]\"\n---\nY body\n"
        );
    }

    #[tokio::test]
    async fn reciprocal_can_be_disabled() {
        let store = MemoryStore::new();
        store.insert(doc("X.md"), "").await;
        store.insert(doc("Y.md"), "Y").await;

        let outcome = link_notes(&store, &NO_RECIPROCAL, &doc("X.md"), LinkKey::Prev, &doc("Y.md"))
            .await
            .unwrap();

        assert_eq!(outcome.reciprocal, None);
        assert_eq!(store.get(&doc("X.md")).await.unwrap(), "---\nprev: \"[[Y]]\"\n---\n");
        assert_eq!(store.get(&doc("Y.md")).await.unwrap(), "Y");
    }

    #[tokio::test]
    async fn self_link_keeps_both_fields() {
        let store = MemoryStore::new();
        store.insert(doc("Loop.md"), "Body").await;

        link_notes(&store, &SequencerSettings::default(), &doc("Loop.md"), LinkKey::Next, &doc("Loop.md"))
            .await
            .unwrap();

        assert_eq!(
            store.get(&doc("Loop.md")).await.unwrap(),
            "---\nnext: \"[[Loop]]\"\nprev: \"[[Loop]]\"\n---\nBody"
        );
    }

    #[tokio::test]
    async fn failed_reciprocal_edit_still_applies_forward_edit() {
        let store = MemoryStore::new();
        store.insert(doc("X.md"), "").await;
        store.insert(doc("Y.md"), "---\nbroken header\n").await;

        let err = link_notes(&store, &SequencerSettings::default(), &doc("X.md"), LinkKey::Next, &doc("Y.md"))
            .await
            .unwrap_err();

        assert!(matches!(err, EditError::MalformedHeader { key: LinkKey::Prev, .. }));
        assert_eq!(err.document(), &doc("Y.md"));
        assert_eq!(store.get(&doc("X.md")).await.unwrap(), "---\nnext: \"[[Y]]\"\n---\n");
        assert_eq!(store.get(&doc("Y.md")).await.unwrap(), "---\nbroken header\n");
    }
}
