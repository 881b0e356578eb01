//! Moving along a sequence: reading a note's links and following them.
//!
//! [`NavigationBar`] models the prev/next buttons shown for the active note.
//! It is refreshed whenever the active note changes ([`NavigationBar::set_active`])
//! or when a store reports that the active note was rewritten
//! ([`NavigationBar::subscribe`]).

use std::sync::{Arc, Mutex, PoisonError, Weak};

use thiserror::Error;
use tracing::{debug, instrument};

use crate::event::{DocumentChanged, Listener, ListenerList};
use crate::frontmatter::{read_field, Link, LinkKey};
use crate::storage::{self, resolve_link, DocumentIndex, DocumentRef, DocumentStore};

/// The raw `prev` and `next` values of a note's header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceLinks {
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl SequenceLinks {
    pub fn parse(content: &str) -> Self {
        SequenceLinks {
            prev: read_field(content, LinkKey::Prev),
            next: read_field(content, LinkKey::Next),
        }
    }

    pub fn get(&self, key: LinkKey) -> Option<&str> {
        match key {
            LinkKey::Prev => self.prev.as_deref(),
            LinkKey::Next => self.next.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prev.is_none() && self.next.is_none()
    }
}

/// One navigation button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavButton {
    pub direction: LinkKey,
    /// The stored header value, decoration included.
    pub target: String,
}

impl NavButton {
    pub fn icon(&self) -> &'static str {
        match self.direction {
            LinkKey::Prev => "arrow-big-left",
            LinkKey::Next => "arrow-big-right",
        }
    }

    pub fn label(&self) -> &'static str {
        match self.direction {
            LinkKey::Prev => "Previous note",
            LinkKey::Next => "Next note",
        }
    }
}

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("Storage error")]
    Store(#[from] storage::Error),
}

/// Resolves a stored link value to the note it names.
///
/// Unresolvable values are `NotFound`, carrying the value as stored so it can
/// be shown to the user.
pub async fn resolve_target<I>(index: &I, target: &str) -> Result<DocumentRef, NavigationError>
where
    I: DocumentIndex + ?Sized,
{
    let link = Link::parse(target).ok_or_else(|| NavigationError::NotFound(target.to_string()))?;
    resolve_link(index, link.target())
        .await?
        .ok_or_else(|| NavigationError::NotFound(target.to_string()))
}

#[derive(Debug, Clone)]
struct ActiveNote {
    document: DocumentRef,
    links: SequenceLinks,
}

/// Prev/next buttons for the active note.
#[derive(Debug, Default)]
pub struct NavigationBar {
    active: Mutex<Option<ActiveNote>>,
}

impl NavigationBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `document` the active note and loads its links.
    #[instrument(skip(self, store), fields(document = %document))]
    pub async fn set_active<S>(&self, store: &S, document: DocumentRef) -> storage::Result<()>
    where
        S: DocumentStore + ?Sized,
    {
        let content = store.read(&document).await?;
        self.show(document, &content);
        Ok(())
    }

    /// Makes `document` the active note using already loaded content.
    pub fn show(&self, document: DocumentRef, content: &str) {
        let links = SequenceLinks::parse(content);
        debug!(document = %document, ?links, "Navigation bar updated");
        *self.lock() = Some(ActiveNote { document, links });
    }

    pub fn clear(&self) {
        *self.lock() = None;
    }

    pub fn active(&self) -> Option<DocumentRef> {
        self.lock().as_ref().map(|note| note.document.clone())
    }

    /// Reloads the links if `document` is the active note.
    ///
    /// Returns whether anything was refreshed.
    pub fn refresh(&self, document: &DocumentRef, content: &str) -> bool {
        let mut active = self.lock();
        match active.as_mut() {
            Some(note) if &note.document == document => {
                note.links = SequenceLinks::parse(content);
                debug!(document = %document, links = ?note.links, "Navigation bar refreshed");
                true
            }
            _ => false,
        }
    }

    /// Buttons for the active note: prev first, then next, each only if set.
    pub fn buttons(&self) -> Vec<NavButton> {
        let active = self.lock();
        let Some(note) = active.as_ref() else {
            return Vec::new();
        };

        [LinkKey::Prev, LinkKey::Next]
            .into_iter()
            .filter_map(|direction| {
                note.links.get(direction).map(|target| NavButton {
                    direction,
                    target: target.to_string(),
                })
            })
            .collect()
    }

    /// Refreshes this bar whenever a document in `events` changes.
    ///
    /// The subscription lasts as long as the returned handle.
    pub fn subscribe(self: &Arc<Self>, events: &ListenerList<DocumentChanged>) -> Listener<DocumentChanged> {
        let bar: Weak<NavigationBar> = Arc::downgrade(self);
        Listener::new(events, move |event: &DocumentChanged| {
            if let Some(bar) = bar.upgrade() {
                bar.refresh(&event.document, &event.content);
            }
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<ActiveNote>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::edit_field;
    use crate::storage::MemoryStore;

    fn doc(path: &str) -> DocumentRef {
        DocumentRef::new(path).unwrap()
    }

    #[test]
    fn parses_links_from_header_only() {
        let links = SequenceLinks::parse("---\nprev: \"[[A]]\"\ntags: x\n---\nnext: \"[[B]]\"\n");
        assert_eq!(links.prev.as_deref(), Some("\"[[A]]\""));
        assert_eq!(links.next, None);
        assert!(SequenceLinks::parse("no header").is_empty());
    }

    #[test]
    fn buttons_follow_prev_next_order() {
        let bar = NavigationBar::new();
        assert!(bar.buttons().is_empty());

        bar.show(doc("X.md"), "---\nnext: \"[[B]]\"\nprev: \"[[A]]\"\n---\n");
        let buttons = bar.buttons();
        assert_eq!(buttons.len(), 2);
        assert_eq!(buttons[0].direction, LinkKey::Prev);
        assert_eq!(buttons[0].icon(), "arrow-big-left");
        assert_eq!(buttons[1].target, "\"[[B]]\"");
        assert_eq!(buttons[1].icon(), "arrow-big-right");

        bar.show(doc("Y.md"), "plain");
        assert!(bar.buttons().is_empty());
        assert_eq!(bar.active(), Some(doc("Y.md")));

        bar.clear();
        assert_eq!(bar.active(), None);
    }

    #[test]
    fn refresh_ignores_other_documents() {
        let bar = NavigationBar::new();
        bar.show(doc("X.md"), "");
        assert!(!bar.refresh(&doc("Y.md"), "---\nnext: \"[[B]]\"\n---\n"));
        assert!(bar.buttons().is_empty());
        assert!(bar.refresh(&doc("X.md"), "---\nnext: \"[[B]]\"\n---\n"));
        assert_eq!(bar.buttons().len(), 1);
    }

    #[tokio::test]
    async fn subscribed_bar_follows_edits() {
        let store = MemoryStore::new();
        store.insert(doc("X.md"), "Body").await;
        let bar = Arc::new(NavigationBar::new());
        let listener = bar.subscribe(&store.on.document_changed);

        bar.set_active(&store, doc("X.md")).await.unwrap();
        assert!(bar.buttons().is_empty());

        edit_field(&store, &doc("X.md"), LinkKey::Next, "\"[[Y]]\"").await.unwrap();
        assert_eq!(
            bar.buttons(),
            vec![NavButton { direction: LinkKey::Next, target: "\"[[Y]]\"".to_string() }]
        );

        drop(listener);
        edit_field(&store, &doc("X.md"), LinkKey::Prev, "\"[[W]]\"").await.unwrap();
        assert_eq!(bar.buttons().len(), 1);
    }

    #[tokio::test]
    async fn resolves_or_reports_targets() {
        let store = MemoryStore::new();
        store.insert(doc("Book/Chapter 1.md"), "").await;

        let resolved = resolve_target(&store, "\"[[Chapter 1]]\"").await.unwrap();
        assert_eq!(resolved, doc("Book/Chapter 1.md"));

        let err = resolve_target(&store, "\"[[Chapter 2]]\"").await.unwrap_err();
        assert!(matches!(&err, NavigationError::NotFound(t) if t == "\"[[Chapter 2]]\""));
        assert_eq!(err.to_string(), "Note not found: \"[[Chapter 2]]\"");

        assert!(matches!(resolve_target(&store, "\"\"").await, Err(NavigationError::NotFound(_))));
    }
}
