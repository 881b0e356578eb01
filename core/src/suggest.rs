//! Items offered by the note picker when linking.

use std::fmt;

use tracing::debug;

use crate::frontmatter::Link;
use crate::settings::SequencerSettings;
use crate::storage::{self, unresolved_links, DocumentIndex, DocumentRef, DocumentStore};

/// A note the user can link to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    /// An existing note.
    File(DocumentRef),
    /// A name with no note behind it yet.
    Unresolved(String),
}

impl Suggestion {
    /// The text a link to this suggestion uses.
    pub fn linktext(&self) -> &str {
        match self {
            Suggestion::File(document) => document.basename(),
            Suggestion::Unresolved(name) => name,
        }
    }

    /// The quoted header value for a link to this suggestion.
    pub fn link_value(&self) -> String {
        Link::new(self.linktext()).to_field_value()
    }

    /// Case-insensitive subsequence match of `query` against the link text.
    pub fn matches(&self, query: &str) -> bool {
        let mut haystack = self.linktext().chars().flat_map(char::to_lowercase);
        query
            .chars()
            .flat_map(char::to_lowercase)
            .filter(|c| !c.is_whitespace())
            .all(|needle| haystack.any(|c| c == needle))
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::File(document) => write!(f, "{}", document.basename()),
            Suggestion::Unresolved(name) => write!(f, "{} (new note)", name),
        }
    }
}

/// Builds the picker items for linking from `current`.
///
/// Existing notes come first (only those in `current`'s folder when
/// `only_sibling_files` is set), then names that other notes link to but
/// that do not exist. A non-empty `query` with no exact match is offered as a
/// new name at the end. Only items matching `query` are returned.
pub async fn build_suggestions<S>(
    store: &S,
    current: &DocumentRef,
    query: &str,
    settings: &SequencerSettings,
) -> storage::Result<Vec<Suggestion>>
where
    S: DocumentStore + DocumentIndex + ?Sized,
{
    let query = query.trim();

    let mut suggestions: Vec<Suggestion> = store
        .list_documents()
        .await?
        .into_iter()
        .filter(|document| document != current)
        .filter(|document| !settings.only_sibling_files || document.folder() == current.folder())
        .map(Suggestion::File)
        .collect();

    for name in unresolved_links(store).await? {
        if !suggestions.iter().any(|s| s.linktext() == name) {
            suggestions.push(Suggestion::Unresolved(name));
        }
    }

    if !query.is_empty() && !suggestions.iter().any(|s| s.linktext() == query) {
        suggestions.push(Suggestion::Unresolved(query.to_string()));
    }

    suggestions.retain(|s| s.matches(query));
    debug!(count = suggestions.len(), query, "Built suggestions");
    Ok(suggestions)
}
