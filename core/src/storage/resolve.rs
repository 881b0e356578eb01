use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::frontmatter::extract_wikilinks;
use crate::storage::{DocumentIndex, DocumentRef, DocumentStore, Result, NOTE_EXTENSION};

/// Picks the document a link text points to.
///
/// Link text with a `/` is matched against the vault-relative path (with or
/// without the `.md` extension). Plain names match by basename; when several
/// notes share it, the shallowest wins, then the first by path.
pub fn resolve_link_in<'a>(documents: &'a [DocumentRef], linktext: &str) -> Option<&'a DocumentRef> {
    let text = linktext.trim();
    let text = text.strip_prefix("./").unwrap_or(text);
    let suffix = format!(".{}", NOTE_EXTENSION);
    let text = text.strip_suffix(suffix.as_str()).unwrap_or(text);
    if text.is_empty() {
        return None;
    }

    if text.contains('/') {
        return documents.iter().find(|doc| doc.link_path() == text);
    }

    documents
        .iter()
        .filter(|doc| doc.basename() == text)
        .min_by(|a, b| a.depth().cmp(&b.depth()).then_with(|| a.cmp(b)))
}

/// Resolves `linktext` against the documents currently in `index`.
pub async fn resolve_link<I>(index: &I, linktext: &str) -> Result<Option<DocumentRef>>
where
    I: DocumentIndex + ?Sized,
{
    let documents = index.list_documents().await?;
    let resolved = resolve_link_in(&documents, linktext).cloned();
    debug!(linktext, resolved = ?resolved, "Resolved link");
    Ok(resolved)
}

/// Link targets used anywhere in the store that match no document.
///
/// Documents that cannot be read are skipped with a warning. The result is
/// sorted and free of duplicates.
pub async fn unresolved_links<S>(store: &S) -> Result<Vec<String>>
where
    S: DocumentStore + DocumentIndex + ?Sized,
{
    let documents = store.list_documents().await?;
    let mut unresolved = BTreeSet::new();

    for document in &documents {
        let content = match store.read(document).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping unreadable document {}: {}", document, e);
                continue;
            }
        };
        for target in extract_wikilinks(&content) {
            if resolve_link_in(&documents, &target).is_none() {
                unresolved.insert(target);
            }
        }
    }

    Ok(unresolved.into_iter().collect())
}
