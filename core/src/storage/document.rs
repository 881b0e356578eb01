use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::{Error, Result, NOTE_EXTENSION};

/// Identifies a note by its path relative to the vault root.
///
/// The path is normalized to `/` separators and may not be absolute or
/// contain `.`/`..` segments, so it can never point outside the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentRef {
    path: String,
}

impl DocumentRef {
    pub fn new(path: impl AsRef<str>) -> Result<Self> {
        let raw = path.as_ref();
        let normalized = raw.replace('\\', "/");

        let invalid = normalized.is_empty()
            || normalized.starts_with('/')
            || normalized.ends_with('/')
            || normalized
                .split('/')
                .any(|segment| segment.is_empty() || segment == "." || segment == "..")
            || Path::new(&normalized).has_root();

        if invalid {
            return Err(Error::InvalidDocumentPath(raw.to_string()));
        }
        Ok(DocumentRef { path: normalized })
    }

    /// Builds a reference from a path below `root`.
    pub(crate) fn from_relative(relative: &Path) -> Result<Self> {
        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => match name.to_str() {
                    Some(name) => segments.push(name),
                    None => return Err(Error::InvalidDocumentPath(relative.display().to_string())),
                },
                _ => return Err(Error::InvalidDocumentPath(relative.display().to_string())),
            }
        }
        DocumentRef::new(segments.join("/"))
    }

    /// The vault-relative path, e.g. `Book/Chapter 1.md`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name without its extension, e.g. `Chapter 1`. This is the text a
    /// wiki link to the note uses.
    pub fn basename(&self) -> &str {
        let name = self.file_name();
        match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => name,
        }
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// The containing folder relative to the vault root; empty for the root.
    pub fn folder(&self) -> &str {
        self.path.rsplit_once('/').map(|(folder, _)| folder).unwrap_or("")
    }

    /// Path without the note extension, e.g. `Book/Chapter 1`.
    pub fn link_path(&self) -> &str {
        self.path
            .strip_suffix(NOTE_EXTENSION)
            .and_then(|p| p.strip_suffix('.'))
            .unwrap_or(&self.path)
    }

    /// Number of folders above the note.
    pub fn depth(&self) -> usize {
        self.path.matches('/').count()
    }

    pub fn is_note(&self) -> bool {
        self.file_name()
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| !stem.is_empty() && ext == NOTE_EXTENSION)
    }

    pub(crate) fn to_path(&self, root: &Path) -> PathBuf {
        self.path.split('/').fold(root.to_path_buf(), |acc, segment| acc.join(segment))
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl TryFrom<String> for DocumentRef {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        DocumentRef::new(value)
    }
}

impl From<DocumentRef> for String {
    fn from(value: DocumentRef) -> Self {
        value.path
    }
}
