//! Reads and rewrites the header block at the top of a note.
//!
//! A header block starts on the very first line of a document with the
//! [`DELIMITER`] and ends at the next line that is exactly the delimiter.
//! Everything in between is a list of `key: value` lines. Only the two
//! sequencing keys ([`LinkKey::Prev`] and [`LinkKey::Next`]) are ever edited;
//! every other line inside the header, and the whole body after it, is carried
//! over untouched.
//!
//! The rewrite is split into three pure steps:
//!
//! *   [`locate_header`] finds the block boundaries,
//! *   [`upsert_field`] edits the field lines,
//! *   [`rewrite`] puts the document back together.
//!
//! None of these touch storage. Reading and writing happens in
//! [`crate::edit`].
//!
//! ```rust
//! use sequencer_core::frontmatter::{rewrite, LinkKey};
//!
//! let content = "---\nprev: \"[[A]]\"\n---\nBody text\n";
//! let updated = rewrite(content, LinkKey::Next, "\"[[B]]\"").unwrap();
//! assert_eq!(updated, "---\nprev: \"[[A]]\"\nnext: \"[[B]]\"\n---\nBody text\n");
//! ```

mod editor;
mod link;
mod locator;

pub use self::editor::{read_field, rewrite, upsert_field, RewriteError};
pub use self::link::{extract_wikilinks, Link};
pub use self::locator::{locate_header, HeaderLocation, LineEnding};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The line that opens and closes a header block.
pub const DELIMITER: &str = "---";

/// One of the two header keys that hold sequencing links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKey {
    Prev,
    Next,
}

impl LinkKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKey::Prev => "prev",
            LinkKey::Next => "next",
        }
    }

    /// The key written on the other end of a reciprocal link.
    pub fn inverse(&self) -> LinkKey {
        match self {
            LinkKey::Prev => LinkKey::Next,
            LinkKey::Next => LinkKey::Prev,
        }
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown link key '{0}' (expected 'prev' or 'next')")]
pub struct UnknownLinkKey(pub String);

impl FromStr for LinkKey {
    type Err = UnknownLinkKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prev" => Ok(LinkKey::Prev),
            "next" => Ok(LinkKey::Next),
            other => Err(UnknownLinkKey(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_swaps_direction() {
        assert_eq!(LinkKey::Prev.inverse(), LinkKey::Next);
        assert_eq!(LinkKey::Next.inverse(), LinkKey::Prev);
        assert_eq!(LinkKey::Next.inverse().inverse(), LinkKey::Next);
    }

    #[test]
    fn parses_only_lowercase_keys() {
        assert_eq!("prev".parse::<LinkKey>(), Ok(LinkKey::Prev));
        assert_eq!("next".parse::<LinkKey>(), Ok(LinkKey::Next));
        assert_eq!("Next".parse::<LinkKey>(), Err(UnknownLinkKey("Next".to_string())));
    }
}
