use std::fmt;
use std::sync::LazyLock;

use pulldown_cmark::{Event, Parser, Tag, TagEnd, TextMergeStream};
use regex::Regex;

static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").expect("wikilink pattern is valid"));

/// A wiki-style reference to another note, as stored in a header field.
///
/// On disk a link looks like `"[[Chapter 1]]"`. The quotes keep the value a
/// plain string for YAML readers; the brackets mark it as a note reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    text: String,
}

impl Link {
    pub fn new(text: impl Into<String>) -> Self {
        Link { text: text.into() }
    }

    /// Strips quote and bracket decoration from a stored field value.
    ///
    /// Undecorated values are accepted as they are. Returns `None` when
    /// nothing is left after stripping.
    pub fn parse(value: &str) -> Option<Self> {
        let mut text = value.trim();
        for quote in ['"', '\''] {
            if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
                text = &text[1..text.len() - 1];
                break;
            }
        }
        let text = text.trim();
        let text = text
            .strip_prefix("[[")
            .and_then(|t| t.strip_suffix("]]"))
            .unwrap_or(text)
            .trim();

        if text.is_empty() {
            None
        } else {
            Some(Link::new(text))
        }
    }

    /// The link text between the brackets, including any anchor or alias.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The note part of the link, without `#anchor` or `|alias`.
    pub fn target(&self) -> &str {
        let end = self.text.find(['#', '|']).unwrap_or(self.text.len());
        self.text[..end].trim()
    }

    /// The quoted form written into a header field.
    pub fn to_field_value(&self) -> String {
        format!("\"[[{}]]\"", self.text)
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[[{}]]", self.text)
    }
}

/// Collects the targets of `[[wiki links]]` in a markdown document.
///
/// Links inside code blocks and inline code are skipped. Targets are
/// returned without anchor or alias, in document order, duplicates included.
pub fn extract_wikilinks(markdown: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut code_depth = 0usize;

    for event in TextMergeStream::new(Parser::new(markdown)) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => code_depth += 1,
            Event::End(TagEnd::CodeBlock) => code_depth = code_depth.saturating_sub(1),
            Event::Text(text) if code_depth == 0 => {
                for captures in WIKILINK_RE.captures_iter(&text) {
                    let link = Link::new(&captures[1]);
                    let target = link.target();
                    if !target.is_empty() {
                        links.push(target.to_string());
                    }
                }
            }
            _ => {}
        }
    }
    links
}
