use thiserror::Error;

use super::{locate_header, HeaderLocation, LineEnding, LinkKey, DELIMITER};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("Header block opens on the first line but is never closed")]
    MalformedHeader,
}

/// Replaces every `key:` line with a single `key: value` line at the end.
///
/// Matching is an exact, case-sensitive prefix match on `<key>:`. Lines that
/// do not match are kept in order, whatever they contain.
pub fn upsert_field(fields: &[&str], key: LinkKey, value: &str) -> Vec<String> {
    let prefix = format!("{}:", key);
    let mut out: Vec<String> = fields
        .iter()
        .filter(|line| !line.starts_with(&prefix))
        .map(|line| line.to_string())
        .collect();
    out.push(format!("{}: {}", key, value));
    out
}

/// Returns `content` with `key` set to `value` in its header block.
///
/// A header is created in front of the untouched content when none exists.
/// Fails without producing anything when the header is never closed.
pub fn rewrite(content: &str, key: LinkKey, value: &str) -> Result<String, RewriteError> {
    let ending = LineEnding::detect(content);
    let nl = ending.as_str();
    let lines = ending.split(content);

    match locate_header(&lines) {
        HeaderLocation::NoHeader => {
            Ok(format!("{DELIMITER}{nl}{key}: {value}{nl}{DELIMITER}{nl}{content}"))
        }
        HeaderLocation::Malformed => Err(RewriteError::MalformedHeader),
        HeaderLocation::Header { open, close } => {
            let fields = upsert_field(&lines[open + 1..close], key, value);

            let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 1);
            out.push(DELIMITER);
            out.extend(fields.iter().map(String::as_str));
            out.push(DELIMITER);
            // Body lines come from the same split as the header
            out.extend_from_slice(&lines[close + 1..]);
            Ok(out.join(nl))
        }
    }
}

/// Reads the raw value of the first `key:` line in the header block.
///
/// Returns `None` when there is no well-formed header, the key is absent, or
/// its value is blank.
pub fn read_field(content: &str, key: LinkKey) -> Option<String> {
    let ending = LineEnding::detect(content);
    let lines = ending.split(content);
    let range = locate_header(&lines).field_range()?;
    let prefix = format!("{}:", key);

    lines[range]
        .iter()
        .find_map(|line| line.strip_prefix(prefix.as_str()))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "\"[[A]]\"";
    const B: &str = "\"[[B]]\"";

    #[test]
    fn upsert_appends_missing_key() {
        let fields = upsert_field(&["tags: x"], LinkKey::Next, B);
        assert_eq!(fields, vec!["tags: x".to_string(), format!("next: {B}")]);
    }

    #[test]
    fn upsert_moves_replaced_key_last() {
        let fields = upsert_field(&["next: old", "tags: x", "prev: p"], LinkKey::Next, B);
        assert_eq!(fields, vec!["tags: x", "prev: p", format!("next: {B}").as_str()]);
    }

    #[test]
    fn upsert_prefix_match_is_exact() {
        let fields = upsert_field(
            &["  next: indented", "Next: upper", "nextish: x", "previous: y"],
            LinkKey::Next,
            B,
        );
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[..4], ["  next: indented", "Next: upper", "nextish: x", "previous: y"]);

        let fields = upsert_field(&["previous: y"], LinkKey::Prev, A);
        assert_eq!(fields, vec!["previous: y".to_string(), format!("prev: {A}")]);
    }

    #[test]
    fn end_to_end_scenario() {
        let content = "---\nprev: \"[[A]]\"\n---\nBody text\n";
        let updated = rewrite(content, LinkKey::Next, B).unwrap();
        assert_eq!(updated, "---\nprev: \"[[A]]\"\nnext: \"[[B]]\"\n---\nBody text\n");
    }

    #[test]
    fn creates_header_when_missing() {
        let content = "\n\n  Body text  \n\n";
        let updated = rewrite(content, LinkKey::Prev, A).unwrap();
        assert_eq!(updated, format!("---\nprev: {A}\n---\n{content}"));
        let lines: Vec<&str> = updated.split('\n').collect();
        assert_eq!(lines[..3], ["---", "prev: \"[[A]]\"", "---"]);
        assert!(updated.ends_with(content));
    }

    #[test]
    fn creates_header_for_empty_document() {
        assert_eq!(rewrite("", LinkKey::Next, B).unwrap(), "---\nnext: \"[[B]]\"\n---\n");
    }

    #[test]
    fn body_delimiter_lines_are_not_a_header() {
        let content = "Intro\n---\nnext: x\n---\n";
        let updated = rewrite(content, LinkKey::Next, B).unwrap();
        assert_eq!(updated, format!("---\nnext: {B}\n---\n{content}"));
    }

    #[test]
    fn edit_is_idempotent() {
        let content = "---\ntags: x\nprev: \"[[A]]\"\n---\n\nBody\n\n";
        let once = rewrite(content, LinkKey::Next, B).unwrap();
        let twice = rewrite(&once, LinkKey::Next, B).unwrap();
        assert_eq!(once, twice);

        let once = rewrite("plain", LinkKey::Prev, A).unwrap();
        let twice = rewrite(&once, LinkKey::Prev, A).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn unrelated_fields_keep_their_position() {
        let content = "---\nprev: \"[[A]]\"\ntags: x\n---\nBody";
        let updated = rewrite(content, LinkKey::Next, B).unwrap();
        let lines: Vec<&str> = updated.split('\n').collect();
        assert_eq!(lines, vec!["---", "prev: \"[[A]]\"", "tags: x", "next: \"[[B]]\"", "---", "Body"]);
    }

    #[test]
    fn duplicate_keys_collapse_to_one() {
        let content = "---\nnext: \"[[X]]\"\ntags: x\nnext: \"[[Y]]\"\n---\nBody\n";
        let updated = rewrite(content, LinkKey::Next, B).unwrap();
        assert_eq!(updated.matches("next:").count(), 1);
        assert_eq!(updated, "---\ntags: x\nnext: \"[[B]]\"\n---\nBody\n");
    }

    #[test]
    fn empty_header_gets_the_field() {
        let updated = rewrite("---\n---\nBody", LinkKey::Prev, A).unwrap();
        assert_eq!(updated, "---\nprev: \"[[A]]\"\n---\nBody");
    }

    #[test]
    fn malformed_header_is_rejected() {
        assert_eq!(
            rewrite("---\nprev: \"[[A]]\"\nBody\n", LinkKey::Next, B),
            Err(RewriteError::MalformedHeader)
        );
    }

    #[test]
    fn body_is_reproduced_exactly() {
        let content = "---\nnext: x\n---\n\n\n# Title\n\n---\ntrailing\n\n";
        let updated = rewrite(content, LinkKey::Next, B).unwrap();
        assert_eq!(updated, "---\nnext: \"[[B]]\"\n---\n\n\n# Title\n\n---\ntrailing\n\n");
    }

    #[test]
    fn crlf_documents_stay_crlf() {
        let content = "---\r\ntags: x\r\n---\r\nBody\r\n";
        let updated = rewrite(content, LinkKey::Next, B).unwrap();
        assert_eq!(updated, "---\r\ntags: x\r\nnext: \"[[B]]\"\r\n---\r\nBody\r\n");

        let updated = rewrite("Body\r\n", LinkKey::Prev, A).unwrap();
        assert_eq!(updated, "---\r\nprev: \"[[A]]\"\r\n---\r\nBody\r\n");
    }

    #[test]
    fn read_field_returns_first_value() {
        let content = "---\nprev: \"[[A]]\"\nprev: \"[[Z]]\"\nnext:   \n---\n";
        assert_eq!(read_field(content, LinkKey::Prev).as_deref(), Some(A));
        assert_eq!(read_field(content, LinkKey::Next), None);
    }

    #[test]
    fn read_field_ignores_body_and_broken_headers() {
        assert_eq!(read_field("prev: \"[[A]]\"\n", LinkKey::Prev), None);
        assert_eq!(read_field("---\nprev: \"[[A]]\"\n", LinkKey::Prev), None);
        assert_eq!(read_field("---\n---\nprev: \"[[A]]\"\n", LinkKey::Prev), None);
    }
}
