use super::DELIMITER;

/// Line break convention of a document.
///
/// A document is split once on its line break and put back together with the
/// same one, so the rewrite never mixes conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// Detects the convention from the first line break in `content`.
    /// Documents without any line break use `\n`.
    pub fn detect(content: &str) -> Self {
        match content.find('\n') {
            Some(idx) if content[..idx].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    /// Splits `content` into lines without trimming anything.
    ///
    /// A trailing line break yields a final empty line, so joining the result
    /// with the same separator reproduces `content` exactly.
    pub fn split<'a>(&self, content: &'a str) -> Vec<&'a str> {
        content.split(self.as_str()).collect()
    }
}

/// Where the header block sits in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLocation {
    /// Line 0 is not the delimiter.
    NoHeader,
    /// Header spanning `open..=close`. `open` is always 0.
    Header { open: usize, close: usize },
    /// Line 0 is the delimiter but the block never closes.
    Malformed,
}

impl HeaderLocation {
    /// Range of the field lines strictly between the delimiters.
    pub fn field_range(&self) -> Option<std::ops::Range<usize>> {
        match *self {
            HeaderLocation::Header { open, close } => Some(open + 1..close),
            _ => None,
        }
    }
}

/// Scans already split lines for the header block boundaries.
pub fn locate_header(lines: &[&str]) -> HeaderLocation {
    match lines.first() {
        Some(&first) if first == DELIMITER => {}
        _ => return HeaderLocation::NoHeader,
    }

    match lines.iter().skip(1).position(|line| *line == DELIMITER) {
        Some(offset) => HeaderLocation::Header { open: 0, close: offset + 1 },
        None => HeaderLocation::Malformed,
    }
}
