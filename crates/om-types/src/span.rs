use serde::{Deserialize, Serialize};
use std::fmt;

/// A range of source text, from the first character of a construct to
/// one past its last. Lines and columns count from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    #[serde(rename = "line")]
    pub start_line: u32,
    #[serde(rename = "column")]
    pub start_col: u32,
    pub end_line: u32,
    #[serde(rename = "end_column")]
    pub end_col: u32,
}

impl Span {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// An empty span sitting at `line:col`.
    pub fn point(line: u32, col: u32) -> Self {
        Span {
            start_line: line,
            start_col: col,
            end_line: line,
            end_col: col,
        }
    }

    /// Smallest span enclosing both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        let (start_line, start_col) =
            (self.start_line, self.start_col).min((other.start_line, other.start_col));
        let (end_line, end_col) = (self.end_line, self.end_col).max((other.end_line, other.end_col));
        Span {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// A span anchored to a named file, used when rendering evaluation
/// diagnostics (`file:line:col`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    /// `None` for operations built without source information.
    pub span: Option<Span>,
}

impl Location {
    pub fn new(file: impl Into<String>, span: Span) -> Self {
        Self {
            file: file.into(),
            span: Some(span),
        }
    }

    pub fn unknown() -> Self {
        Self {
            file: String::new(),
            span: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.span.is_none()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) if self.file.is_empty() => write!(f, "{span}"),
            Some(span) => write!(f, "{}:{}", self.file, span),
            None => write!(f, "loc(unknown)"),
        }
    }
}

/// Named IR text kept around so diagnostics can quote the offending line.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    /// Byte ranges of each line, terminator excluded.
    lines: Vec<(usize, usize)>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        let mut lines = Vec::new();
        let mut begin = 0;
        for (newline, _) in source.match_indices('\n') {
            lines.push((begin, newline));
            begin = newline + 1;
        }
        lines.push((begin, source.len()));
        Self {
            name: name.into(),
            source,
            lines,
        }
    }

    /// Text of line `number` (1-based) without its `\n` or `\r\n`.
    pub fn line(&self, number: u32) -> Option<&str> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        let &(begin, end) = self.lines.get(index)?;
        self.source.get(begin..end).map(|text| text.strip_suffix('\r').unwrap_or(text))
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
