use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostics beyond this many are counted but not kept.
pub const MAX_ERRORS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Coarse grouping of error codes, by hundreds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Syntax,
    Symbol,
    Structure,
}

/// Stable numeric identifier of a load-time problem, shown as `E<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Syntax errors (E100–E199) ──
    pub const UNEXPECTED_TOKEN: Self = Self(100);
    pub const UNCLOSED_DELIMITER: Self = Self(101);
    pub const INVALID_LITERAL: Self = Self(102);
    pub const UNKNOWN_OPERATION: Self = Self(103);
    pub const INVALID_ATTRIBUTE: Self = Self(104);
    pub const UNKNOWN_TYPE: Self = Self(105);

    // ── Symbol errors (E200–E299) ──
    pub const DUPLICATE_SYMBOL: Self = Self(200);
    pub const DUPLICATE_FIELD: Self = Self(201);
    pub const DUPLICATE_VALUE: Self = Self(202);
    pub const UNDEFINED_VALUE: Self = Self(203);
    pub const UNKNOWN_CLASS: Self = Self(204);

    // ── Structure errors (E300–E399) ──
    pub const CYCLIC_CLASS: Self = Self(300);
    pub const OBJECT_ARITY_MISMATCH: Self = Self(301);

    pub fn category(self) -> ErrorCategory {
        match self.0 / 100 {
            2 => ErrorCategory::Symbol,
            3 => ErrorCategory::Structure,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A structured load-time diagnostic (lexer, parser or registry verifier).
///
/// Tools render these from their fields; they must not parse the
/// free-form `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub code: ErrorCode,
    pub severity: Severity,
    /// Always `code.category()`; stored so JSON consumers need no table.
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// The line `span` starts on, verbatim.
    pub source_line: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            span,
            source_line: source_line.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "{}: ", self.span)?;
        } else {
            write!(f, "{}:{}: ", self.file, self.span)?;
        }
        write!(f, "{} [{}] {}", self.code, self.category, self.message)
    }
}

impl std::error::Error for Diagnostic {}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Symbol => "symbol",
            Self::Structure => "structure",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capped list of diagnostics, serializable as the JSON report printed by
/// `om-tool check`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl Diagnostics {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// `true` once [`MAX_ERRORS`] errors have been seen.
    pub fn is_full(&self) -> bool {
        self.total_errors >= MAX_ERRORS
    }

    /// Counts the error; keeps it only while under [`MAX_ERRORS`].
    pub fn push_error(&mut self, error: Diagnostic) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn push_warning(&mut self, warning: Diagnostic) {
        self.warnings.push(warning);
        self.total_warnings += 1;
    }

    /// Merges `other` in, carrying over its count of dropped errors.
    pub fn extend(&mut self, other: Diagnostics) {
        let dropped = other.total_errors.saturating_sub(other.errors.len());
        other.errors.into_iter().for_each(|e| self.push_error(e));
        self.total_errors += dropped;
        other.warnings.into_iter().for_each(|w| self.push_warning(w));
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sep = "";
        for error in &self.errors {
            write!(f, "{sep}{error}")?;
            sep = "\n";
        }
        match self.total_errors.saturating_sub(self.errors.len()) {
            0 => Ok(()),
            hidden => write!(f, "\n... and {hidden} more error(s)"),
        }
    }
}

impl std::error::Error for Diagnostics {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(
            "test.mlir",
            ErrorCode::UNDEFINED_VALUE,
            message,
            Span::new(4, 7, 4, 12),
            "    om.class.field @x, %missing : !om.integer",
        )
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::UNEXPECTED_TOKEN.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::UNKNOWN_TYPE.category(), ErrorCategory::Syntax);
        assert_eq!(ErrorCode::DUPLICATE_SYMBOL.category(), ErrorCategory::Symbol);
        assert_eq!(ErrorCode::UNKNOWN_CLASS.category(), ErrorCategory::Symbol);
        assert_eq!(ErrorCode::CYCLIC_CLASS.category(), ErrorCategory::Structure);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::UNDEFINED_VALUE.to_string(), "E203");
        assert_eq!(ErrorCode::UNEXPECTED_TOKEN.to_string(), "E100");
    }

    #[test]
    fn test_diagnostic_display() {
        let err = sample("use of undefined value '%missing'");
        assert_eq!(
            err.to_string(),
            "test.mlir:4:7: E203 [symbol] use of undefined value '%missing'"
        );
    }

    #[test]
    fn test_diagnostic_with_suggestion() {
        let err = sample("use of undefined value '%missing'")
            .with_suggestion("define '%missing' before it is used");
        assert_eq!(
            err.suggestion.as_deref(),
            Some("define '%missing' before it is used")
        );
    }

    #[test]
    fn test_diagnostic_json_serialization() {
        let err = sample("use of undefined value '%missing'");
        let json = serde_json::to_string_pretty(&err).unwrap();
        assert!(json.contains("\"code\""));
        assert!(json.contains("\"source_line\""));
        assert!(json.contains("\"line\": 4"));
        assert!(json.contains("\"column\": 7"));
        assert!(json.contains("\"end_column\": 12"));
        assert!(!json.contains("\"suggestion\""));

        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, err.code);
        assert_eq!(back.span, err.span);
    }

    #[test]
    fn test_diagnostics_max_limit() {
        let mut diags = Diagnostics::empty();
        for i in 0..25 {
            diags.push_error(sample(format!("error {i}")));
        }
        assert_eq!(diags.errors.len(), MAX_ERRORS);
        assert_eq!(diags.total_errors, 25);
        assert!(diags.is_full());
        assert!(diags.to_string().ends_with("... and 5 more error(s)"));
    }

    #[test]
    fn test_diagnostics_extend_keeps_totals() {
        let mut a = Diagnostics::empty();
        a.push_error(sample("first"));
        let mut b = Diagnostics::empty();
        for i in 0..22 {
            b.push_error(sample(format!("error {i}")));
        }
        a.extend(b);
        assert_eq!(a.errors.len(), MAX_ERRORS);
        assert_eq!(a.total_errors, 23);
    }

    #[test]
    fn test_diagnostics_empty() {
        let diags = Diagnostics::empty();
        assert!(!diags.has_errors());
        assert_eq!(diags.to_string(), "");
    }
}
