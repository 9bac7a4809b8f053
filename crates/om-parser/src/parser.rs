//! Token cursor and diagnostic plumbing shared by the `parse_*` modules.

use om_lexer::token::{Token, TokenKind};
use om_types::ir::{Ident, Module};
use om_types::{Diagnostic, Diagnostics, ErrorCode, SourceFile, Span};

/// Recursive-descent parser for OM IR text.
///
/// Works over the lexer's token stream. Errors are collected rather than
/// returned; after a bad operation the parser skips to the next line and
/// carries on.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source_file: &'src SourceFile,
    errors: Diagnostics,
}

/// What [`Parser::parse`] produced. `module` is `None` only when the
/// top-level structure itself could not be read.
pub struct ParseResult {
    pub module: Option<Module>,
    pub errors: Diagnostics,
}

const FALLBACK_EOF: &Token = &Token {
    kind: TokenKind::Eof,
    span: Span {
        start_line: 1,
        start_col: 1,
        end_line: 1,
        end_col: 1,
    },
};

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: Diagnostics::empty(),
        }
    }

    /// Runs the parser to completion.
    pub fn parse(mut self) -> ParseResult {
        let module = self.parse_module();
        ParseResult {
            module,
            errors: self.errors,
        }
    }

    pub(crate) fn file_name(&self) -> &str {
        &self.source_file.name
    }

    // ── Cursor ────────────────────────────────────────────────────────────────

    /// The token under the cursor. Past the end this keeps yielding the
    /// final (`Eof`) token.
    pub(crate) fn peek(&self) -> &Token {
        match self.tokens.get(self.pos) {
            Some(token) => token,
            None => self.tokens.last().unwrap_or(FALLBACK_EOF),
        }
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    pub(crate) fn look_ahead(&self, n: usize) -> &TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(&TokenKind::Eof, |token| &token.kind)
    }

    pub(crate) fn advance(&mut self) -> Token {
        let consumed = self.peek().clone();
        self.pos = (self.pos + 1).min(self.tokens.len());
        consumed
    }

    /// Span of the most recently consumed token.
    pub(crate) fn last_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(Span::point(1, 1), |token| token.span)
    }

    pub(crate) fn span_here(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn at_end(&self) -> bool {
        *self.peek_kind() == TokenKind::Eof
    }

    pub(crate) fn is_at(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn check_bare(&self, text: &str) -> bool {
        self.peek_kind().is_bare(text)
    }

    /// Consumes the current token when it is `kind`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        let hit = self.is_at(kind);
        if hit {
            self.advance();
        }
        hit
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.eat(&TokenKind::Newline) {}
    }

    /// An operation ends at a newline, a `}` or end of input.
    pub(crate) fn expect_line_end(&mut self) -> Option<()> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.skip_newlines();
                Some(())
            }
            TokenKind::RBrace | TokenKind::Eof => Some(()),
            other => {
                let message = format!("expected end of line, got '{other}'");
                self.error_here(ErrorCode::UNEXPECTED_TOKEN, message);
                None
            }
        }
    }

    // ── Expectations ──────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.is_at(expected) {
            return Some(self.advance());
        }
        let message = format!("expected '{expected}', got '{}'", self.peek_kind());
        self.error_here(ErrorCode::UNEXPECTED_TOKEN, message);
        None
    }

    /// Consumes the current token if `pick` accepts it, otherwise reports
    /// "expected {what}".
    fn expect_with<T>(&mut self, what: &str, pick: impl FnOnce(&TokenKind) -> Option<T>) -> Option<T> {
        match pick(self.peek_kind()) {
            Some(found) => {
                self.advance();
                Some(found)
            }
            None => {
                let message = format!("expected {what}, got '{}'", self.peek_kind());
                self.error_here(ErrorCode::UNEXPECTED_TOKEN, message);
                None
            }
        }
    }

    /// `%name`
    pub(crate) fn expect_value_id(&mut self) -> Option<Ident> {
        let span = self.span_here();
        self.expect_with("SSA value", |kind| match kind {
            TokenKind::ValueId(name) => Some(Ident::new(name.clone(), span)),
            _ => None,
        })
    }

    /// `@Name`
    pub(crate) fn expect_symbol(&mut self) -> Option<Ident> {
        let span = self.span_here();
        self.expect_with("symbol name", |kind| match kind {
            TokenKind::SymbolRef(name) => Some(Ident::new(name.clone(), span)),
            _ => None,
        })
    }

    pub(crate) fn expect_integer(&mut self) -> Option<i64> {
        self.expect_with("integer literal", |kind| match kind {
            TokenKind::IntegerLit(value) => Some(*value),
            _ => None,
        })
    }

    /// `%a, %b, ...`, possibly empty.
    pub(crate) fn parse_value_list(&mut self) -> Option<Vec<Ident>> {
        let mut values = Vec::new();
        while matches!(self.peek_kind(), TokenKind::ValueId(_)) {
            values.push(self.expect_value_id()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some(values)
    }

    // ── Diagnostics ───────────────────────────────────────────────────────────

    pub(crate) fn error_here(&mut self, code: ErrorCode, message: impl Into<String>) {
        let span = self.span_here();
        self.error_at(code, message, span);
    }

    pub(crate) fn error_at(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let diagnostic = self.diagnostic(code, message, span);
        self.push_diagnostic(diagnostic);
    }

    /// Builds a diagnostic quoting the line `span` starts on.
    pub(crate) fn diagnostic(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> Diagnostic {
        let quoted = self.source_file.line(span.start_line).unwrap_or_default();
        Diagnostic::new(self.file_name(), code, message, span, quoted)
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.errors.push_error(diagnostic);
    }

    pub(crate) fn error_budget_spent(&self) -> bool {
        self.errors.is_full()
    }

    /// Recovery: drop the rest of the current line. A `}` stops the skip
    /// without being consumed, unless nothing has been consumed since
    /// `started_at`, in which case it is eaten so the caller makes progress.
    pub(crate) fn synchronize(&mut self, started_at: usize) {
        loop {
            match self.peek_kind() {
                TokenKind::Eof => return,
                TokenKind::Newline => {
                    self.skip_newlines();
                    return;
                }
                TokenKind::RBrace => {
                    if self.pos == started_at {
                        self.advance();
                    }
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }
}
