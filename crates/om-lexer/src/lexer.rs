//! Turns OM IR text into tokens.
//!
//! Newlines are significant (they end operations) and come out as
//! [`TokenKind::Newline`]; spaces, tabs and `//` comments are dropped. A bad
//! character is reported and skipped, so one pass can surface several
//! problems, up to [`om_types::MAX_ERRORS`].

use om_types::{Diagnostic, Diagnostics, ErrorCode, SourceFile, Span};

use crate::token::{Token, TokenKind};

/// Byte-oriented scanner over a [`SourceFile`].
pub struct Lexer<'src> {
    file: &'src SourceFile,
    bytes: &'src [u8],
    offset: usize,
    line: u32,
    col: u32,
    errors: Diagnostics,
}

/// Tokens plus whatever went wrong producing them. `tokens` always ends in
/// [`TokenKind::Eof`].
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Diagnostics,
}

/// Where a token began.
#[derive(Clone, Copy)]
struct Mark {
    offset: usize,
    line: u32,
    col: u32,
}

fn punctuation(byte: u8) -> Option<TokenKind> {
    let kind = match byte {
        b'(' => TokenKind::LParen,
        b')' => TokenKind::RParen,
        b'{' => TokenKind::LBrace,
        b'}' => TokenKind::RBrace,
        b'[' => TokenKind::LBracket,
        b']' => TokenKind::RBracket,
        b'<' => TokenKind::Less,
        b'>' => TokenKind::Greater,
        b',' => TokenKind::Comma,
        b'=' => TokenKind::Eq,
        _ => return None,
    };
    Some(kind)
}

fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'$' | b'.')
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

impl<'src> Lexer<'src> {
    pub fn new(file: &'src SourceFile) -> Self {
        Self {
            file,
            bytes: file.source.as_bytes(),
            offset: 0,
            line: 1,
            col: 1,
            errors: Diagnostics::empty(),
        }
    }

    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        loop {
            self.skip_blanks();
            if self.offset >= self.bytes.len() || self.errors.is_full() {
                break;
            }
            if let Some(token) = self.next_token() {
                tokens.push(token);
            }
        }
        tokens.push(Token::new(TokenKind::Eof, Span::point(self.line, self.col)));
        LexResult {
            tokens,
            errors: self.errors,
        }
    }

    // ── Cursor ────────────────────────────────────────────────────────────────

    fn current(&self) -> Option<u8> {
        self.bytes.get(self.offset).copied()
    }

    fn following(&self) -> Option<u8> {
        self.bytes.get(self.offset + 1).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let byte = self.current()?;
        self.offset += 1;
        if byte == b'\n' {
            self.line += 1;
            self.col = 1;
        } else if !is_continuation(byte) {
            // Columns count characters, not bytes.
            self.col += 1;
        }
        Some(byte)
    }

    fn bump_while(&mut self, keep: impl Fn(u8) -> bool) {
        while self.current().is_some_and(&keep) {
            self.bump();
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            offset: self.offset,
            line: self.line,
            col: self.col,
        }
    }

    /// From `start` up to the last consumed byte.
    fn span_since(&self, start: Mark) -> Span {
        Span::new(start.line, start.col, self.line, self.col.saturating_sub(1).max(1))
    }

    fn slice_since(&self, offset: usize) -> &'src str {
        std::str::from_utf8(&self.bytes[offset..self.offset]).unwrap_or_default()
    }

    fn report(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let quoted = self.file.line(span.start_line).unwrap_or_default();
        self.errors
            .push_error(Diagnostic::new(&self.file.name, code, message, span, quoted));
    }

    /// Spaces, tabs, carriage returns and line comments. The `\n` that ends
    /// a comment is left for the token stream.
    fn skip_blanks(&mut self) {
        loop {
            match self.current() {
                Some(b' ' | b'\t' | b'\r') => {
                    self.bump();
                }
                Some(b'/') if self.following() == Some(b'/') => self.bump_while(|b| b != b'\n'),
                _ => return,
            }
        }
    }

    // ── Tokens ────────────────────────────────────────────────────────────────

    /// Scans one token. `None` means the input at the cursor was rejected
    /// (and reported) and the caller should keep going.
    fn next_token(&mut self) -> Option<Token> {
        let start = self.mark();
        let byte = self.bump()?;

        let kind = match byte {
            b'\n' => TokenKind::Newline,
            b'"' => TokenKind::StringLit(self.string_body(start)),
            b'0'..=b'9' => self.integer(start),
            b'-' if self.current() == Some(b'>') => {
                self.bump();
                TokenKind::Arrow
            }
            b'-' if self.current().is_some_and(|b| b.is_ascii_digit()) => self.integer(start),
            b':' if self.current() == Some(b':') => {
                self.bump();
                TokenKind::ColonColon
            }
            b':' => TokenKind::Colon,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                self.bump_while(is_name_byte);
                TokenKind::BareId(self.slice_since(start.offset).to_string())
            }
            b'@' if self.current() == Some(b'"') => {
                self.bump();
                TokenKind::SymbolRef(self.string_body(start))
            }
            b'%' => TokenKind::ValueId(self.sigiled_name(start, '%')?),
            b'@' => TokenKind::SymbolRef(self.sigiled_name(start, '@')?),
            b'#' => TokenKind::AttrAlias(self.sigiled_name(start, '#')?),
            b'!' => TokenKind::TypeAlias(self.sigiled_name(start, '!')?),
            other => match punctuation(other) {
                Some(kind) => kind,
                None => {
                    self.bump_while(is_continuation);
                    let message = format!("Unexpected character '{}'", self.slice_since(start.offset));
                    self.report(ErrorCode::UNEXPECTED_TOKEN, message, self.span_since(start));
                    return None;
                }
            },
        };

        Some(Token::new(kind, self.span_since(start)))
    }

    /// The name after `%`, `@`, `#` or `!`.
    fn sigiled_name(&mut self, start: Mark, sigil: char) -> Option<String> {
        let name_at = self.offset;
        self.bump_while(is_name_byte);
        if self.offset == name_at {
            let span = self.span_since(start);
            self.report(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected a name after '{sigil}'"),
                span,
            );
            return None;
        }
        Some(self.slice_since(name_at).to_string())
    }

    /// Decimal, with an optional leading `-` already consumed.
    fn integer(&mut self, start: Mark) -> TokenKind {
        self.bump_while(|b| b.is_ascii_digit());
        let digits = self.slice_since(start.offset);
        digits.parse().map(TokenKind::IntegerLit).unwrap_or_else(|_| {
            let message = format!("integer literal '{digits}' does not fit in 64 bits");
            self.report(ErrorCode::INVALID_LITERAL, message, self.span_since(start));
            TokenKind::IntegerLit(0)
        })
    }

    /// Contents of a string whose opening quote is already consumed.
    /// A string may not run past the end of its line.
    fn string_body(&mut self, start: Mark) -> String {
        let mut text = String::new();
        loop {
            match self.current() {
                Some(b'"') => {
                    self.bump();
                    return text;
                }
                None | Some(b'\n') => {
                    let span = self.span_since(start);
                    self.report(ErrorCode::UNCLOSED_DELIMITER, "Unterminated string literal", span);
                    return text;
                }
                Some(b'\\') => {
                    if let Some(ch) = self.escape() {
                        text.push(ch);
                    }
                }
                Some(_) => {
                    let char_at = self.offset;
                    self.bump();
                    self.bump_while(is_continuation);
                    text.push_str(self.slice_since(char_at));
                }
            }
        }
    }

    /// `\"`, `\\`, `\n` or `\t`. Anything else is reported and kept as-is.
    fn escape(&mut self) -> Option<char> {
        let start = self.mark();
        self.bump();
        let Some(byte) = self.bump() else {
            let span = self.span_since(start);
            self.report(
                ErrorCode::UNCLOSED_DELIMITER,
                "Unexpected end of file in escape sequence",
                span,
            );
            return None;
        };
        let ch = match byte {
            b'"' => '"',
            b'\\' => '\\',
            b'n' => '\n',
            b't' => '\t',
            other => {
                let span = self.span_since(start);
                self.report(
                    ErrorCode::INVALID_LITERAL,
                    format!("Invalid escape sequence '\\{}'", other as char),
                    span,
                );
                other as char
            }
        };
        Some(ch)
    }
}
