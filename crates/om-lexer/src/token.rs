//! Token types for the OM IR lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the textual OM subset and
//! [`Token`], which pairs a kind with a source [`Span`].

use om_types::Span;
use std::fmt;

/// Operation names recognised by the parser. Anything else in operation
/// position is reported as an unknown operation.
pub const KNOWN_OPERATIONS: &[&str] = &[
    "module",
    "om.class",
    "om.class.field",
    "om.constant",
    "om.object",
    "om.list_create",
    "om.tuple_create",
    "om.map_create",
    "hw.module",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind in the textual IR.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──────────────────────────────────────────────

    /// Integer literal, optionally negative: `14`, `-3`
    IntegerLit(i64),
    /// String literal with escapes resolved: `"X"`
    StringLit(String),

    // ── Sigiled names ─────────────────────────────────────────

    /// SSA value: `%param`, `%0` (sigil stripped)
    ValueId(String),
    /// Symbol reference: `@Test` (sigil stripped)
    SymbolRef(String),
    /// Dialect attribute: `#om.integer` (sigil stripped)
    AttrAlias(String),
    /// Dialect type: `!om.list` (sigil stripped)
    TypeAlias(String),

    // ── Identifiers ──────────────────────────────────────────

    /// Bare identifier, dots allowed: `om.class.field`, `tuple`, `i1`, `sym`
    BareId(String),

    // ── Punctuation ──────────────────────────────────────────

    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `::`
    ColonColon,
    /// `=`
    Eq,
    /// `->`
    Arrow,

    // ── Structure ────────────────────────────────────────────

    /// End of line; operations are newline-terminated.
    Newline,
    Eof,
}

impl TokenKind {
    /// `true` if this is the bare identifier `text`.
    pub fn is_bare(&self, text: &str) -> bool {
        matches!(self, Self::BareId(s) if s == text)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntegerLit(n) => write!(f, "{n}"),
            Self::StringLit(s) => write!(f, "\"{s}\""),
            Self::ValueId(s) => write!(f, "%{s}"),
            Self::SymbolRef(s) => write!(f, "@{s}"),
            Self::AttrAlias(s) => write!(f, "#{s}"),
            Self::TypeAlias(s) => write!(f, "!{s}"),
            Self::BareId(s) => write!(f, "{s}"),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
            Self::LBrace => write!(f, "{{"),
            Self::RBrace => write!(f, "}}"),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::Less => write!(f, "<"),
            Self::Greater => write!(f, ">"),
            Self::Comma => write!(f, ","),
            Self::Colon => write!(f, ":"),
            Self::ColonColon => write!(f, "::"),
            Self::Eq => write!(f, "="),
            Self::Arrow => write!(f, "->"),
            Self::Newline => write!(f, "newline"),
            Self::Eof => write!(f, "end of file"),
        }
    }
}
