//! Type parsing: `!om.*` dialect types, `tuple<...>` and builtin `iN`.

use om_lexer::token::TokenKind;
use om_types::{ErrorCode, OmType};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse a single type.
    pub(crate) fn parse_type(&mut self) -> Option<OmType> {
        let span = self.span_here();
        match self.peek_kind().clone() {
            TokenKind::TypeAlias(name) => {
                self.advance();
                match name.as_str() {
                    "om.integer" => Some(OmType::Integer),
                    "om.string" => Some(OmType::String),
                    "om.ref" => Some(OmType::Ref),
                    "om.any" => Some(OmType::Any),
                    "om.list" => {
                        self.expect(&TokenKind::Less)?;
                        let element = self.parse_type()?;
                        self.expect(&TokenKind::Greater)?;
                        Some(OmType::list(element))
                    }
                    "om.map" => {
                        self.expect(&TokenKind::Less)?;
                        let key = self.parse_type()?;
                        self.expect(&TokenKind::Comma)?;
                        let value = self.parse_type()?;
                        self.expect(&TokenKind::Greater)?;
                        Some(OmType::map(key, value))
                    }
                    "om.class.type" => {
                        self.expect(&TokenKind::Less)?;
                        let class = self.expect_symbol()?;
                        self.expect(&TokenKind::Greater)?;
                        Some(OmType::Class(class.name))
                    }
                    _ => {
                        self.error_at(ErrorCode::UNKNOWN_TYPE, format!("unknown type '!{name}'"), span);
                        None
                    }
                }
            }
            TokenKind::BareId(name) if name == "tuple" => {
                self.advance();
                self.expect(&TokenKind::Less)?;
                let elements = self.parse_type_list(&TokenKind::Greater)?;
                self.expect(&TokenKind::Greater)?;
                Some(OmType::Tuple(elements))
            }
            TokenKind::BareId(name) => match builtin_int_width(&name) {
                Some(width) => {
                    self.advance();
                    Some(OmType::Int(width))
                }
                None => {
                    self.error_at(ErrorCode::UNKNOWN_TYPE, format!("unknown type '{name}'"), span);
                    None
                }
            },
            other => {
                self.error_here(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected type, got '{other}'"),
                );
                None
            }
        }
    }

    /// Parse a comma-separated list of types. Returns an empty list when the
    /// current token is `close` (which is not consumed).
    pub(crate) fn parse_type_list(&mut self, close: &TokenKind) -> Option<Vec<OmType>> {
        let mut types = Vec::new();
        if self.is_at(close) {
            return Some(types);
        }
        loop {
            types.push(self.parse_type()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some(types)
    }
}

/// `i1` → 1, `i64` → 64; anything else is not a builtin integer type.
fn builtin_int_width(name: &str) -> Option<u32> {
    let digits = name.strip_prefix('i')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|&w| w > 0)
}
