//! Attribute parsing for `om.constant`.

use om_lexer::token::TokenKind;
use om_types::ir::{Attribute, SymbolPath};
use om_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse a constant attribute.
    ///
    /// ```text
    /// 14 | "X"
    /// #om.integer<14>
    /// #om.list<T, ["X" : T, ...]>
    /// #om.map<V, {a = ..., b = ...}>
    /// #om.ref<<@Module::@sym>>
    /// ```
    pub(crate) fn parse_attribute(&mut self) -> Option<Attribute> {
        let span = self.span_here();
        match self.peek_kind().clone() {
            TokenKind::IntegerLit(value) => {
                self.advance();
                Some(Attribute::Integer(value))
            }
            TokenKind::StringLit(value) => {
                self.advance();
                Some(Attribute::String(value))
            }
            TokenKind::AttrAlias(name) => {
                self.advance();
                match name.as_str() {
                    "om.integer" => {
                        self.expect(&TokenKind::Less)?;
                        let value = self.expect_integer()?;
                        self.expect(&TokenKind::Greater)?;
                        Some(Attribute::Integer(value))
                    }
                    "om.list" => self.parse_list_attribute(),
                    "om.map" => self.parse_map_attribute(),
                    "om.ref" => self.parse_ref_attribute(),
                    _ => {
                        self.error_at(
                            ErrorCode::INVALID_ATTRIBUTE,
                            format!("unknown attribute '#{name}'"),
                            span,
                        );
                        None
                    }
                }
            }
            other => {
                self.error_here(
                    ErrorCode::INVALID_ATTRIBUTE,
                    format!("expected constant attribute, got '{other}'"),
                );
                None
            }
        }
    }

    /// `<T, [a : T, ...]>` (after `#om.list`)
    fn parse_list_attribute(&mut self) -> Option<Attribute> {
        self.expect(&TokenKind::Less)?;
        let element_ty = self.parse_type()?;
        self.expect(&TokenKind::Comma)?;
        self.expect(&TokenKind::LBracket)?;

        let mut elements = Vec::new();
        if !self.is_at(&TokenKind::RBracket) {
            loop {
                let element = self.parse_attribute()?;
                // Elements may carry their own type: `"X" : !om.string`.
                if self.eat(&TokenKind::Colon) {
                    self.parse_type()?;
                }
                elements.push(element);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(&TokenKind::RBracket)?;
        self.expect(&TokenKind::Greater)?;
        Some(Attribute::List {
            element_ty,
            elements,
        })
    }

    /// `<V, {key = attr, ...}>` (after `#om.map`)
    fn parse_map_attribute(&mut self) -> Option<Attribute> {
        self.expect(&TokenKind::Less)?;
        let value_ty = self.parse_type()?;
        self.expect(&TokenKind::Comma)?;
        self.expect(&TokenKind::LBrace)?;

        let mut entries = Vec::new();
        if !self.is_at(&TokenKind::RBrace) {
            loop {
                let key = match self.peek_kind().clone() {
                    TokenKind::BareId(key) | TokenKind::StringLit(key) => {
                        self.advance();
                        key
                    }
                    other => {
                        self.error_here(
                            ErrorCode::INVALID_ATTRIBUTE,
                            format!("expected map key, got '{other}'"),
                        );
                        return None;
                    }
                };
                self.expect(&TokenKind::Eq)?;
                let value = self.parse_attribute()?;
                if self.eat(&TokenKind::Colon) {
                    self.parse_type()?;
                }
                entries.push((key, value));
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(&TokenKind::RBrace)?;
        self.expect(&TokenKind::Greater)?;
        Some(Attribute::Map { value_ty, entries })
    }

    /// `<<@Module::@sym>>` (after `#om.ref`)
    fn parse_ref_attribute(&mut self) -> Option<Attribute> {
        self.expect(&TokenKind::Less)?;
        self.expect(&TokenKind::Less)?;
        let mut segments = vec![self.expect_symbol()?.name];
        while self.eat(&TokenKind::ColonColon) {
            segments.push(self.expect_symbol()?.name);
        }
        self.expect(&TokenKind::Greater)?;
        self.expect(&TokenKind::Greater)?;
        Some(Attribute::Ref(SymbolPath(segments)))
    }
}
