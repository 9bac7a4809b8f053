//! Top-level parsing: the `module { ... }` wrapper, `om.class` declarations
//! and opaque `hw.module` bodies.

use om_lexer::token::TokenKind;
use om_types::ir::*;
use om_types::ErrorCode;

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Module
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a complete module, with or without the `module { }` wrapper.
    pub(crate) fn parse_module(&mut self) -> Option<Module> {
        self.skip_newlines();
        let start = self.span_here();

        let ops = if self.check_bare("module") {
            self.advance();
            self.expect(&TokenKind::LBrace)?;
            self.skip_newlines();
            let ops = self.parse_top_level_ops(&TokenKind::RBrace);
            self.expect(&TokenKind::RBrace)?;
            self.skip_newlines();
            ops
        } else {
            self.parse_top_level_ops(&TokenKind::Eof)
        };

        if !self.at_end() {
            self.error_here(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected end of file, got '{}'", self.peek_kind()),
            );
        }

        let span = start.merge(self.last_span());
        Some(Module::new(self.file_name().to_string(), ops, span))
    }

    fn parse_top_level_ops(&mut self, close: &TokenKind) -> Vec<TopLevelOp> {
        self.parse_items(close, |p| match p.peek_kind().clone() {
            TokenKind::BareId(name) if name == "om.class" => p.parse_class().map(TopLevelOp::Class),
            TokenKind::BareId(name) if name == "hw.module" => p.parse_hw_module().map(TopLevelOp::HwModule),
            TokenKind::BareId(_) | TokenKind::ValueId(_) => p.parse_operation(false).map(TopLevelOp::Op),
            TokenKind::RBrace => {
                p.error_here(ErrorCode::UNEXPECTED_TOKEN, "unbalanced '}'");
                None
            }
            other => {
                p.error_here(ErrorCode::UNEXPECTED_TOKEN, format!("expected operation, got '{other}'"));
                None
            }
        })
    }

    /// Newline-separated items up to `close` (left unconsumed). A failed
    /// item is skipped to the end of its line.
    fn parse_items<T>(&mut self, close: &TokenKind, mut item: impl FnMut(&mut Self) -> Option<T>) -> Vec<T> {
        let mut items = Vec::new();
        while !self.is_at(close) && !self.at_end() && !self.error_budget_spent() {
            let started_at = self.position();
            if let Some(parsed) = item(self) {
                items.push(parsed);
            } else {
                self.synchronize(started_at);
            }
            self.skip_newlines();
        }
        items
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Classes
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse `om.class @Name(%p: T, ...) { body }`.
    fn parse_class(&mut self) -> Option<ClassOp> {
        let start = self.span_here();
        self.advance();
        let name = self.expect_symbol()?;

        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.is_at(&TokenKind::RParen) {
            loop {
                let arg_name = self.expect_value_id()?;
                self.expect(&TokenKind::Colon)?;
                let ty = self.parse_type()?;
                let span = arg_name.span.merge(self.last_span());
                params.push(BlockArg {
                    name: arg_name,
                    ty,
                    span,
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;

        self.expect(&TokenKind::LBrace)?;
        self.skip_newlines();

        let body = self.parse_items(&TokenKind::RBrace, |p| p.parse_operation(true));

        if !self.is_at(&TokenKind::RBrace) {
            self.error_here(
                ErrorCode::UNCLOSED_DELIMITER,
                format!("unclosed body of class @{}", name.name),
            );
            return None;
        }
        self.advance();

        let span = start.merge(self.last_span());
        self.expect_line_end()?;
        Some(ClassOp {
            name,
            params,
            body,
            span,
        })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Hardware modules
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse `hw.module @Name(...) -> (...) { ... }`.
    ///
    /// The signature and body are opaque; only `sym @name` inner symbols are
    /// kept so that `#om.ref` paths can be resolved against them.
    fn parse_hw_module(&mut self) -> Option<HwModuleOp> {
        let start = self.span_here();
        self.advance();
        let name = self.expect_symbol()?;

        while !self.is_at(&TokenKind::LBrace)
            && !self.is_at(&TokenKind::Newline)
            && !self.at_end()
        {
            self.advance();
        }
        if !self.eat(&TokenKind::LBrace) {
            self.error_here(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{{' to open the body of hw.module @{}", name.name),
            );
            return None;
        }

        let mut depth = 1usize;
        let mut inner_symbols = Vec::new();
        while !self.at_end() {
            let kind = self.peek_kind().clone();
            match &kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                TokenKind::BareId(word) if word == "sym" => {
                    if let TokenKind::SymbolRef(sym) = self.look_ahead(1).clone() {
                        self.advance();
                        let span = self.advance().span;
                        inner_symbols.push(Ident::new(sym, span));
                        continue;
                    }
                }
                _ => {}
            }
            self.advance();
        }

        if !self.is_at(&TokenKind::RBrace) {
            self.error_here(
                ErrorCode::UNCLOSED_DELIMITER,
                format!("unclosed body of hw.module @{}", name.name),
            );
            return None;
        }
        self.advance();

        let span = start.merge(self.last_span());
        self.expect_line_end()?;
        Some(HwModuleOp {
            name,
            inner_symbols,
            span,
        })
    }
}
