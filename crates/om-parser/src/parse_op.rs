//! Operation parsing: `om.constant`, `om.object`, the `*_create` family and
//! `om.class.field`.

use om_lexer::token::{TokenKind, KNOWN_OPERATIONS};
use om_types::ir::*;
use om_types::{ErrorCode, Span};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse one operation line: `[%result =] op.name operands : types`.
    ///
    /// `in_class` is `true` inside an `om.class` body, where `om.class.field`
    /// is allowed.
    pub(crate) fn parse_operation(&mut self, in_class: bool) -> Option<Operation> {
        let start = self.span_here();

        let result = if matches!(self.peek_kind(), TokenKind::ValueId(_)) {
            let result = self.expect_value_id()?;
            self.expect(&TokenKind::Eq)?;
            Some(result)
        } else {
            None
        };

        let op_span = self.span_here();
        let op_name = match self.peek_kind().clone() {
            TokenKind::BareId(name) => {
                self.advance();
                name
            }
            other => {
                self.error_here(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("expected operation name, got '{other}'"),
                );
                return None;
            }
        };

        let kind = match op_name.as_str() {
            "om.constant" => self.parse_constant()?,
            "om.object" => self.parse_object()?,
            "om.list_create" => self.parse_list_create()?,
            "om.tuple_create" => self.parse_tuple_create()?,
            "om.map_create" => self.parse_map_create()?,
            "om.class.field" => {
                if !in_class {
                    self.error_at(
                        ErrorCode::UNKNOWN_OPERATION,
                        "'om.class.field' must appear inside an 'om.class' body",
                        op_span,
                    );
                    return None;
                }
                self.parse_class_field()?
            }
            other => {
                self.report_unknown_operation(other, op_span);
                return None;
            }
        };

        self.check_result_arity(&result, &kind, op_span)?;

        let span = start.merge(self.last_span());
        self.expect_line_end()?;
        Some(Operation::new(result, kind, span))
    }

    fn report_unknown_operation(&mut self, name: &str, span: Span) {
        let diagnostic = if KNOWN_OPERATIONS.contains(&name) {
            self.diagnostic(
                ErrorCode::UNKNOWN_OPERATION,
                format!("'{name}' is not allowed here"),
                span,
            )
        } else {
            self.diagnostic(
                ErrorCode::UNKNOWN_OPERATION,
                format!("unknown operation '{name}'"),
                span,
            )
            .with_suggestion(format!(
                "supported operations: {}",
                KNOWN_OPERATIONS.join(", ")
            ))
        };
        self.push_diagnostic(diagnostic);
    }

    /// `om.class.field` defines no value; every other operation defines one.
    fn check_result_arity(
        &mut self,
        result: &Option<Ident>,
        kind: &OpKind,
        span: Span,
    ) -> Option<()> {
        let is_field = matches!(kind, OpKind::ClassField { .. });
        match (result, is_field) {
            (Some(_), true) => {
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    "'om.class.field' does not produce a result",
                    span,
                );
                None
            }
            (None, false) => {
                self.error_at(
                    ErrorCode::UNEXPECTED_TOKEN,
                    format!("'{}' must define a result value", kind.op_name()),
                    span,
                );
                None
            }
            _ => Some(()),
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Individual operations
    // ══════════════════════════════════════════════════════════════════════════

    /// `<attr> : T`
    fn parse_constant(&mut self) -> Option<OpKind> {
        let value = self.parse_attribute()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Some(OpKind::Constant { value, ty })
    }

    /// `@Class(%a, ...) : (T, ...) -> !om.class.type<@Class>`
    fn parse_object(&mut self) -> Option<OpKind> {
        let class = self.expect_symbol()?;
        self.expect(&TokenKind::LParen)?;
        let actuals = self.parse_value_list()?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Colon)?;

        self.expect(&TokenKind::LParen)?;
        let operand_types = self.parse_type_list(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::Arrow)?;
        let ty = self.parse_type()?;

        if operand_types.len() != actuals.len() {
            self.error_at(
                ErrorCode::UNEXPECTED_TOKEN,
                format!(
                    "om.object has {} operand(s) but {} operand type(s)",
                    actuals.len(),
                    operand_types.len()
                ),
                class.span,
            );
            return None;
        }

        Some(OpKind::Object {
            class,
            actuals,
            operand_types,
            ty,
        })
    }

    /// `%a, %b : T`
    fn parse_list_create(&mut self) -> Option<OpKind> {
        let elements = self.parse_value_list()?;
        self.expect(&TokenKind::Colon)?;
        let element_ty = self.parse_type()?;
        Some(OpKind::ListCreate {
            elements,
            element_ty,
        })
    }

    /// `%a, %b : T1, T2`
    fn parse_tuple_create(&mut self) -> Option<OpKind> {
        let start = self.span_here();
        let elements = self.parse_value_list()?;
        self.expect(&TokenKind::Colon)?;
        let element_tys = self.parse_type_list(&TokenKind::Newline)?;
        if element_tys.len() != elements.len() {
            self.error_at(
                ErrorCode::UNEXPECTED_TOKEN,
                format!(
                    "om.tuple_create has {} element(s) but {} type(s)",
                    elements.len(),
                    element_tys.len()
                ),
                start,
            );
            return None;
        }
        Some(OpKind::TupleCreate {
            elements,
            element_tys,
        })
    }

    /// `%e1, %e2 : K, V`
    fn parse_map_create(&mut self) -> Option<OpKind> {
        let entries = self.parse_value_list()?;
        self.expect(&TokenKind::Colon)?;
        let key_ty = self.parse_type()?;
        self.expect(&TokenKind::Comma)?;
        let value_ty = self.parse_type()?;
        Some(OpKind::MapCreate {
            entries,
            key_ty,
            value_ty,
        })
    }

    /// `@name, %v : T`
    fn parse_class_field(&mut self) -> Option<OpKind> {
        let name = self.expect_symbol()?;
        self.expect(&TokenKind::Comma)?;
        let value = self.expect_value_id()?;
        self.expect(&TokenKind::Colon)?;
        let ty = self.parse_type()?;
        Some(OpKind::ClassField { name, value, ty })
    }
}
