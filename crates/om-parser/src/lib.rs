//! OM IR parser: converts a token stream into an IR [`Module`].

mod parse_attr;
mod parse_module;
mod parse_op;
mod parse_type;
mod parser;

pub use parser::{ParseResult, Parser};

use om_lexer::Lexer;
use om_types::ir::Module;
use om_types::{Diagnostic, Diagnostics, ErrorCode, SourceFile, Span};

/// Lex and parse a source file in one step.
///
/// Lexer and parser errors are merged; any error fails the whole load.
pub fn parse_source(source_file: &SourceFile) -> om_types::Result<Module> {
    let lexed = Lexer::new(source_file).lex();
    let mut errors = lexed.errors;
    if errors.is_full() {
        return Err(errors);
    }

    let parsed = Parser::new(lexed.tokens, source_file).parse();
    errors.extend(parsed.errors);
    match parsed.module {
        Some(module) if !errors.has_errors() => Ok(module),
        _ => {
            if !errors.has_errors() {
                errors.push_error(Diagnostic::new(
                    &source_file.name,
                    ErrorCode::UNEXPECTED_TOKEN,
                    "failed to parse module",
                    Span::point(1, 1),
                    source_file.line(1).unwrap_or(""),
                ));
            }
            Err(errors)
        }
    }
}

/// Convenience wrapper around [`parse_source`] for in-memory text.
pub fn parse_str(name: &str, source: &str) -> Result<Module, Diagnostics> {
    parse_source(&SourceFile::new(name, source))
}
