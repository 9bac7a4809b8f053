//! Shared types for the OM evaluator.
//!
//! This crate defines the IR node types, OM types, source spans and
//! load-time diagnostics used by the lexer, parser and evaluator.

mod error;
mod span;
pub mod ir;
pub mod ty;

pub use error::{Diagnostic, Diagnostics, ErrorCategory, ErrorCode, Severity, MAX_ERRORS};
pub use span::{Location, SourceFile, Span};
pub use ty::OmType;

/// Result type used by the loading stages (lexer, parser, verifier).
pub type Result<T> = std::result::Result<T, Diagnostics>;
