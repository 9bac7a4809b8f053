//! Runtime error types for the OM evaluator.

use std::fmt;

use om_types::ir::SymbolPath;
use om_types::{Location, OmType};
use thiserror::Error;

use crate::value::{KeyKind, MapKey, ValueKind};

/// Which container an out-of-range index was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Tuple,
    List,
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tuple => write!(f, "tuple"),
            Self::List => write!(f, "list"),
        }
    }
}

/// Evaluation error: the specific cause of a failed instantiation, field
/// lookup or value access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown class name \"{name}\"")]
    ClassNotFound { name: String, loc: Location },

    #[error(
        "actual parameter list length ({actual}) does not match formal parameter list length ({expected})"
    )]
    ParameterArity {
        class: String,
        expected: usize,
        actual: usize,
        /// Formal parameters rendered as `%name: type`.
        formals: Vec<String>,
        /// Actual parameters rendered as values.
        actuals: Vec<String>,
        loc: Location,
    },

    #[error(
        "actual parameter {index} ({actual}) does not match the type of formal parameter %{name} ({expected})"
    )]
    ParameterTypeMismatch {
        class: String,
        index: usize,
        name: String,
        expected: OmType,
        actual: String,
        loc: Location,
    },

    #[error("field \"{name}\" does not exist")]
    FieldNotFound {
        name: String,
        /// The class operation the lookup ran against.
        operation: String,
        loc: Location,
    },

    #[error("unable to resolve symbol reference {path}")]
    SymbolResolution { path: SymbolPath, loc: Location },

    #[error("{container} index out of range (index {index}, arity {arity})")]
    IndexOutOfRange {
        container: Container,
        index: usize,
        arity: usize,
    },

    /// `actual` is the kind of the key that was supplied.
    #[error("key is not {actual}")]
    KeyKindMismatch { expected: KeyKind, actual: ValueKind },

    #[error("key not found: {key}")]
    KeyNotFound { key: MapKey },

    #[error("use of undefined value %{name}")]
    UndefinedValue { name: String, loc: Location },

    #[error("{message}")]
    TypeMismatch { message: String, loc: Location },

    #[error("instantiation depth limit ({limit}) exceeded while instantiating @{class}")]
    DepthExceeded {
        class: String,
        limit: usize,
        loc: Location,
    },
}

impl EvalError {
    /// Source location of the failing operation, if the error has one.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::ClassNotFound { loc, .. }
            | Self::ParameterArity { loc, .. }
            | Self::ParameterTypeMismatch { loc, .. }
            | Self::FieldNotFound { loc, .. }
            | Self::SymbolResolution { loc, .. }
            | Self::UndefinedValue { loc, .. }
            | Self::TypeMismatch { loc, .. }
            | Self::DepthExceeded { loc, .. } => Some(loc),
            Self::IndexOutOfRange { .. } | Self::KeyKindMismatch { .. } | Self::KeyNotFound { .. } => {
                None
            }
        }
    }

    /// Notes attached below the main error line.
    pub fn notes(&self) -> Vec<String> {
        match self {
            Self::ParameterArity {
                formals, actuals, ..
            } => vec![
                format!("actual parameters: {}", actuals.join(", "))
                    .trim_end()
                    .to_string(),
                format!("formal parameters: {}", formals.join(", "))
                    .trim_end()
                    .to_string(),
            ],
            Self::FieldNotFound { operation, .. } => {
                vec![format!("see current operation: {operation}")]
            }
            _ => Vec::new(),
        }
    }

    /// Multi-line rendering: the error line followed by its notes, each
    /// prefixed with the location.
    pub fn render(&self) -> String {
        let prefix = match self.location() {
            Some(loc) => format!("{loc}: "),
            None => String::new(),
        };
        let mut out = format!("{prefix}error: {self}");
        for note in self.notes() {
            out.push_str(&format!("\n{prefix}note: {note}"));
        }
        out
    }
}

/// The top-level operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Instantiate,
    GetField,
}

impl FailureKind {
    pub fn summary(self) -> &'static str {
        match self {
            Self::Instantiate => "unable to instantiate object, see previous error(s)",
            Self::GetField => "unable to get field, see previous error(s)",
        }
    }
}

/// A failed `instantiate` or `get_field` call: the specific cause plus the
/// summary line naming the operation that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalFailure {
    pub cause: EvalError,
    pub kind: FailureKind,
}

impl EvalFailure {
    pub fn instantiate(cause: EvalError) -> Self {
        Self {
            cause,
            kind: FailureKind::Instantiate,
        }
    }

    pub fn get_field(cause: EvalError) -> Self {
        Self {
            cause,
            kind: FailureKind::GetField,
        }
    }
}

impl fmt::Display for EvalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\nerror: {}", self.cause.render(), self.kind.summary())
    }
}

impl std::error::Error for EvalFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Result alias for evaluator operations.
pub type EvalResult<T> = Result<T, EvalError>;
