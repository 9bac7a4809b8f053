//! OM object evaluator.
//!
//! Builds a [`ClassRegistry`] from a parsed IR module (verifying it on the
//! way) and instantiates classes into [`Object`]s whose fields are fully
//! evaluated [`Value`]s.
//!
//! ```ignore
//! let module = om_parser::parse_str("test.mlir", SOURCE)?;
//! let evaluator = Evaluator::new(&module)?;
//! let obj = evaluator.instantiate("Test", vec![Value::Integer(42)])?;
//! assert_eq!(obj.get_field("field")?, &Value::Integer(42));
//! ```

mod config;
mod env;
mod error;
mod evaluator;
mod object;
mod registry;
mod symbols;
mod value;
mod verify;

pub use config::{EvalConfig, DEFAULT_MAX_DEPTH};
pub use error::{Container, EvalError, EvalFailure, EvalResult, FailureKind};
pub use evaluator::Evaluator;
pub use object::Object;
pub use registry::{ClassDef, ClassRegistry, FieldDef};
pub use symbols::SymbolTable;
pub use value::{KeyKind, ListValue, MapKey, MapValue, SymbolRef, TupleValue, Value, ValueKind};
