//! Object evaluator: instantiates classes by walking their bodies.

use std::sync::Arc;

use indexmap::IndexMap;
use om_types::ir::{Attribute, Ident, Module, OpKind, Operation};
use om_types::{Diagnostics, Location, OmType, Span};
use tracing::{debug, trace, warn};

use crate::config::EvalConfig;
use crate::env::Environment;
use crate::error::{EvalError, EvalFailure, EvalResult};
use crate::object::Object;
use crate::registry::{ClassDef, ClassRegistry};
use crate::value::{KeyKind, ListValue, MapKey, MapValue, TupleValue, Value};

/// Instantiates objects from a verified module.
///
/// The evaluator itself is immutable; every [`Evaluator::instantiate`] call
/// gets its own environment, so one evaluator can be shared across threads.
#[derive(Debug, Clone)]
pub struct Evaluator {
    registry: Arc<ClassRegistry>,
    config: EvalConfig,
}

impl Evaluator {
    /// Verify `module` and build an evaluator with the default config.
    pub fn new(module: &Module) -> Result<Self, Diagnostics> {
        Self::with_config(module, EvalConfig::default())
    }

    pub fn with_config(module: &Module, config: EvalConfig) -> Result<Self, Diagnostics> {
        let registry = ClassRegistry::build(module)?;
        Ok(Self::from_registry(Arc::new(registry), config))
    }

    pub fn from_registry(registry: Arc<ClassRegistry>, config: EvalConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Instantiate `class` with `actuals` bound to its formal parameters.
    ///
    /// Returns a fully populated object or the first error hit; no partial
    /// object escapes.
    pub fn instantiate(&self, class: &str, actuals: Vec<Value>) -> Result<Object, EvalFailure> {
        let mut call = Instantiation {
            registry: &self.registry,
            config: &self.config,
            env: Environment::new(),
        };
        call.instantiate(class, actuals, None)
            .map_err(EvalFailure::instantiate)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Per-call state
// ══════════════════════════════════════════════════════════════════════════════

struct Instantiation<'e> {
    registry: &'e ClassRegistry,
    config: &'e EvalConfig,
    env: Environment,
}

impl<'e> Instantiation<'e> {
    /// `site` is the `om.object` location for nested instantiations.
    fn instantiate(
        &mut self,
        class_name: &str,
        actuals: Vec<Value>,
        site: Option<&Location>,
    ) -> EvalResult<Object> {
        let class = match self.registry.lookup(class_name) {
            Ok(class) => Arc::clone(class),
            Err(EvalError::ClassNotFound { name, .. }) => {
                return Err(EvalError::ClassNotFound {
                    name,
                    loc: site.cloned().unwrap_or_else(Location::unknown),
                })
            }
            Err(other) => return Err(other),
        };
        let loc = site.unwrap_or(class.location());

        let depth = self.env.depth();
        if depth >= self.config.max_depth {
            return Err(EvalError::DepthExceeded {
                class: class.name().to_string(),
                limit: self.config.max_depth,
                loc: loc.clone(),
            });
        }
        check_actuals(&class, &actuals, loc)?;

        debug!(class = class.name(), actuals = actuals.len(), depth, "instantiating object");

        self.env.push_frame();
        let result = self.eval_fields(&class, actuals);
        self.env.pop_frame();
        result
    }

    fn eval_fields(&mut self, class: &Arc<ClassDef>, actuals: Vec<Value>) -> EvalResult<Object> {
        for (param, value) in class.params().iter().zip(actuals) {
            self.env.define_local(&param.name.name, value);
        }

        let mut fields = IndexMap::with_capacity(class.fields().len());
        for field in class.fields() {
            trace!(class = class.name(), field = %field.name, "evaluating field");
            let value = self.resolve(Some(&**class), &field.value, field.span)?;
            fields.insert(field.name.clone(), value);
        }
        Ok(Object::new(Arc::clone(class), fields))
    }

    // ── Value resolution ────────────────────────────────────────────────────

    /// Look up SSA value `name`, evaluating its defining operation on first
    /// use. `scope` is the enclosing class, or `None` at module level.
    fn resolve(&mut self, scope: Option<&ClassDef>, name: &str, span: Span) -> EvalResult<Value> {
        if let Some(class) = scope {
            if let Some(value) = self.env.get_local(name) {
                return Ok(value.clone());
            }
            if let Some(op) = class.defining_op(name) {
                let value = self.eval_op(scope, op)?;
                self.env.define_local(name, value.clone());
                return Ok(value);
            }
        }

        if let Some(value) = self.env.get_global(name) {
            return Ok(value.clone());
        }
        let registry = self.registry;
        if let Some(op) = registry.module_value(name) {
            let value = self.eval_op(None, op)?;
            self.env.define_global(name, value.clone());
            return Ok(value);
        }

        Err(EvalError::UndefinedValue {
            name: name.to_string(),
            loc: self.registry.location(span),
        })
    }

    fn resolve_all(&mut self, scope: Option<&ClassDef>, names: &[Ident]) -> EvalResult<Vec<Value>> {
        names
            .iter()
            .map(|ident| self.resolve(scope, &ident.name, ident.span))
            .collect()
    }

    // ── Operations ──────────────────────────────────────────────────────────

    fn eval_op(&mut self, scope: Option<&ClassDef>, op: &Operation) -> EvalResult<Value> {
        let loc = self.registry.location(op.span);
        match &op.kind {
            OpKind::Constant { value, ty } => self.eval_attribute(value, ty, &loc),

            OpKind::Object { class, actuals, .. } => {
                let actuals = self.resolve_all(scope, actuals)?;
                let object = self.instantiate(&class.name, actuals, Some(&loc))?;
                Ok(Value::Object(Arc::new(object)))
            }

            OpKind::ListCreate {
                elements,
                element_ty,
            } => {
                let elements = self.resolve_all(scope, elements)?;
                Ok(Value::List(ListValue::new(element_ty.clone(), elements)))
            }

            OpKind::TupleCreate { elements, .. } => {
                let elements = self.resolve_all(scope, elements)?;
                Ok(Value::Tuple(TupleValue::new(elements)))
            }

            OpKind::MapCreate {
                entries,
                key_ty,
                value_ty,
            } => {
                let entries = self.resolve_all(scope, entries)?;
                build_map(entries, key_ty, value_ty, &loc)
            }

            OpKind::ClassField { .. } => Err(EvalError::TypeMismatch {
                message: "'om.class.field' does not define a value".to_string(),
                loc,
            }),
        }
    }

    fn eval_attribute(&self, attr: &Attribute, ty: &OmType, loc: &Location) -> EvalResult<Value> {
        match attr {
            Attribute::Integer(n) => Ok(Value::Integer(*n)),
            Attribute::String(s) => Ok(Value::String(s.clone())),
            Attribute::List {
                element_ty,
                elements,
            } => {
                let elements = elements
                    .iter()
                    .map(|e| self.eval_attribute(e, element_ty, loc))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::List(ListValue::new(element_ty.clone(), elements)))
            }
            Attribute::Map { value_ty, entries } => {
                let key_kind = match ty {
                    OmType::Map(key, _) => map_key_kind(key, loc)?,
                    _ => KeyKind::String,
                };
                let mut map = IndexMap::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = match key_kind {
                        KeyKind::String => MapKey::String(key.clone()),
                        KeyKind::Integer => match key.parse() {
                            Ok(n) => MapKey::Integer(n),
                            Err(_) => {
                                return Err(EvalError::TypeMismatch {
                                    message: format!("map key '{key}' is not an integer"),
                                    loc: loc.clone(),
                                })
                            }
                        },
                    };
                    map.insert(key, self.eval_attribute(value, value_ty, loc)?);
                }
                Ok(Value::Map(MapValue::new(key_kind, value_ty.clone(), map)))
            }
            Attribute::Ref(path) => {
                let reference = self.registry.symbols().resolve(path, loc)?;
                Ok(Value::Reference(reference))
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn check_actuals(class: &ClassDef, actuals: &[Value], loc: &Location) -> EvalResult<()> {
    let params = class.params();
    if params.len() != actuals.len() {
        return Err(EvalError::ParameterArity {
            class: class.name().to_string(),
            expected: params.len(),
            actual: actuals.len(),
            formals: params.iter().map(|p| p.to_string()).collect(),
            actuals: actuals.iter().map(|v| v.to_string()).collect(),
            loc: loc.clone(),
        });
    }

    for (index, (param, value)) in params.iter().zip(actuals).enumerate() {
        if !value.conforms_to(&param.ty) {
            return Err(EvalError::ParameterTypeMismatch {
                class: class.name().to_string(),
                index,
                name: param.name.name.clone(),
                expected: param.ty.clone(),
                actual: value.kind().to_string(),
                loc: loc.clone(),
            });
        }
    }
    Ok(())
}

fn map_key_kind(key_ty: &OmType, loc: &Location) -> EvalResult<KeyKind> {
    KeyKind::from_type(key_ty).ok_or_else(|| EvalError::TypeMismatch {
        message: format!("{key_ty} cannot be used as a map key type"),
        loc: loc.clone(),
    })
}

/// Build a map from `(key, value)` tuples. A repeated key overwrites the
/// earlier value but keeps its original position.
fn build_map(
    entries: Vec<Value>,
    key_ty: &OmType,
    value_ty: &OmType,
    loc: &Location,
) -> EvalResult<Value> {
    let key_kind = map_key_kind(key_ty, loc)?;
    let mut map = IndexMap::with_capacity(entries.len());

    for entry in entries {
        let (key, value) = match entry.as_tuple().map(|t| t.as_slice()) {
            Some([key, value]) => (key, value),
            _ => {
                return Err(EvalError::TypeMismatch {
                    message: format!("map entry must be a (key, value) tuple, got {entry}"),
                    loc: loc.clone(),
                })
            }
        };
        let key = match MapKey::from_value(key) {
            Some(key) if key.kind() == key_kind => key,
            _ => {
                return Err(EvalError::TypeMismatch {
                    message: format!("map key {key} is not {key_kind}"),
                    loc: loc.clone(),
                })
            }
        };
        if map.contains_key(&key) {
            warn!(key = %key, location = %loc, "duplicate key in map construction; keeping the last value");
        }
        map.insert(key, value.clone());
    }

    Ok(Value::Map(MapValue::new(key_kind, value_ty.clone(), map)))
}
