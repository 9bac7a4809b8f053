//! Runtime values produced by evaluating OM classes.
//!
//! Containers share their storage through [`Arc`], so cloning a `Value` is
//! cheap and values can be handed across threads.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use om_types::ir::SymbolPath;
use om_types::OmType;
use serde_json::json;

use crate::error::{Container, EvalError, EvalResult};
use crate::object::Object;

// ══════════════════════════════════════════════════════════════════════════════
// Value
// ══════════════════════════════════════════════════════════════════════════════

/// An evaluated OM value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    String(String),
    List(ListValue),
    Tuple(TupleValue),
    Map(MapValue),
    Object(Arc<Object>),
    Reference(SymbolRef),
}

/// Discriminant of a [`Value`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    String,
    List,
    Tuple,
    Map,
    Object,
    Reference,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Map => "map",
            Self::Object => "object",
            Self::Reference => "reference",
        };
        write!(f, "{name}")
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::String(_) => ValueKind::String,
            Self::List(_) => ValueKind::List,
            Self::Tuple(_) => ValueKind::Tuple,
            Self::Map(_) => ValueKind::Map,
            Self::Object(_) => ValueKind::Object,
            Self::Reference(_) => ValueKind::Reference,
        }
    }

    // ── Predicates ──────────────────────────────────────────────────────────

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Self::Tuple(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Self::Reference(_))
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&TupleValue> {
        match self {
            Self::Tuple(tuple) => Some(tuple),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&SymbolRef> {
        match self {
            Self::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Whether this value is acceptable where `ty` is declared.
    pub fn conforms_to(&self, ty: &OmType) -> bool {
        match (ty, self) {
            (OmType::Any, _) => true,
            (OmType::Integer | OmType::Int(_), Self::Integer(_)) => true,
            (OmType::String, Self::String(_)) => true,
            (OmType::Ref, Self::Reference(_)) => true,
            (OmType::List(element), Self::List(list)) => {
                list.iter().all(|v| v.conforms_to(element))
            }
            (OmType::Map(key, value), Self::Map(map)) => {
                KeyKind::from_type(key).map_or(**key == OmType::Any, |k| k == map.key_kind())
                    && map.items().all(|(_, v)| v.conforms_to(value))
            }
            (OmType::Tuple(elements), Self::Tuple(tuple)) => {
                elements.len() == tuple.arity()
                    && elements.iter().zip(tuple.iter()).all(|(t, v)| v.conforms_to(t))
            }
            (OmType::Class(name), Self::Object(object)) => object.class_name() == name,
            _ => false,
        }
    }

    /// JSON rendering: lists and tuples become arrays, maps and objects
    /// become JSON objects, references become arrays of path segments.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Integer(n) => json!(n),
            Self::String(s) => json!(s),
            Self::List(list) => list.iter().map(Value::to_json).collect(),
            Self::Tuple(tuple) => tuple.iter().map(Value::to_json).collect(),
            Self::Map(map) => serde_json::Value::Object(
                map.items()
                    .map(|(k, v)| (k.to_json_key(), v.to_json()))
                    .collect(),
            ),
            Self::Object(object) => object.to_json(),
            Self::Reference(reference) => json!(reference.path()),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(list) => {
                write!(f, "[")?;
                write_joined(f, list.iter())?;
                write!(f, "]")
            }
            Self::Tuple(tuple) => {
                write!(f, "(")?;
                write_joined(f, tuple.iter())?;
                write!(f, ")")
            }
            Self::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.items().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Self::Object(object) => write!(f, "{object}"),
            Self::Reference(reference) => write!(f, "{reference}"),
        }
    }
}

fn write_joined<'a>(
    f: &mut fmt::Formatter<'_>,
    values: impl Iterator<Item = &'a Value>,
) -> fmt::Result {
    for (i, value) in values.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}

// ══════════════════════════════════════════════════════════════════════════════
// Lists and tuples
// ══════════════════════════════════════════════════════════════════════════════

/// An ordered, homogeneous list.
#[derive(Debug, Clone)]
pub struct ListValue {
    element_ty: OmType,
    elements: Arc<[Value]>,
}

impl ListValue {
    pub fn new(element_ty: OmType, elements: Vec<Value>) -> Self {
        Self {
            element_ty,
            elements: Arc::from(elements),
        }
    }

    pub fn element_type(&self) -> &OmType {
        &self.element_ty
    }

    /// Bounds-checked positional access.
    pub fn get(&self, index: usize) -> EvalResult<&Value> {
        self.elements.get(index).ok_or(EvalError::IndexOutOfRange {
            container: Container::List,
            index,
            arity: self.elements.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.elements
    }
}

/// Lists compare by their elements only.
impl PartialEq for ListValue {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

/// A fixed-arity, heterogeneous tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleValue {
    elements: Arc<[Value]>,
}

impl TupleValue {
    pub fn new(elements: Vec<Value>) -> Self {
        Self {
            elements: Arc::from(elements),
        }
    }

    /// Bounds-checked positional access.
    pub fn get(&self, index: usize) -> EvalResult<&Value> {
        self.elements.get(index).ok_or(EvalError::IndexOutOfRange {
            container: Container::Tuple,
            index,
            arity: self.elements.len(),
        })
    }

    pub fn arity(&self) -> usize {
        self.elements.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.elements.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.elements
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Maps
// ══════════════════════════════════════════════════════════════════════════════

/// The key kind a map was declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Integer,
    String,
}

impl KeyKind {
    /// Key kind for a declared key type; `None` for types that cannot key a map.
    pub fn from_type(ty: &OmType) -> Option<Self> {
        match ty {
            OmType::Integer | OmType::Int(_) => Some(Self::Integer),
            OmType::String => Some(Self::String),
            _ => None,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::String => write!(f, "string"),
        }
    }
}

/// A map key: integers and strings are the only hashable values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Integer(i64),
    String(String),
}

impl MapKey {
    /// Convert a value into a key; `None` for non-hashable values.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(n) => Some(Self::Integer(*n)),
            Value::String(s) => Some(Self::String(s.clone())),
            _ => None,
        }
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Integer(_) => KeyKind::Integer,
            Self::String(_) => KeyKind::String,
        }
    }

    fn to_json_key(&self) -> String {
        match self {
            Self::Integer(n) => n.to_string(),
            Self::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// A map with a single key kind, iterated in insertion order.
#[derive(Debug, Clone)]
pub struct MapValue {
    key_kind: KeyKind,
    value_ty: OmType,
    entries: Arc<IndexMap<MapKey, Value>>,
}

impl MapValue {
    pub fn new(key_kind: KeyKind, value_ty: OmType, entries: IndexMap<MapKey, Value>) -> Self {
        Self {
            key_kind,
            value_ty,
            entries: Arc::new(entries),
        }
    }

    pub fn key_kind(&self) -> KeyKind {
        self.key_kind
    }

    pub fn value_type(&self) -> &OmType {
        &self.value_ty
    }

    /// Keyed access. Fails with `KeyKindMismatch` when `key` is not of the
    /// map's key kind and with `KeyNotFound` when it is absent.
    pub fn get(&self, key: &Value) -> EvalResult<&Value> {
        let key = match MapKey::from_value(key) {
            Some(key) if key.kind() == self.key_kind => key,
            _ => {
                return Err(EvalError::KeyKindMismatch {
                    expected: self.key_kind,
                    actual: key.kind(),
                })
            }
        };
        self.entries
            .get(&key)
            .ok_or(EvalError::KeyNotFound { key })
    }

    /// `(key, value)` pairs in insertion order.
    pub fn items(&self) -> indexmap::map::Iter<'_, MapKey, Value> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, MapKey, Value> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps compare by key kind and entries, including order.
impl PartialEq for MapValue {
    fn eq(&self, other: &Self) -> bool {
        self.key_kind == other.key_kind && self.entries.iter().eq(other.entries.iter())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// References
// ══════════════════════════════════════════════════════════════════════════════

/// A resolved `#om.ref` path, e.g. `["Root", "x"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolRef {
    path: SymbolPath,
}

impl SymbolRef {
    pub fn new(path: SymbolPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &[String] {
        self.path.segments()
    }

    pub fn symbol_path(&self) -> &SymbolPath {
        &self.path
    }
}

impl fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#om.ref<{}>", self.path)
    }
}
