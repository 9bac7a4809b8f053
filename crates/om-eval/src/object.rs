//! Instantiated objects.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use om_types::OmType;

use crate::error::{EvalError, EvalFailure};
use crate::registry::ClassDef;
use crate::value::Value;

/// An instance of an OM class: every field of the class, evaluated.
#[derive(Debug, Clone)]
pub struct Object {
    class: Arc<ClassDef>,
    fields: IndexMap<String, Value>,
}

impl Object {
    pub(crate) fn new(class: Arc<ClassDef>, fields: IndexMap<String, Value>) -> Self {
        Self { class, fields }
    }

    pub fn class(&self) -> &ClassDef {
        &self.class
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    /// `!om.class.type<@Name>`
    pub fn class_type(&self) -> OmType {
        OmType::Class(self.class.name().to_string())
    }

    /// Look up a field by name.
    pub fn get_field(&self, name: &str) -> Result<&Value, EvalFailure> {
        self.fields.get(name).ok_or_else(|| {
            EvalFailure::get_field(EvalError::FieldNotFound {
                name: name.to_string(),
                operation: self.class.signature().to_string(),
                loc: self.class.location().clone(),
            })
        })
    }

    /// Like [`Object::get_field`] without the diagnostic.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// `(name, value)` pairs in field declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }
}

/// Objects are equal when they instantiate the same class with equal fields.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.class.name() == other.class.name() && self.fields.iter().eq(other.fields.iter())
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{} {{", self.class.name())?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {name}: {value}")?;
        }
        if !self.fields.is_empty() {
            write!(f, " ")?;
        }
        write!(f, "}}")
    }
}
