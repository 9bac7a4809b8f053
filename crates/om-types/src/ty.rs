//! Types of the OM dialect, as written in the IR (`!om.integer`,
//! `!om.list<!om.string>`, `!om.class.type<@Child>`, ...).

use std::fmt;

/// A type annotation attached to an IR value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OmType {
    /// `!om.integer`
    Integer,
    /// Builtin fixed-width integer `iN`.
    Int(u32),
    /// `!om.string`
    String,
    /// `!om.ref`
    Ref,
    /// `!om.any`
    Any,
    /// `!om.list<T>`
    List(Box<OmType>),
    /// `!om.map<K, V>`
    Map(Box<OmType>, Box<OmType>),
    /// `tuple<T1, T2, ...>`
    Tuple(Vec<OmType>),
    /// `!om.class.type<@Name>`
    Class(String),
}

impl OmType {
    pub fn list(element: OmType) -> Self {
        Self::List(Box::new(element))
    }

    pub fn map(key: OmType, value: OmType) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    pub fn is_integer_like(&self) -> bool {
        matches!(self, Self::Integer | Self::Int(_))
    }
}

impl fmt::Display for OmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "!om.integer"),
            Self::Int(width) => write!(f, "i{width}"),
            Self::String => write!(f, "!om.string"),
            Self::Ref => write!(f, "!om.ref"),
            Self::Any => write!(f, "!om.any"),
            Self::List(elem) => write!(f, "!om.list<{elem}>"),
            Self::Map(key, value) => write!(f, "!om.map<{key}, {value}>"),
            Self::Tuple(elems) => {
                write!(f, "tuple<")?;
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{elem}")?;
                }
                write!(f, ">")
            }
            Self::Class(name) => write!(f, "!om.class.type<@{name}>"),
        }
    }
}
