//! IR node types for the OM dialect.
//!
//! Every operation carries a [`Span`] for diagnostics. Operations are kept
//! in source order; nothing here is sorted or deduplicated.

use crate::ty::OmType;
use crate::{Location, Span};
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A parsed `module { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Name of the file the module was parsed from (may be empty).
    pub file: String,
    pub ops: Vec<TopLevelOp>,
    pub span: Span,
}

impl Module {
    pub fn new(file: impl Into<String>, ops: Vec<TopLevelOp>, span: Span) -> Self {
        Self {
            file: file.into(),
            ops,
            span,
        }
    }

    /// All `om.class` declarations, in source order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassOp> {
        self.ops.iter().filter_map(|op| match op {
            TopLevelOp::Class(class) => Some(class),
            _ => None,
        })
    }

    /// All `hw.module` declarations, in source order.
    pub fn hw_modules(&self) -> impl Iterator<Item = &HwModuleOp> {
        self.ops.iter().filter_map(|op| match op {
            TopLevelOp::HwModule(hw) => Some(hw),
            _ => None,
        })
    }

    /// Operations defined directly in the module body (e.g. shared constants).
    pub fn module_ops(&self) -> impl Iterator<Item = &Operation> {
        self.ops.iter().filter_map(|op| match op {
            TopLevelOp::Op(op) => Some(op),
            _ => None,
        })
    }

    /// Anchor a span to this module's file.
    pub fn location(&self, span: Span) -> Location {
        Location::new(self.file.clone(), span)
    }
}

/// An operation directly inside the module body.
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelOp {
    Class(ClassOp),
    HwModule(HwModuleOp),
    Op(Operation),
}

// ══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════════════════════

/// A spanned name: an SSA value (`%x` → `x`) or a symbol (`@X` → `X`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Declarations
// ══════════════════════════════════════════════════════════════════════════════

/// `om.class @Name(%p: T, ...) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassOp {
    pub name: Ident,
    pub params: Vec<BlockArg>,
    pub body: Vec<Operation>,
    pub span: Span,
}

impl ClassOp {
    /// The `om.class.field` operations of the body, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = FieldRef<'_>> {
        self.body.iter().filter_map(|op| match &op.kind {
            OpKind::ClassField { name, value, ty } => Some(FieldRef {
                name,
                value,
                ty,
                span: op.span,
            }),
            _ => None,
        })
    }

    /// Header of the class as printed in diagnostics:
    /// `om.class @Test(%param: !om.integer)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        format!("om.class @{}({})", self.name.name, params.join(", "))
    }
}

/// A borrowed view of one `om.class.field` operation.
#[derive(Debug, Clone, Copy)]
pub struct FieldRef<'a> {
    pub name: &'a Ident,
    pub value: &'a Ident,
    pub ty: &'a OmType,
    pub span: Span,
}

/// A formal parameter of a class: `%param: !om.integer`.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockArg {
    pub name: Ident,
    pub ty: OmType,
    pub span: Span,
}

impl fmt::Display for BlockArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}: {}", self.name.name, self.ty)
    }
}

/// `hw.module @Name(...) { ... }`. Only the inner symbols (`sym @x`) of the
/// body are retained; everything else is opaque to the OM layer.
#[derive(Debug, Clone, PartialEq)]
pub struct HwModuleOp {
    pub name: Ident,
    pub inner_symbols: Vec<Ident>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Operations
// ══════════════════════════════════════════════════════════════════════════════

/// A single operation, optionally defining an SSA value.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub result: Option<Ident>,
    pub kind: OpKind,
    pub span: Span,
}

impl Operation {
    pub fn new(result: Option<Ident>, kind: OpKind, span: Span) -> Self {
        Self { result, kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OpKind {
    /// `%r = om.constant <attr> : T`
    Constant { value: Attribute, ty: OmType },
    /// `%r = om.object @Class(%a, ...) : (T, ...) -> !om.class.type<@Class>`
    Object {
        class: Ident,
        actuals: Vec<Ident>,
        operand_types: Vec<OmType>,
        ty: OmType,
    },
    /// `%r = om.list_create %a, %b : T`
    ListCreate {
        elements: Vec<Ident>,
        element_ty: OmType,
    },
    /// `%r = om.tuple_create %a, %b : T1, T2`
    TupleCreate {
        elements: Vec<Ident>,
        element_tys: Vec<OmType>,
    },
    /// `%r = om.map_create %e1, %e2 : K, V`
    MapCreate {
        entries: Vec<Ident>,
        key_ty: OmType,
        value_ty: OmType,
    },
    /// `om.class.field @name, %v : T`
    ClassField {
        name: Ident,
        value: Ident,
        ty: OmType,
    },
}

impl OpKind {
    /// The operation name as written in the IR.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::Constant { .. } => "om.constant",
            Self::Object { .. } => "om.object",
            Self::ListCreate { .. } => "om.list_create",
            Self::TupleCreate { .. } => "om.tuple_create",
            Self::MapCreate { .. } => "om.map_create",
            Self::ClassField { .. } => "om.class.field",
        }
    }

    /// SSA values used by this operation, in operand order.
    pub fn operands(&self) -> Vec<&Ident> {
        match self {
            Self::Constant { .. } => Vec::new(),
            Self::Object { actuals, .. } => actuals.iter().collect(),
            Self::ListCreate { elements, .. } | Self::TupleCreate { elements, .. } => {
                elements.iter().collect()
            }
            Self::MapCreate { entries, .. } => entries.iter().collect(),
            Self::ClassField { value, .. } => vec![value],
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Attributes
// ══════════════════════════════════════════════════════════════════════════════

/// A typed constant attached to `om.constant`.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// `#om.integer<14>` or `14 : i64`
    Integer(i64),
    /// `"X"`
    String(String),
    /// `#om.list<T, [a : T, ...]>`
    List {
        element_ty: OmType,
        elements: Vec<Attribute>,
    },
    /// `#om.map<V, {k = v, ...}>`; keys are strings, in textual order.
    Map {
        value_ty: OmType,
        entries: Vec<(String, Attribute)>,
    },
    /// `#om.ref<<@Module::@sym>>`
    Ref(SymbolPath),
}

/// A path of symbol names: `<@Root::@x>` is `["Root", "x"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolPath(pub Vec<String>);

impl SymbolPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for SymbolPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "::")?;
            }
            write!(f, "@{segment}")?;
        }
        write!(f, ">")
    }
}
