//! Class registry: every `om.class` of a verified module, by name.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use om_types::ir::{BlockArg, ClassOp, Module, OpKind, Operation};
use om_types::{Diagnostics, Location, OmType, SourceFile, Span};
use tracing::debug;

use crate::error::{EvalError, EvalResult};
use crate::symbols::SymbolTable;
use crate::verify::Verifier;

// ══════════════════════════════════════════════════════════════════════════════
// Class definitions
// ══════════════════════════════════════════════════════════════════════════════

/// A declared field: `om.class.field @name, %value : T`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    /// The SSA value the field exposes.
    pub value: String,
    pub ty: OmType,
    pub span: Span,
}

/// A registered class: formals, fields in declaration order, and the body
/// operations that define its values.
#[derive(Debug, Clone)]
pub struct ClassDef {
    name: String,
    params: Vec<BlockArg>,
    fields: Vec<FieldDef>,
    body: Vec<Operation>,
    /// SSA value name → index into `body` of its defining operation.
    defs: HashMap<String, usize>,
    signature: String,
    location: Location,
}

impl ClassDef {
    fn from_op(class: &ClassOp, file: &str) -> Self {
        let fields = class
            .fields()
            .map(|f| FieldDef {
                name: f.name.name.clone(),
                value: f.value.name.clone(),
                ty: f.ty.clone(),
                span: f.span,
            })
            .collect();
        let defs = class
            .body
            .iter()
            .enumerate()
            .filter_map(|(i, op)| op.result.as_ref().map(|r| (r.name.clone(), i)))
            .collect();

        Self {
            name: class.name.name.clone(),
            params: class.params.clone(),
            fields,
            body: class.body.clone(),
            defs,
            signature: class.signature(),
            location: Location::new(file, class.span),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[BlockArg] {
        &self.params
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn body(&self) -> &[Operation] {
        &self.body
    }

    /// The operation defining SSA value `name` in this class body.
    pub fn defining_op(&self, name: &str) -> Option<&Operation> {
        self.defs.get(name).map(|&i| &self.body[i])
    }

    /// `om.class @Test(%param: !om.integer)`
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Classes this class instantiates, in body order.
    pub fn instantiated_classes(&self) -> impl Iterator<Item = &str> {
        self.body.iter().filter_map(|op| match &op.kind {
            OpKind::Object { class, .. } => Some(class.name.as_str()),
            _ => None,
        })
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Registry
// ══════════════════════════════════════════════════════════════════════════════

/// Read-only after [`ClassRegistry::build`].
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    file: String,
    classes: IndexMap<String, Arc<ClassDef>>,
    /// Module-level operations (shared constants).
    module_ops: Vec<Operation>,
    module_defs: HashMap<String, usize>,
    symbols: SymbolTable,
}

impl ClassRegistry {
    /// Verify `module` and register its classes.
    pub fn build(module: &Module) -> Result<Self, Diagnostics> {
        Self::build_inner(module, None)
    }

    /// Like [`ClassRegistry::build`], with source lines attached to the
    /// diagnostics.
    pub fn build_with_source(module: &Module, source: &SourceFile) -> Result<Self, Diagnostics> {
        Self::build_inner(module, Some(source))
    }

    fn build_inner(module: &Module, source: Option<&SourceFile>) -> Result<Self, Diagnostics> {
        Verifier::new(module, source).verify()?;

        let classes: IndexMap<String, Arc<ClassDef>> = module
            .classes()
            .map(|class| {
                (
                    class.name.name.clone(),
                    Arc::new(ClassDef::from_op(class, &module.file)),
                )
            })
            .collect();
        let module_ops: Vec<Operation> = module.module_ops().cloned().collect();
        let module_defs = module_ops
            .iter()
            .enumerate()
            .filter_map(|(i, op)| op.result.as_ref().map(|r| (r.name.clone(), i)))
            .collect();
        let symbols = SymbolTable::from_module(module);

        debug!(
            file = %module.file,
            classes = classes.len(),
            hw_modules = symbols.module_count(),
            module_values = module_ops.len(),
            "built class registry"
        );

        Ok(Self {
            file: module.file.clone(),
            classes,
            module_ops,
            module_defs,
            symbols,
        })
    }

    pub fn lookup(&self, name: &str) -> EvalResult<&Arc<ClassDef>> {
        self.classes.get(name).ok_or_else(|| EvalError::ClassNotFound {
            name: name.to_string(),
            loc: Location::unknown(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name).map(Arc::as_ref)
    }

    /// Classes in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassDef> {
        self.classes.values().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The module-level operation defining `name`, if any.
    pub fn module_value(&self, name: &str) -> Option<&Operation> {
        self.module_defs.get(name).map(|&i| &self.module_ops[i])
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn location(&self, span: Span) -> Location {
        Location::new(self.file.clone(), span)
    }
}
