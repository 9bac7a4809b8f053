//! Symbol table for `#om.ref` resolution.

use std::collections::{HashMap, HashSet};

use om_types::ir::{Module, SymbolPath};
use om_types::Location;
use tracing::trace;

use crate::error::{EvalError, EvalResult};
use crate::value::SymbolRef;

/// Top-level symbols of a module and the inner symbols of each `hw.module`.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    /// `hw.module` name → inner symbol names (`sym @x`).
    modules: HashMap<String, HashSet<String>>,
    classes: HashSet<String>,
}

impl SymbolTable {
    pub fn from_module(module: &Module) -> Self {
        let modules = module
            .hw_modules()
            .map(|hw| {
                let inner = hw.inner_symbols.iter().map(|s| s.name.clone()).collect();
                (hw.name.name.clone(), inner)
            })
            .collect();
        let classes = module.classes().map(|c| c.name.name.clone()).collect();
        Self { modules, classes }
    }

    /// `@Top` names a module or class; `@Top::@inner` names an inner symbol
    /// of the `hw.module` `@Top`. Deeper paths never resolve.
    pub fn contains(&self, path: &SymbolPath) -> bool {
        match path.segments() {
            [top] => self.modules.contains_key(top) || self.classes.contains(top),
            [top, inner] => self
                .modules
                .get(top)
                .is_some_and(|symbols| symbols.contains(inner)),
            _ => false,
        }
    }

    pub fn resolve(&self, path: &SymbolPath, loc: &Location) -> EvalResult<SymbolRef> {
        if !self.contains(path) {
            return Err(EvalError::SymbolResolution {
                path: path.clone(),
                loc: loc.clone(),
            });
        }
        trace!(path = %path, "resolved symbol reference");
        Ok(SymbolRef::new(path.clone()))
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}
