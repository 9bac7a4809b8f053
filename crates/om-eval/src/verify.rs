//! Load-time verification of an IR module.
//!
//! Runs once, before any class is registered, and collects every problem as
//! a structured [`Diagnostic`] instead of stopping at the first one.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use om_types::ir::{ClassOp, Module, OpKind, Operation, TopLevelOp};
use om_types::{Diagnostic, Diagnostics, ErrorCode, SourceFile, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Active,
    Done,
}

/// Class name → `om.object` edges `(target, span)` of its body.
type ClassGraph<'m> = IndexMap<&'m str, Vec<(&'m str, Span)>>;

pub(crate) struct Verifier<'m> {
    module: &'m Module,
    source: Option<&'m SourceFile>,
    errors: Diagnostics,
}

impl<'m> Verifier<'m> {
    pub(crate) fn new(module: &'m Module, source: Option<&'m SourceFile>) -> Self {
        Self {
            module,
            source,
            errors: Diagnostics::empty(),
        }
    }

    pub(crate) fn verify(mut self) -> Result<(), Diagnostics> {
        let arities = self.check_symbols();
        let module_scope = self.check_module_ops();
        let module = self.module;
        for class in module.classes() {
            if self.errors.is_full() {
                break;
            }
            self.check_class(class, &arities, &module_scope);
        }
        if !self.errors.is_full() {
            self.check_cycles();
        }

        if self.errors.has_errors() {
            Err(self.errors)
        } else {
            Ok(())
        }
    }

    // ── Diagnostics ─────────────────────────────────────────────────────────

    fn diagnostic(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> Diagnostic {
        let source_line = self
            .source
            .and_then(|source| source.line(span.start_line))
            .unwrap_or("");
        Diagnostic::new(&self.module.file, code, message, span, source_line)
    }

    fn error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        let diagnostic = self.diagnostic(code, message, span);
        self.errors.push_error(diagnostic);
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Symbols
    // ══════════════════════════════════════════════════════════════════════════

    /// Class and `hw.module` names share one namespace. Returns the formal
    /// parameter count of every class (first definition wins).
    fn check_symbols(&mut self) -> HashMap<&'m str, usize> {
        let mut seen: HashMap<&'m str, Span> = HashMap::new();
        let mut arities = HashMap::new();

        let module = self.module;
        for op in &module.ops {
            let name = match op {
                TopLevelOp::Class(class) => &class.name,
                TopLevelOp::HwModule(hw) => &hw.name,
                TopLevelOp::Op(_) => continue,
            };
            if let Some(previous) = seen.get(name.name.as_str()) {
                let diagnostic = self
                    .diagnostic(
                        ErrorCode::DUPLICATE_SYMBOL,
                        format!("redefinition of symbol @{}", name.name),
                        name.span,
                    )
                    .with_suggestion(format!("previous definition at {previous}"));
                self.errors.push_error(diagnostic);
                continue;
            }
            seen.insert(&name.name, name.span);
            if let TopLevelOp::Class(class) = op {
                arities.insert(class.name.name.as_str(), class.params.len());
            }
        }
        arities
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Values
    // ══════════════════════════════════════════════════════════════════════════

    /// Module-level operations may only build constants and containers.
    /// Returns the names they define.
    fn check_module_ops(&mut self) -> HashSet<&'m str> {
        let mut defined = HashSet::new();
        let module = self.module;
        for op in module.module_ops() {
            if let OpKind::Object { .. } = op.kind {
                self.error(
                    ErrorCode::UNKNOWN_OPERATION,
                    "'om.object' is only allowed inside an 'om.class' body",
                    op.span,
                );
                continue;
            }
            let empty = HashSet::new();
            self.check_operands(op, &defined, &empty);
            self.define_result(op, &mut defined);
        }
        defined
    }

    fn check_class(
        &mut self,
        class: &'m ClassOp,
        arities: &HashMap<&'m str, usize>,
        module_scope: &HashSet<&'m str>,
    ) {
        let mut local: HashSet<&'m str> = HashSet::new();
        for param in &class.params {
            if !local.insert(&param.name.name) {
                self.error(
                    ErrorCode::DUPLICATE_VALUE,
                    format!(
                        "redefinition of value '%{}' in class @{}",
                        param.name.name, class.name.name
                    ),
                    param.span,
                );
            }
        }

        let mut fields: HashSet<&'m str> = HashSet::new();
        for op in &class.body {
            self.check_operands(op, &local, module_scope);

            match &op.kind {
                OpKind::ClassField { name, .. } => {
                    if !fields.insert(&name.name) {
                        self.error(
                            ErrorCode::DUPLICATE_FIELD,
                            format!(
                                "field @{} is declared more than once in class @{}",
                                name.name, class.name.name
                            ),
                            name.span,
                        );
                    }
                }
                OpKind::Object {
                    class: target,
                    actuals,
                    ..
                } => match arities.get(target.name.as_str()) {
                    None => self.error(
                        ErrorCode::UNKNOWN_CLASS,
                        format!("'om.object' refers to undefined class @{}", target.name),
                        target.span,
                    ),
                    Some(&expected) if expected != actuals.len() => self.error(
                        ErrorCode::OBJECT_ARITY_MISMATCH,
                        format!(
                            "'om.object' passes {} actual parameter(s) to @{}, which declares {}",
                            actuals.len(),
                            target.name,
                            expected
                        ),
                        target.span,
                    ),
                    Some(_) => {}
                },
                _ => {}
            }

            self.define_result(op, &mut local);
        }
    }

    /// Every operand must be defined earlier in `local` or in `module_scope`.
    fn check_operands(
        &mut self,
        op: &'m Operation,
        local: &HashSet<&'m str>,
        module_scope: &HashSet<&'m str>,
    ) {
        for operand in op.kind.operands() {
            let name = operand.name.as_str();
            if !local.contains(name) && !module_scope.contains(name) {
                let diagnostic = self
                    .diagnostic(
                        ErrorCode::UNDEFINED_VALUE,
                        format!("use of undefined value '%{name}'"),
                        operand.span,
                    )
                    .with_suggestion(format!("define '%{name}' before it is used"));
                self.errors.push_error(diagnostic);
            }
        }
    }

    fn define_result(&mut self, op: &'m Operation, scope: &mut HashSet<&'m str>) {
        if let Some(result) = &op.result {
            if !scope.insert(&result.name) {
                self.error(
                    ErrorCode::DUPLICATE_VALUE,
                    format!("redefinition of value '%{}'", result.name),
                    result.span,
                );
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Instantiation cycles
    // ══════════════════════════════════════════════════════════════════════════

    fn check_cycles(&mut self) {
        let mut graph: ClassGraph<'m> = IndexMap::new();
        let module = self.module;
        for class in module.classes() {
            let edges = class
                .body
                .iter()
                .filter_map(|op| match &op.kind {
                    OpKind::Object { class: target, .. } => {
                        Some((target.name.as_str(), target.span))
                    }
                    _ => None,
                })
                .collect();
            graph.entry(class.name.name.as_str()).or_insert(edges);
        }

        let mut state: HashMap<&'m str, Visit> = HashMap::new();
        let mut stack: Vec<&'m str> = Vec::new();
        for &name in graph.keys() {
            if !state.contains_key(name) {
                self.visit(name, &graph, &mut state, &mut stack);
            }
        }
    }

    fn visit(
        &mut self,
        name: &'m str,
        graph: &ClassGraph<'m>,
        state: &mut HashMap<&'m str, Visit>,
        stack: &mut Vec<&'m str>,
    ) {
        state.insert(name, Visit::Active);
        stack.push(name);

        for &(target, span) in graph.get(name).into_iter().flatten() {
            match state.get(target) {
                Some(Visit::Active) => {
                    let start = stack.iter().position(|&n| n == target).unwrap_or(0);
                    let mut path: Vec<String> =
                        stack[start..].iter().map(|n| format!("@{n}")).collect();
                    path.push(format!("@{target}"));
                    self.error(
                        ErrorCode::CYCLIC_CLASS,
                        format!(
                            "class @{target} instantiates itself: {}",
                            path.join(" -> ")
                        ),
                        span,
                    );
                }
                Some(Visit::Done) => {}
                None => {
                    if graph.contains_key(target) {
                        self.visit(target, graph, state, stack);
                    }
                }
            }
        }

        stack.pop();
        state.insert(name, Visit::Done);
    }
}
