//! Per-package `ReturnFact` fixed point (spec §4.2, §5).
//!
//! A package's functions are resolved together because they may call each
//! other: function A's `ReturnFact` can depend on function B's, and B may
//! not yet be fully resolved when A is first visited. Imported packages are
//! different — they are scheduled strictly before this one (reverse
//! topological import order), so their facts are already final in the
//! `FactReader` and are read, never iterated on.

use rustc_hash::FxHashMap;

use errtrace_detect::{CalleeEdge, CalleeTarget, DetectedPackage};
use errtrace_facts::FactReader;
use errtrace_ir::{Expr, ExprArena, ExprId, FactElem, LocalId, Package, ReturnFact, Symbol};

use crate::registry::ImplRegistry;

/// Call-argument nesting is finite per function body; this bounds the
/// instantiation recursion against a malformed/cyclic input contract rather
/// than any expected real depth.
const MAX_INSTANTIATION_DEPTH: u32 = 16;

fn resolve_return_fact(
    target: Symbol,
    local_map: &FxHashMap<Symbol, ReturnFact>,
    facts: &dyn FactReader,
) -> Option<ReturnFact> {
    local_map.get(&target).cloned().or_else(|| facts.return_fact(target))
}

/// Resolve and instantiate a callee edge against an arbitrary call site,
/// given no in-progress package (`local_map` empty is the common case: the
/// checker calls this once P has fully converged and every symbol it needs
/// is already published). Exposed so the checker can reuse the exact same
/// `param:j`/`call:j` instantiation P uses, rather than reading a raw,
/// possibly still-marker-bearing `ReturnFact` at face value.
#[must_use]
pub fn instantiate_callee_fact(
    callee_fact: &ReturnFact,
    args: &[ExprId],
    caller_exprs: &ExprArena,
    caller_locals: &FxHashMap<LocalId, ExprId>,
    local_map: &FxHashMap<Symbol, ReturnFact>,
    facts: &dyn FactReader,
    registry: &ImplRegistry,
) -> Vec<FactElem> {
    instantiate(callee_fact, args, caller_exprs, caller_locals, local_map, facts, registry, 0)
}

/// Instantiate one resolved callee's `ReturnFact` against the arguments at
/// its call site, producing the contribution it makes to the caller's own
/// `ReturnFact` (spec §4.2: concrete identities propagate unchanged,
/// `param:j`/`call:j` markers are re-expressed in terms of the caller's own
/// parameters by reclassifying the argument expression that was bound to
/// the callee's parameter `j`).
fn instantiate(
    callee_fact: &ReturnFact,
    args: &[ExprId],
    caller_exprs: &ExprArena,
    caller_locals: &FxHashMap<LocalId, ExprId>,
    local_map: &FxHashMap<Symbol, ReturnFact>,
    facts: &dyn FactReader,
    registry: &ImplRegistry,
    depth: u32,
) -> Vec<FactElem> {
    if depth > MAX_INSTANTIATION_DEPTH {
        return Vec::new();
    }
    let mut out = Vec::new();
    for elem in callee_fact.elements() {
        match *elem {
            FactElem::Identity(id) => out.push(FactElem::Identity(id)),
            FactElem::Param(j) => {
                let Some(&arg) = args.get(j as usize) else { continue };
                match errtrace_detect::classify_expr(arg, caller_exprs, caller_locals) {
                    Some(ArgOrigin::Element(elem)) => out.push(elem),
                    Some(ArgOrigin::Callee(edge)) => out.extend(resolve_edge_contributions(
                        &edge,
                        caller_exprs,
                        caller_locals,
                        local_map,
                        facts,
                        registry,
                        depth + 1,
                    )),
                    None => {}
                }
            }
            FactElem::Call(j) => {
                let Some(&arg) = args.get(j as usize) else { continue };
                match caller_exprs.get(arg) {
                    Expr::FuncRef(name) => {
                        if let Some(callback_fact) = resolve_return_fact(*name, local_map, facts) {
                            for sub in callback_fact.elements() {
                                if let FactElem::Identity(id) = sub {
                                    out.push(FactElem::Identity(*id));
                                }
                            }
                        }
                    }
                    Expr::ParamRef(k) => out.push(FactElem::Call(*k)),
                    _ => {}
                }
            }
        }
    }
    out
}

/// Resolve and instantiate one callee edge, expanding an `Interface` target
/// into the union over every known implementation (spec §4.2 method
/// resolution — a different merge than `ParamCheckFact`'s intersection,
/// since a caller through an interface can observe whichever identity the
/// dynamically dispatched implementation actually returns).
/// Resolve a callee edge (direct or interface-dispatched) against the
/// arguments at its call site, producing the caller-relative contribution
/// (spec §4.2). Public so the checker can resolve an arbitrary call site's
/// obligations the same way P does, after P has converged.
#[must_use]
pub fn resolve_edge_contributions(
    edge: &CalleeEdge,
    caller_exprs: &ExprArena,
    caller_locals: &FxHashMap<LocalId, ExprId>,
    local_map: &FxHashMap<Symbol, ReturnFact>,
    facts: &dyn FactReader,
    registry: &ImplRegistry,
    depth: u32,
) -> Vec<FactElem> {
    if depth > MAX_INSTANTIATION_DEPTH {
        return Vec::new();
    }
    match &edge.target {
        CalleeTarget::Direct(callee) => resolve_return_fact(*callee, local_map, facts)
            .map(|fact| {
                instantiate(&fact, &edge.args, caller_exprs, caller_locals, local_map, facts, registry, depth)
            })
            .unwrap_or_default(),
        CalleeTarget::Interface { interface_name, method_name } => {
            let mut out = Vec::new();
            for impl_symbol in registry.implementations(*interface_name, *method_name) {
                if let Some(fact) = resolve_return_fact(*impl_symbol, local_map, facts) {
                    out.extend(instantiate(
                        &fact,
                        &edge.args,
                        caller_exprs,
                        caller_locals,
                        local_map,
                        facts,
                        registry,
                        depth,
                    ));
                }
            }
            out
        }
    }
}

/// Run P's per-package worklist to a fixed point and return each function's
/// final whole-program `ReturnFact`, keyed by fully qualified name. The
/// caller publishes the entries it wants visible to later packages.
#[must_use]
pub fn propagate_package(
    package: &Package,
    detected: &DetectedPackage,
    registry: &ImplRegistry,
    facts: &dyn FactReader,
) -> FxHashMap<Symbol, ReturnFact> {
    let mut local_map: FxHashMap<Symbol, ReturnFact> = package
        .functions
        .iter()
        .map(|f| {
            let base = detected.get(&f.name).map(|d| d.return_fact.clone()).unwrap_or_default();
            (f.name, base)
        })
        .collect();

    let locals_by_function: FxHashMap<Symbol, FxHashMap<LocalId, ExprId>> =
        package.functions.iter().map(|f| (f.name, f.local_defs())).collect();

    loop {
        let mut changed = false;
        for function in &package.functions {
            let Some(detected_fn) = detected.get(&function.name) else { continue };
            if detected_fn.callee_edges.is_empty() {
                continue;
            }
            let locals = &locals_by_function[&function.name];
            let mut contributions = Vec::new();
            for edge in &detected_fn.callee_edges {
                contributions.extend(resolve_edge_contributions(
                    edge,
                    &function.exprs,
                    locals,
                    &local_map,
                    facts,
                    registry,
                    0,
                ));
            }
            let addition = ReturnFact::from_elems(contributions);
            let entry = local_map.entry(function.name).or_default();
            if entry.union_with(&addition) {
                changed = true;
            }
        }
        if !changed {
            break;
        }
        tracing::trace!(package = %package.path, "propagation worklist pass did not yet converge");
    }

    local_map
}

/// What a call-site argument expression resolves to, reusing D's
/// classification rules — an argument is itself just an expression, so the
/// same seven rules apply when asking "what does the value passed here
/// originate from?"
pub use errtrace_detect::Origin as ArgOrigin;

#[cfg(test)]
mod tests {
    use super::*;
    use errtrace_detect::{detect_function, DetectedFunction};
    use errtrace_ir::{ErrorIdentity, Function, Span, Stmt, StmtArena};
    use pretty_assertions::assert_eq;

    fn package_with(functions: Vec<Function>) -> (Package, DetectedPackage) {
        let detected: DetectedPackage =
            functions.iter().map(|f| (f.name, detect_function(f))).collect();
        let package = Package {
            path: Symbol::intern("pkg"),
            imports: Vec::new(),
            error_types: Vec::new(),
            functions,
        };
        (package, detected)
    }

    struct EmptyFacts;
    impl FactReader for EmptyFacts {
        fn error_type(&self, _name: Symbol) -> Option<errtrace_facts::ErrorTypeFact> {
            None
        }
        fn return_fact(&self, _symbol: Symbol) -> Option<ReturnFact> {
            None
        }
        fn param_check_facts(&self, _symbol: Symbol) -> Vec<errtrace_ir::ParamCheckFact> {
            Vec::new()
        }
    }

    #[test]
    fn wrapper_inherits_leaf_identity() {
        let mut leaf_exprs = ExprArena::new();
        let sentinel = leaf_exprs.alloc(Expr::SentinelRef(Symbol::intern("pkg.ErrLeaf")));
        let mut leaf_stmts = StmtArena::new();
        let leaf_ret = leaf_stmts.alloc(Stmt::Return(vec![sentinel]));
        let leaf = Function {
            name: Symbol::intern("pkg.Leaf"),
            file: Symbol::intern("pkg/f.go"),
            params: Vec::new(),
            receiver: None,
            implements: None,
            body: vec![leaf_ret],
            stmts: leaf_stmts,
            exprs: leaf_exprs,
        };

        let mut wrapper_exprs = ExprArena::new();
        let call = wrapper_exprs.alloc(Expr::Call {
            callee: Symbol::intern("pkg.Leaf"),
            args: Vec::new(),
            result_index: 0,
            span: Span::DUMMY,
        });
        let mut wrapper_stmts = StmtArena::new();
        let wrapper_ret = wrapper_stmts.alloc(Stmt::Return(vec![call]));
        let wrapper = Function {
            name: Symbol::intern("pkg.Wrapper"),
            file: Symbol::intern("pkg/f.go"),
            params: Vec::new(),
            receiver: None,
            implements: None,
            body: vec![wrapper_ret],
            stmts: wrapper_stmts,
            exprs: wrapper_exprs,
        };

        let (package, detected) = package_with(vec![leaf, wrapper]);
        let registry = ImplRegistry::default();
        let facts = EmptyFacts;
        let resolved = propagate_package(&package, &detected, &registry, &facts);

        let wrapper_fact = &resolved[&Symbol::intern("pkg.Wrapper")];
        assert_eq!(
            wrapper_fact.reachable_identities(true),
            vec![ErrorIdentity::Sentinel(Symbol::intern("pkg.ErrLeaf"))]
        );
    }

    #[test]
    fn param_marker_instantiates_against_call_site_argument() {
        // f(p) returns p's error; g calls f(paramRef 0), so g's
        // ReturnFact should gain param:0 relative to g itself.
        let mut f_exprs = ExprArena::new();
        let param_ref = f_exprs.alloc(Expr::ParamRef(0));
        let mut f_stmts = StmtArena::new();
        let f_ret = f_stmts.alloc(Stmt::Return(vec![param_ref]));
        let f = Function {
            name: Symbol::intern("pkg.F"),
            file: Symbol::intern("pkg/f.go"),
            params: Vec::new(),
            receiver: None,
            implements: None,
            body: vec![f_ret],
            stmts: f_stmts,
            exprs: f_exprs,
        };

        let mut g_exprs = ExprArena::new();
        let g_param_ref = g_exprs.alloc(Expr::ParamRef(0));
        let call = g_exprs.alloc(Expr::Call {
            callee: Symbol::intern("pkg.F"),
            args: vec![g_param_ref],
            result_index: 0,
            span: Span::DUMMY,
        });
        let mut g_stmts = StmtArena::new();
        let g_ret = g_stmts.alloc(Stmt::Return(vec![call]));
        let g = Function {
            name: Symbol::intern("pkg.G"),
            file: Symbol::intern("pkg/f.go"),
            params: Vec::new(),
            receiver: None,
            implements: None,
            body: vec![g_ret],
            stmts: g_stmts,
            exprs: g_exprs,
        };

        let (package, detected) = package_with(vec![f, g]);
        let registry = ImplRegistry::default();
        let facts = EmptyFacts;
        let resolved = propagate_package(&package, &detected, &registry, &facts);

        let g_fact = &resolved[&Symbol::intern("pkg.G")];
        assert!(g_fact.param_markers().any(|i| i == 0));
    }
}
