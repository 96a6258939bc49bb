//! Per-call-site exhaustiveness checking (component C, spec §4.3).
//!
//! For every call site found by [`collect_call_sites`], resolve the
//! callee's whole-program `ReturnFact` (published by P) and instantiate it
//! against this call's own arguments — the same `param:j`/`call:j`
//! expansion P performs, reused via
//! [`errtrace_propagate::resolve_edge_contributions`] so a callee's
//! pass-through markers are resolved the same way at every call site,
//! whether P is instantiating them for its own fixed point or C is
//! instantiating them for a diagnostic.

use rustc_hash::FxHashMap;

use errtrace_detect::CalleeTarget;
use errtrace_diagnostic::{DiagnosticKind, DiagnosticRecord, Position};
use errtrace_facts::FactReader;
use errtrace_ir::{checks_before_escape, ErrorIdentity, Function, ReturnFact, Symbol, TrackedRoot};
use errtrace_propagate::{resolve_edge_contributions, ImplRegistry};

use crate::sites::{collect_call_sites, SiteOutcome};

fn target_package(target: &CalleeTarget) -> Symbol {
    match target {
        CalleeTarget::Direct(symbol) => Symbol::intern(&*symbol.package_path()),
        CalleeTarget::Interface { interface_name, .. } => Symbol::intern(&*interface_name.package_path()),
    }
}

fn resolve_obligation(
    target: &CalleeTarget,
    args: &[errtrace_ir::ExprId],
    function: &Function,
    locals: &FxHashMap<errtrace_ir::LocalId, errtrace_ir::ExprId>,
    facts: &dyn FactReader,
    registry: &ImplRegistry,
    caller_package: Symbol,
) -> Vec<ErrorIdentity> {
    let empty_local_map = FxHashMap::default();
    let edge = errtrace_detect::CalleeEdge { target: target.clone(), args: args.to_vec(), result_index: 0 };
    let contributions =
        resolve_edge_contributions(&edge, &function.exprs, locals, &empty_local_map, facts, registry, 0);
    let resolved = ReturnFact::from_elems(contributions);
    resolved.reachable_identities(caller_package == target_package(target))
}

/// Check every call site in `function`, emitting one diagnostic per
/// (call site, unchecked identity) pair.
#[must_use]
pub fn check_function(
    function: &Function,
    caller_package: Symbol,
    facts: &dyn FactReader,
    registry: &ImplRegistry,
) -> Vec<DiagnosticRecord> {
    let locals = function.local_defs();
    let mut diagnostics = Vec::new();

    for site in collect_call_sites(function) {
        let obligation =
            resolve_obligation(&site.target, &site.args, function, &locals, facts, registry, caller_package);
        if obligation.is_empty() {
            continue;
        }

        let position = Position::new(function.file, site.span);
        match site.outcome {
            SiteOutcome::Discarded => {
                for identity in obligation {
                    diagnostics.push(DiagnosticRecord::new(position, identity, DiagnosticKind::DiscardedReturn));
                }
            }
            SiteOutcome::Blank => {
                for identity in obligation {
                    diagnostics.push(DiagnosticRecord::new(position, identity, DiagnosticKind::BlankAssign));
                }
            }
            SiteOutcome::Local(local) => {
                let (propagated, checks) =
                    checks_before_escape(&function.body, function, TrackedRoot::Local(local));
                if propagated {
                    continue;
                }
                for identity in obligation {
                    if !checks.contains(identity) {
                        diagnostics.push(DiagnosticRecord::new(position, identity, DiagnosticKind::UncheckedReturn));
                    }
                }
            }
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use errtrace_facts::InMemoryFactStore;
    use errtrace_ir::{Expr, ExprArena, FactElem, Span, Stmt, StmtArena};
    use pretty_assertions::assert_eq;

    #[test]
    fn unchecked_local_reports_missing_identity() {
        let store = InMemoryFactStore::new();
        use errtrace_facts::FactStore;
        store.publish_return_fact(
            Symbol::intern("pkg.Leaf"),
            ReturnFact::from_elems([FactElem::Identity(ErrorIdentity::Sentinel(Symbol::intern(
                "pkg.ErrLeaf",
            )))]),
        );

        let mut exprs = ExprArena::new();
        let call = exprs.alloc(Expr::Call {
            callee: Symbol::intern("pkg.Leaf"),
            args: Vec::new(),
            result_index: 0,
            span: Span::new(4, 10),
        });
        let mut stmts = StmtArena::new();
        let local = errtrace_ir::LocalId::new(0);
        let assign = stmts.alloc(Stmt::Assign { targets: vec![Some(local)], value: call });
        let local_ref = exprs.alloc(Expr::LocalRef(local));
        let ret = stmts.alloc(Stmt::Return(vec![local_ref]));
        let caller = Function {
            name: Symbol::intern("pkg.Caller"),
            file: Symbol::intern("pkg/f.go"),
            params: Vec::new(),
            receiver: None,
            implements: None,
            body: vec![assign, ret],
            stmts,
            exprs,
        };

        let registry = ImplRegistry::default();
        let diagnostics = check_function(&caller, Symbol::intern("pkg"), &store, &registry);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UncheckedReturn);
        assert_eq!(diagnostics[0].identity.name(), Symbol::intern("pkg.ErrLeaf"));
    }

    #[test]
    fn discarded_call_reports_every_identity() {
        let store = InMemoryFactStore::new();
        use errtrace_facts::FactStore;
        store.publish_return_fact(
            Symbol::intern("pkg.Leaf"),
            ReturnFact::from_elems([FactElem::Identity(ErrorIdentity::Sentinel(Symbol::intern(
                "pkg.ErrLeaf",
            )))]),
        );

        let mut exprs = ExprArena::new();
        let call = exprs.alloc(Expr::Call {
            callee: Symbol::intern("pkg.Leaf"),
            args: Vec::new(),
            result_index: 0,
            span: Span::new(4, 10),
        });
        let mut stmts = StmtArena::new();
        let discard = stmts.alloc(Stmt::ExprStmt(call));
        let caller = Function {
            name: Symbol::intern("pkg.Caller"),
            file: Symbol::intern("pkg/f.go"),
            params: Vec::new(),
            receiver: None,
            implements: None,
            body: vec![discard],
            stmts,
            exprs,
        };

        let registry = ImplRegistry::default();
        let diagnostics = check_function(&caller, Symbol::intern("pkg"), &store, &registry);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::DiscardedReturn);
    }

    #[test]
    fn checked_local_discharges_obligation() {
        let store = InMemoryFactStore::new();
        use errtrace_facts::FactStore;
        let alpha = Symbol::intern("pkg.ErrAlpha");
        store.publish_return_fact(
            Symbol::intern("pkg.Leaf"),
            ReturnFact::from_elems([FactElem::Identity(ErrorIdentity::Sentinel(alpha))]),
        );

        let mut exprs = ExprArena::new();
        let call = exprs.alloc(Expr::Call {
            callee: Symbol::intern("pkg.Leaf"),
            args: Vec::new(),
            result_index: 0,
            span: Span::new(4, 10),
        });
        let local = errtrace_ir::LocalId::new(0);
        let mut stmts = StmtArena::new();
        let assign = stmts.alloc(Stmt::Assign { targets: vec![Some(local)], value: call });
        let local_ref = exprs.alloc(Expr::LocalRef(local));
        let is_alpha =
            exprs.alloc(Expr::Is { subject: local_ref, identity: ErrorIdentity::Sentinel(alpha) });
        let check = stmts.alloc(Stmt::If { cond: is_alpha, then_branch: vec![], else_branch: vec![] });
        let caller = Function {
            name: Symbol::intern("pkg.Caller"),
            file: Symbol::intern("pkg/f.go"),
            params: Vec::new(),
            receiver: None,
            implements: None,
            body: vec![assign, check],
            stmts,
            exprs,
        };

        let registry = ImplRegistry::default();
        let diagnostics = check_function(&caller, Symbol::intern("pkg"), &store, &registry);
        assert!(diagnostics.is_empty());
    }
}
