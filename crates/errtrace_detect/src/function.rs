//! Per-function local `ReturnFact` detection.

use errtrace_ir::{Function, ReturnFact, Stmt, StmtId};

use crate::classify::{classify_expr, CalleeEdge, Origin};

/// D's output for one function: the local `ReturnFact` (identities,
/// `param:i`, `call:i` markers only — no callee-origin edges, those are
/// pulled out separately for P to resolve) plus the callee edges found at
/// its return sites.
#[derive(Clone, Debug, Default)]
pub struct DetectedFunction {
    pub return_fact: ReturnFact,
    pub callee_edges: Vec<CalleeEdge>,
}

/// Scan every return site reachable from `function`'s body and classify
/// the returned value (spec §4.1). D never fails: anything that doesn't
/// match a rule simply contributes nothing (rule 7, opaque).
#[must_use]
pub fn detect_function(function: &Function) -> DetectedFunction {
    let locals = function.local_defs();
    let mut elements = Vec::new();
    let mut callee_edges = Vec::new();

    walk(&function.body, function, &locals, &mut elements, &mut callee_edges);

    DetectedFunction {
        return_fact: ReturnFact::from_elems(elements),
        callee_edges,
    }
}

fn walk(
    ids: &[StmtId],
    function: &Function,
    locals: &rustc_hash::FxHashMap<errtrace_ir::LocalId, errtrace_ir::ExprId>,
    elements: &mut Vec<errtrace_ir::FactElem>,
    callee_edges: &mut Vec<CalleeEdge>,
) {
    for &id in ids {
        match function.stmts.get(id) {
            Stmt::Return(values) => {
                for &value in values {
                    match classify_expr(value, &function.exprs, locals) {
                        Some(Origin::Element(elem)) => elements.push(elem),
                        Some(Origin::Callee(edge)) => callee_edges.push(edge),
                        None => {}
                    }
                }
            }
            Stmt::Assign { .. } | Stmt::ExprStmt(_) => {}
            Stmt::If { then_branch, else_branch, .. } => {
                walk(then_branch, function, locals, elements, callee_edges);
                walk(else_branch, function, locals, elements, callee_edges);
            }
            Stmt::Switch { cases, .. } => {
                for case in cases {
                    walk(&case.body, function, locals, elements, callee_edges);
                }
            }
            Stmt::Defer(body) | Stmt::Block(body) => {
                walk(body, function, locals, elements, callee_edges);
            }
        }
    }
}
