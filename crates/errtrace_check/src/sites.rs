//! Find every call site within a function whose result needs checking:
//! assigned to a local, assigned to the blank identifier, or discarded
//! entirely as a bare expression statement. A call whose result is
//! `return`ed directly is excluded — it propagates raw, which P already
//! accounts for in the caller's own `ReturnFact`, and is discharged (or
//! not) by whichever function eventually stops propagating it.

use errtrace_detect::CalleeTarget;
use errtrace_ir::{Expr, ExprId, Function, LocalId, Span, Stmt, StmtId};

/// Where a call site's error result ends up.
#[derive(Clone, Debug)]
pub enum SiteOutcome {
    Local(LocalId),
    Blank,
    Discarded,
}

/// One call whose error result needs an exhaustiveness check.
#[derive(Clone, Debug)]
pub struct CallSite {
    pub target: CalleeTarget,
    pub args: Vec<ExprId>,
    pub span: Span,
    pub outcome: SiteOutcome,
}

struct CallInfo {
    target: CalleeTarget,
    args: Vec<ExprId>,
    result_index: u32,
    span: Span,
}

fn classify_call(id: ExprId, function: &Function) -> Option<CallInfo> {
    match function.exprs.get(id) {
        Expr::Call { callee, args, result_index, span } => Some(CallInfo {
            target: CalleeTarget::Direct(*callee),
            args: args.clone(),
            result_index: *result_index,
            span: *span,
        }),
        Expr::InterfaceCall { interface_name, method_name, args, result_index, span } => Some(CallInfo {
            target: CalleeTarget::Interface {
                interface_name: *interface_name,
                method_name: *method_name,
            },
            args: args.clone(),
            result_index: *result_index,
            span: *span,
        }),
        _ => None,
    }
}

#[must_use]
pub fn collect_call_sites(function: &Function) -> Vec<CallSite> {
    let mut sites = Vec::new();
    walk(&function.body, function, &mut sites);
    sites
}

fn walk(ids: &[StmtId], function: &Function, sites: &mut Vec<CallSite>) {
    for &id in ids {
        match function.stmts.get(id) {
            Stmt::Assign { targets, value } => {
                if let Some(call) = classify_call(*value, function) {
                    let outcome = match targets.get(call.result_index as usize) {
                        Some(Some(local)) => SiteOutcome::Local(*local),
                        Some(None) | None => SiteOutcome::Blank,
                    };
                    sites.push(CallSite { target: call.target, args: call.args, span: call.span, outcome });
                }
            }
            Stmt::ExprStmt(expr) => {
                if let Some(call) = classify_call(*expr, function) {
                    sites.push(CallSite {
                        target: call.target,
                        args: call.args,
                        span: call.span,
                        outcome: SiteOutcome::Discarded,
                    });
                }
            }
            Stmt::Return(_) => {}
            Stmt::If { then_branch, else_branch, .. } => {
                walk(then_branch, function, sites);
                walk(else_branch, function, sites);
            }
            Stmt::Switch { cases, .. } => {
                for case in cases {
                    walk(&case.body, function, sites);
                }
            }
            Stmt::Defer(body) | Stmt::Block(body) => walk(body, function, sites),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errtrace_ir::{ExprArena, Span as IrSpan, StmtArena, Symbol};
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_assigned_and_discarded_sites() {
        let mut exprs = ExprArena::new();
        let call_a = exprs.alloc(Expr::Call {
            callee: Symbol::intern("pkg.A"),
            args: Vec::new(),
            result_index: 0,
            span: IrSpan::DUMMY,
        });
        let call_b = exprs.alloc(Expr::Call {
            callee: Symbol::intern("pkg.B"),
            args: Vec::new(),
            result_index: 0,
            span: IrSpan::DUMMY,
        });
        let mut stmts = StmtArena::new();
        let local = LocalId::new(0);
        let assign = stmts.alloc(Stmt::Assign { targets: vec![Some(local)], value: call_a });
        let discard = stmts.alloc(Stmt::ExprStmt(call_b));
        let function = Function {
            name: Symbol::intern("pkg.F"),
            file: Symbol::intern("pkg/f.go"),
            params: Vec::new(),
            receiver: None,
            implements: None,
            body: vec![assign, discard],
            stmts,
            exprs,
        };

        let sites = collect_call_sites(&function);
        assert_eq!(sites.len(), 2);
        assert!(matches!(sites[0].outcome, SiteOutcome::Local(_)));
        assert!(matches!(sites[1].outcome, SiteOutcome::Discarded));
    }
}
