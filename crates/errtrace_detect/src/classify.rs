//! Classification of a single returned expression into a `ReturnFact`
//! element, a callee-origin edge for the propagator to resolve, or nothing
//! (rule 7: opaque).

use rustc_hash::FxHashMap;

use errtrace_ir::{Expr, ExprArena, ExprId, FactElem, LocalId, Symbol};

/// What a callee edge's target resolves against.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CalleeTarget {
    /// A directly named function or concrete-type method.
    Direct(Symbol),
    /// An interface method, which the propagator must expand to the union
    /// over every known implementation.
    Interface { interface_name: Symbol, method_name: Symbol },
}

/// A callee whose result flows into a return, to be resolved by the
/// propagator once the callee's own `ReturnFact` is known (spec §4.1 rule
/// 3 / §4.2).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct CalleeEdge {
    pub target: CalleeTarget,
    pub args: Vec<ExprId>,
    pub result_index: u32,
}

/// What a returned expression classifies to.
#[derive(Clone, Debug)]
pub enum Origin {
    Element(FactElem),
    Callee(CalleeEdge),
}

/// Classify one expression per spec §4.1's seven rules. `locals` resolves
/// `LocalRef` to the expression it was bound from (rule-agnostic: a local
/// binding just forwards classification to its defining value). Returns
/// `None` for the nil literal and for anything that doesn't match any
/// rule — both are rule 7's "opaque", and per the open-question
/// resolution in DESIGN.md, neither ever yields a diagnostic.
pub fn classify_expr(
    id: ExprId,
    exprs: &ExprArena,
    locals: &FxHashMap<LocalId, ExprId>,
) -> Option<Origin> {
    match exprs.get(id) {
        Expr::SentinelRef(sym) => Some(Origin::Element(FactElem::Identity(
            errtrace_ir::ErrorIdentity::Sentinel(*sym),
        ))),
        Expr::TypeConstruct { type_name, .. } => Some(Origin::Element(FactElem::Identity(
            errtrace_ir::ErrorIdentity::TypeError(*type_name),
        ))),
        Expr::Call { callee, args, result_index, .. } => Some(Origin::Callee(CalleeEdge {
            target: CalleeTarget::Direct(*callee),
            args: args.clone(),
            result_index: *result_index,
        })),
        Expr::InterfaceCall { interface_name, method_name, args, result_index, .. } => {
            Some(Origin::Callee(CalleeEdge {
                target: CalleeTarget::Interface {
                    interface_name: *interface_name,
                    method_name: *method_name,
                },
                args: args.clone(),
                result_index: *result_index,
            }))
        }
        Expr::ParamRef(i) => Some(Origin::Element(FactElem::Param(*i))),
        Expr::ParamInvoke { param, .. } => Some(Origin::Element(FactElem::Call(*param))),
        Expr::WrapCall { inner } => classify_expr(*inner, exprs, locals),
        Expr::LocalRef(local) => locals
            .get(local)
            .and_then(|def| classify_expr(*def, exprs, locals)),
        // A named function used as a value rather than invoked directly (e.g.
        // returned as-is, or passed to a higher-order parameter): the callee
        // it ultimately resolves to is itself, invoked with no arguments.
        Expr::FuncRef(sym) => Some(Origin::Callee(CalleeEdge {
            target: CalleeTarget::Direct(*sym),
            args: Vec::new(),
            result_index: 0,
        })),
        Expr::Nil | Expr::Is { .. } | Expr::As { .. } | Expr::Eq { .. } => None,
    }
}
