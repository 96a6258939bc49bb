//! Shared intraprocedural dataflow: given a function body and a tracked
//! value (a parameter index, for `ParamCheckFact`, or a local, for the
//! checker's per-call-site obligation), compute which identities are
//! checked against it before it escapes, and whether it is ever
//! propagated unchecked to a `return`.
//!
//! Both the propagator's `ParamCheckFact` pass and the checker's
//! discharge pass are instances of the same walk, differing only in what
//! counts as "the tracked value" — so the walk lives here once rather
//! than twice.

use crate::expr::{Expr, ExprArena, ExprId, LocalId};
use crate::identity::{CheckSet, ErrorIdentity};
use crate::program::Function;
use crate::stmt::{Stmt, StmtId};

/// What a [`checks_before_escape`] run is tracking.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TrackedRoot {
    /// A function parameter, referenced via `Expr::ParamRef`.
    Param(u32),
    /// A local variable, referenced via `Expr::LocalRef`.
    Local(LocalId),
}

/// The fate of one control-flow path through a statement list.
#[derive(Clone, Debug)]
enum PathOutcome {
    /// This path returns the tracked value directly: the caller's
    /// obligation is fully discharged by propagation.
    Propagated,
    /// This path returns some other value (or the function otherwise
    /// exits); it neither propagates nor falls through to later
    /// statements, so it contributes no information either way.
    Terminated,
    /// This path reaches the end of the statement list without
    /// returning, having accumulated `CheckSet` along the way.
    FallsThrough(CheckSet),
}

fn resolves_to(id: ExprId, exprs: &ExprArena, root: TrackedRoot) -> bool {
    match (exprs.get(id), root) {
        (Expr::ParamRef(i), TrackedRoot::Param(root_param)) => *i == root_param,
        (Expr::LocalRef(local), TrackedRoot::Local(root_local)) => *local == root_local,
        _ => false,
    }
}

fn identity_of(id: ExprId, exprs: &ExprArena) -> Option<ErrorIdentity> {
    match exprs.get(id) {
        Expr::SentinelRef(sym) => Some(ErrorIdentity::Sentinel(*sym)),
        Expr::TypeConstruct { type_name, .. } => Some(ErrorIdentity::TypeError(*type_name)),
        _ => None,
    }
}

fn collect_checks_from_expr(id: ExprId, exprs: &ExprArena, root: TrackedRoot, checks: &mut CheckSet) {
    match exprs.get(id) {
        Expr::Is { subject, identity } | Expr::As { subject, identity } => {
            if resolves_to(*subject, exprs, root) {
                checks.insert(*identity);
            }
        }
        Expr::Eq { left, right } => {
            if resolves_to(*left, exprs, root) {
                if let Some(identity) = identity_of(*right, exprs) {
                    checks.insert(identity);
                }
            } else if resolves_to(*right, exprs, root) {
                if let Some(identity) = identity_of(*left, exprs) {
                    checks.insert(identity);
                }
            }
        }
        _ => {}
    }
}

/// Walk one statement list and classify its single net outcome. A branch
/// construct (`if`/`switch`) may contain paths with different outcomes;
/// those are merged here so the parent scope sees one answer for "control
/// resumes after this statement" (`FallsThrough`) versus "it doesn't."
///
/// `initial` is everything already known checked on entry to this statement
/// list — seeded into every nested branch's own walk, not folded in only
/// after the fact, so a check made before an `if`/`switch` is visible to
/// both that construct's branches (and to anything nested further inside
/// them) before their outcomes are merged, rather than asymmetrically
/// applied to one side and not the other.
fn walk(stmts: &[StmtId], function: &Function, root: TrackedRoot, initial: CheckSet) -> PathOutcome {
    let mut checks = initial;

    for (i, &id) in stmts.iter().enumerate() {
        match function.stmts.get(id) {
            Stmt::Return(values) => {
                return if values.iter().any(|&v| resolves_to(v, &function.exprs, root)) {
                    PathOutcome::Propagated
                } else {
                    PathOutcome::Terminated
                };
            }
            Stmt::ExprStmt(expr) => {
                collect_checks_from_expr(*expr, &function.exprs, root, &mut checks);
            }
            Stmt::Assign { value, .. } => {
                collect_checks_from_expr(*value, &function.exprs, root, &mut checks);
            }
            Stmt::If { cond, then_branch, else_branch } => {
                collect_checks_from_expr(*cond, &function.exprs, root, &mut checks);
                let rest = &stmts[i + 1..];
                return join_then_continue(
                    walk(then_branch, function, root, checks.clone()),
                    &checks,
                    rest,
                    function,
                    root,
                )
                .merge_with(join_then_continue(
                    walk(else_branch, function, root, checks.clone()),
                    &checks,
                    rest,
                    function,
                    root,
                ));
            }
            Stmt::Switch { subject, cases } => {
                collect_checks_from_expr(*subject, &function.exprs, root, &mut checks);
                if cases.is_empty() {
                    continue;
                }
                let rest = &stmts[i + 1..];
                let mut outcome: Option<PathOutcome> = None;
                for case in cases {
                    let mut case_checks = checks.clone();
                    if let Some(check_expr) = case.check {
                        collect_checks_from_expr(check_expr, &function.exprs, root, &mut case_checks);
                    }
                    let case_outcome = join_then_continue(
                        walk(&case.body, function, root, case_checks.clone()),
                        &case_checks,
                        rest,
                        function,
                        root,
                    );
                    outcome = Some(match outcome {
                        Some(acc) => acc.merge_with(case_outcome),
                        None => case_outcome,
                    });
                }
                return outcome.unwrap_or(PathOutcome::Terminated);
            }
            Stmt::Defer(body) => {
                if let PathOutcome::FallsThrough(defer_checks) = walk(body, function, root, checks.clone()) {
                    checks = defer_checks;
                }
            }
            Stmt::Block(body) => {
                let rest = &stmts[i + 1..];
                return join_then_continue(
                    walk(body, function, root, checks.clone()),
                    &checks,
                    rest,
                    function,
                    root,
                );
            }
        }
    }

    PathOutcome::FallsThrough(checks)
}

/// Continue a branch's outcome into the statements following the branch
/// construct, seeding that continuation with everything known checked by
/// the time the branch falls through (before the branch, union whatever
/// the branch itself added), so a check made on this path is still visible
/// arbitrarily far down the rest of the function.
fn join_then_continue(
    branch_outcome: PathOutcome,
    checks_before_branch: &CheckSet,
    rest: &[StmtId],
    function: &Function,
    root: TrackedRoot,
) -> PathOutcome {
    match branch_outcome {
        PathOutcome::Propagated => PathOutcome::Propagated,
        PathOutcome::Terminated => PathOutcome::Terminated,
        PathOutcome::FallsThrough(branch_checks) => {
            walk(rest, function, root, checks_before_branch.union(&branch_checks))
        }
    }
}

impl PathOutcome {
    /// Merge two alternative outcomes (e.g. the `then` and `else` sides of
    /// an `if`): propagation on either side is existential (spec §4.3 —
    /// "if the error value ... is propagated ... on any path, O is fully
    /// discharged"); otherwise the two `FallsThrough` check sets are
    /// unioned, not intersected.
    ///
    /// This analyzer has no type-narrowing: taking the `else` of `Is(x,
    /// Alpha)` doesn't teach it that `x` can't be `Alpha` there, so it
    /// can't give that branch implicit credit for "ruling Alpha out"
    /// either. Without that narrowing, intersecting would punish the
    /// target language's idiomatic exhaustive dispatch — `if Is(err,
    /// Alpha) {} else { if Is(err, Beta) {} else {} }` — since the `then`
    /// side never itself evaluates the nested `Beta` check, and
    /// intersecting `{Alpha}` with `{Alpha, Beta}` would drop `Beta`
    /// every time, however deep the chain. Union is what makes every
    /// identity tested anywhere along such a chain count as checked,
    /// which is what spec §8's sentinel-exhaustiveness scenarios and
    /// `branch_checks_accumulate_down_else_chain` below require.
    fn merge_with(self, other: PathOutcome) -> PathOutcome {
        match (self, other) {
            (PathOutcome::Propagated, _) | (_, PathOutcome::Propagated) => PathOutcome::Propagated,
            (PathOutcome::Terminated, other) | (other, PathOutcome::Terminated) => other,
            (PathOutcome::FallsThrough(a), PathOutcome::FallsThrough(b)) => {
                PathOutcome::FallsThrough(a.union(&b))
            }
        }
    }
}

/// Run the walk over `stmts` and reduce it to `(propagated, checks)`:
/// `propagated` is true if some reachable path returns the tracked value
/// directly; `checks` is every identity checked along some surviving
/// (non-propagating, non-terminated) path through `stmts`.
#[must_use]
pub fn checks_before_escape(stmts: &[StmtId], function: &Function, root: TrackedRoot) -> (bool, CheckSet) {
    match walk(stmts, function, root, CheckSet::empty()) {
        PathOutcome::Propagated => (true, CheckSet::empty()),
        PathOutcome::Terminated => (false, CheckSet::empty()),
        PathOutcome::FallsThrough(checks) => (false, checks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ExprArena;
    use crate::stmt::StmtArena;
    use crate::symbol::Symbol;

    fn build(build_fn: impl FnOnce(&mut ExprArena, &mut StmtArena) -> Vec<StmtId>) -> Function {
        let mut exprs = ExprArena::new();
        let mut stmts = StmtArena::new();
        let body = build_fn(&mut exprs, &mut stmts);
        Function {
            name: Symbol::intern("pkg.F"),
            file: Symbol::intern("pkg/f.go"),
            params: Vec::new(),
            receiver: None,
            implements: None,
            body,
            stmts,
            exprs,
        }
    }

    #[test]
    fn direct_propagation_detected() {
        let function = build(|exprs, stmts| {
            let local = LocalId::new(0);
            let call = exprs.alloc(Expr::Nil);
            let assign = stmts.alloc(Stmt::Assign { targets: vec![Some(local)], value: call });
            let local_ref = exprs.alloc(Expr::LocalRef(local));
            let ret = stmts.alloc(Stmt::Return(vec![local_ref]));
            vec![assign, ret]
        });
        let (propagated, checks) =
            checks_before_escape(&function.body, &function, TrackedRoot::Local(LocalId::new(0)));
        assert!(propagated);
        assert!(checks.checked_identities().is_empty());
    }

    #[test]
    fn branch_checks_accumulate_down_else_chain() {
        let local = LocalId::new(0);
        let alpha = Symbol::intern("pkg.ErrAlpha");
        let beta = Symbol::intern("pkg.ErrBeta");
        let function = build(|exprs, stmts| {
            let local_ref1 = exprs.alloc(Expr::LocalRef(local));
            let is_alpha = exprs.alloc(Expr::Is {
                subject: local_ref1,
                identity: ErrorIdentity::Sentinel(alpha),
            });

            let local_ref2 = exprs.alloc(Expr::LocalRef(local));
            let is_beta = exprs.alloc(Expr::Is {
                subject: local_ref2,
                identity: ErrorIdentity::Sentinel(beta),
            });
            let inner_if = stmts.alloc(Stmt::If {
                cond: is_beta,
                then_branch: vec![],
                else_branch: vec![],
            });

            let outer_if = stmts.alloc(Stmt::If {
                cond: is_alpha,
                then_branch: vec![],
                else_branch: vec![inner_if],
            });
            vec![outer_if]
        });
        let (propagated, checks) = checks_before_escape(&function.body, &function, TrackedRoot::Local(local));
        assert!(!propagated);
        assert!(checks.contains(ErrorIdentity::Sentinel(alpha)));
        assert!(checks.contains(ErrorIdentity::Sentinel(beta)));
    }

    #[test]
    fn unchecked_branch_breaks_the_join() {
        let local = LocalId::new(0);
        let alpha = Symbol::intern("pkg.ErrAlpha");
        let function = build(|exprs, stmts| {
            let local_ref = exprs.alloc(Expr::LocalRef(local));
            let is_alpha = exprs.alloc(Expr::Is {
                subject: local_ref,
                identity: ErrorIdentity::Sentinel(alpha),
            });
            let if_stmt = stmts.alloc(Stmt::If {
                cond: is_alpha,
                then_branch: vec![],
                else_branch: vec![],
            });
            vec![if_stmt]
        });
        let (propagated, checks) = checks_before_escape(&function.body, &function, TrackedRoot::Local(local));
        assert!(!propagated);
        assert!(checks.contains(ErrorIdentity::Sentinel(alpha)));
    }
}
