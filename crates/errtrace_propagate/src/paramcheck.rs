//! `ParamCheckFact` computation (spec §4.2/§4.3: which identities are
//! pre-checked before an error- or function-typed parameter escapes).
//!
//! Unlike `ReturnFact`, this is purely intraprocedural — a function's own
//! body is all that's needed to answer "what does this function check
//! against parameter `i` before it escapes?" There is no cross-function
//! fixed point here, so unlike [`crate::worklist::propagate_package`] this
//! can run over the whole program in one independent pass, same as
//! [`crate::registry::build_impl_registry`]. The only thing that *is*
//! cross-function is folding per-implementation facts into one fact for an
//! interface method, which needs every implementation's own fact computed
//! first — so that step is kept separate ([`interface_param_check_facts`])
//! and is meant to run after every package's intraprocedural pass has
//! published its results.

use rustc_hash::FxHashMap;

use errtrace_facts::FactReader;
use errtrace_ir::{checks_before_escape, Function, ParamCheckFact, Symbol, TrackedRoot};

use crate::registry::ImplRegistry;

/// Compute one `ParamCheckFact` per error- or function-typed parameter of
/// `function`.
#[must_use]
pub fn compute_param_check_facts(function: &Function) -> Vec<ParamCheckFact> {
    function
        .params
        .iter()
        .filter(|p| p.is_error_type || p.is_function_type)
        .map(|param| {
            let (_, checks) = checks_before_escape(&function.body, function, TrackedRoot::Param(param.index));
            ParamCheckFact::new(param.index, checks.checked_identities().iter().copied())
        })
        .collect()
}

/// Fold every known implementation's published `ParamCheckFact`s for
/// `interface_name::method_name` into the intersection the spec calls for:
/// an identity is pre-checked through the interface only if *every*
/// implementation checks it for that parameter.
#[must_use]
pub fn interface_param_check_facts(
    interface_name: Symbol,
    method_name: Symbol,
    registry: &ImplRegistry,
    facts: &dyn FactReader,
) -> Vec<ParamCheckFact> {
    let impls = registry.implementations(interface_name, method_name);
    if impls.is_empty() {
        return Vec::new();
    }

    let mut by_param: FxHashMap<u32, Vec<ParamCheckFact>> = FxHashMap::default();
    for impl_symbol in impls {
        for fact in facts.param_check_facts(*impl_symbol) {
            by_param.entry(fact.param).or_default().push(fact);
        }
    }

    by_param
        .into_iter()
        .map(|(param, facts)| ParamCheckFact::intersect(param, facts.iter()))
        .collect()
}
