//! Whole-program fact propagation (component P).
//!
//! Two independent passes feed into the per-package `ReturnFact` worklist:
//! a whole-program scan that builds the interface implementation registry
//! ([`registry`]), and a purely intraprocedural `ParamCheckFact` pass
//! ([`paramcheck`]) that has no ordering dependency on package import order
//! at all. [`worklist`] is the part that *is* import-order-constrained: a
//! package's `ReturnFact` fixed point may read already-published facts from
//! its imports, but never the reverse.

mod paramcheck;
mod registry;
mod worklist;

pub use paramcheck::{compute_param_check_facts, interface_param_check_facts};
pub use registry::{build_impl_registry, ImplRegistry};
pub use worklist::{instantiate_callee_fact, propagate_package, resolve_edge_contributions};
