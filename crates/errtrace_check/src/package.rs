//! Package-level C pass: check every function in parallel, same as D (spec
//! §5 — C has no cross-function dependency once P has converged and
//! published this package's facts).

use rayon::prelude::*;

use errtrace_diagnostic::DiagnosticRecord;
use errtrace_facts::FactReader;
use errtrace_ir::Package;
use errtrace_propagate::ImplRegistry;

use crate::function::check_function;

#[must_use]
pub fn check_package(
    package: &Package,
    facts: &(dyn FactReader + Sync),
    registry: &ImplRegistry,
) -> Vec<DiagnosticRecord> {
    package
        .functions
        .par_iter()
        .flat_map(|function| check_function(function, package.path, facts, registry))
        .collect()
}
