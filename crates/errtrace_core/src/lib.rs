//! Whole-program orchestration: stages the detector, propagator, and
//! checker across a program's packages in the order spec §5 requires.
//!
//! ```text
//! build_impl_registry (whole program, order-independent)
//! compute_param_check_facts (whole program, order-independent — intraprocedural)
//! for each package, in reverse topological import order:
//!     detect_package   (D)
//!     propagate_package (P, reads already-published imports)
//!     publish resolved ReturnFacts
//!     check_package    (C)
//! ```

mod config;
mod error;
mod schedule;
pub mod tracing_setup;

pub use config::AnalyzerConfig;
pub use error::AnalysisError;
pub use schedule::dependency_order;

use errtrace_check::check_package;
use errtrace_detect::detect_package;
use errtrace_diagnostic::{DiagnosticQueue, DiagnosticRecord};
use errtrace_facts::{FactStore, InMemoryFactStore};
use errtrace_ir::Program;
use errtrace_propagate::{build_impl_registry, compute_param_check_facts, propagate_package};

/// Run the full D → P → C pipeline over `program` and return every
/// diagnostic, deduplicated and ordered by source position.
pub fn analyze_program(
    program: &Program,
    config: &AnalyzerConfig,
) -> Result<Vec<DiagnosticRecord>, AnalysisError> {
    let order = dependency_order(program)?;
    let registry = build_impl_registry(program);
    let store = InMemoryFactStore::new();

    for package in &program.packages {
        for function in &package.functions {
            if !(function.is_exported() || config.publish_unexported) {
                continue;
            }
            let facts = compute_param_check_facts(function);
            if !facts.is_empty() {
                store.publish_param_check_facts(function.name, facts);
            }
        }
    }

    let mut diagnostics = DiagnosticQueue::new();
    for path in order {
        // `dependency_order` only ever pushes paths it read off `program.packages`,
        // so every scheduled path resolves here.
        #[allow(clippy::expect_used)]
        let package = program.package(path).expect("a scheduled package must exist in the program");
        tracing::debug!(package = %path, "analyzing package");

        let detected = detect_package(package, &store);
        let resolved = propagate_package(package, &detected, &registry, &store);

        for function in &package.functions {
            let Some(fact) = resolved.get(&function.name) else { continue };
            if function.is_exported() || config.publish_unexported {
                store.publish_return_fact(function.name, fact.clone());
            }
        }

        diagnostics.extend(check_package(package, &store, &registry));
    }

    Ok(diagnostics.into_sorted())
}
