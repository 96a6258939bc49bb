//! Package-level D pass: detect every function in parallel and publish
//! exported-error-type facts.

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use errtrace_facts::{ErrorTypeFact, FactStore};
use errtrace_ir::{Package, Symbol};

use crate::function::{detect_function, DetectedFunction};

/// Result of running D over one package: every function's local
/// `ReturnFact` plus unresolved callee edges, keyed by fully qualified
/// function/method name.
pub type DetectedPackage = FxHashMap<Symbol, DetectedFunction>;

/// Run D over every function in `package`, in parallel (spec §5: "within a
/// package, functions may be processed in parallel for the D pass"), and
/// publish an `ErrorTypeFact` for every exported error-implementing type.
pub fn detect_package(package: &Package, facts: &dyn FactStore) -> DetectedPackage {
    for decl in &package.error_types {
        if decl.is_exported() {
            tracing::debug!(package = %package.path, ty = %decl.name, "publishing exported error type");
            facts.publish_error_type(ErrorTypeFact { fully_qualified_name: decl.name });
        }
    }

    package
        .functions
        .par_iter()
        .map(|function| {
            tracing::trace!(function = %function.name, "detecting local return fact");
            (function.name, detect_function(function))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use errtrace_ir::{Expr, ExprArena, ErrorTypeDecl, Function, Stmt, StmtArena};
    use errtrace_facts::InMemoryFactStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn publishes_exported_type_and_detects_functions() {
        let mut exprs = ExprArena::new();
        let sentinel = exprs.alloc(Expr::SentinelRef(Symbol::intern("pkg.ErrA")));
        let mut stmts = StmtArena::new();
        let ret = stmts.alloc(Stmt::Return(vec![sentinel]));
        let function = Function {
            name: Symbol::intern("pkg.F"),
            file: Symbol::intern("pkg/f.go"),
            params: Vec::new(),
            receiver: None,
            implements: None,
            body: vec![ret],
            stmts,
            exprs,
        };
        let package = Package {
            path: Symbol::intern("pkg"),
            imports: Vec::new(),
            error_types: vec![ErrorTypeDecl { name: Symbol::intern("pkg.CustomError") }],
            functions: vec![function],
        };

        let store = InMemoryFactStore::new();
        let detected = detect_package(&package, &store);

        assert_eq!(detected.len(), 1);
        assert!(store.error_type(Symbol::intern("pkg.CustomError")).is_some());
    }
}
