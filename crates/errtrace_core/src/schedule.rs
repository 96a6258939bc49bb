//! Reverse topological ordering of packages by import edges (spec §5: a
//! package's P phase may read its imports' already-published facts, so
//! every import must be fully processed — D, P, and publish — before its
//! importer starts).

use rustc_hash::{FxHashMap, FxHashSet};

use errtrace_ir::{Program, Symbol};

use crate::error::AnalysisError;

/// Order `program`'s packages so that every package appears after all of
/// its imports.
pub fn dependency_order(program: &Program) -> Result<Vec<Symbol>, AnalysisError> {
    let known: FxHashSet<Symbol> = program.packages.iter().map(|p| p.path).collect();
    for package in &program.packages {
        for &import in &package.imports {
            if !known.contains(&import) {
                return Err(AnalysisError::UnknownImport { importer: package.path, imported: import });
            }
        }
    }

    let mut order = Vec::with_capacity(program.packages.len());
    let mut state: FxHashMap<Symbol, VisitState> = FxHashMap::default();

    for package in &program.packages {
        visit(package.path, program, &mut state, &mut order)?;
    }

    Ok(order)
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum VisitState {
    InProgress,
    Done,
}

fn visit(
    path: Symbol,
    program: &Program,
    state: &mut FxHashMap<Symbol, VisitState>,
    order: &mut Vec<Symbol>,
) -> Result<(), AnalysisError> {
    match state.get(&path) {
        Some(VisitState::Done) => return Ok(()),
        Some(VisitState::InProgress) => return Err(AnalysisError::CyclicImports(path)),
        None => {}
    }

    state.insert(path, VisitState::InProgress);
    let Some(package) = program.package(path) else {
        return Ok(());
    };
    for &import in &package.imports {
        visit(import, program, state, order)?;
    }
    state.insert(path, VisitState::Done);
    order.push(path);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use errtrace_ir::Package;
    use pretty_assertions::assert_eq;

    fn package(path: &str, imports: &[&str]) -> Package {
        Package {
            path: Symbol::intern(path),
            imports: imports.iter().map(|s| Symbol::intern(s)).collect(),
            error_types: Vec::new(),
            functions: Vec::new(),
        }
    }

    #[test]
    fn imports_come_before_importers() {
        let program = Program {
            packages: vec![package("app", &["lib"]), package("lib", &[])],
        };
        let order = dependency_order(&program).unwrap();
        let lib_pos = order.iter().position(|&s| s == Symbol::intern("lib")).unwrap();
        let app_pos = order.iter().position(|&s| s == Symbol::intern("app")).unwrap();
        assert!(lib_pos < app_pos);
    }

    #[test]
    fn cycle_is_rejected() {
        let program = Program {
            packages: vec![package("a", &["b"]), package("b", &["a"])],
        };
        assert!(matches!(dependency_order(&program), Err(AnalysisError::CyclicImports(_))));
    }

    #[test]
    fn unknown_import_is_rejected() {
        let program = Program { packages: vec![package("a", &["missing"])] };
        assert!(matches!(dependency_order(&program), Err(AnalysisError::UnknownImport { .. })));
    }
}
