//! Whole-program interface implementation registry.
//!
//! Interface implementations can live in any package, unrelated by import
//! edges to the interface's own declaring package or to a given call site's
//! package — so unlike the rest of P, which runs per package in reverse
//! topological import order, this registry has to be built once, up front,
//! by scanning every package's every function before any package's P phase
//! starts (spec §4.2 method resolution, §5 scheduling).

use rustc_hash::FxHashMap;

use errtrace_ir::{Program, Symbol};

/// Maps `(interface_name, method_name)` to the fully qualified names of
/// every function known to implement that method.
#[derive(Clone, Default, Debug)]
pub struct ImplRegistry {
    implementations: FxHashMap<(Symbol, Symbol), Vec<Symbol>>,
}

impl ImplRegistry {
    #[must_use]
    pub fn implementations(&self, interface_name: Symbol, method_name: Symbol) -> &[Symbol] {
        self.implementations
            .get(&(interface_name, method_name))
            .map_or(&[], Vec::as_slice)
    }

    #[cfg(test)]
    pub(crate) fn insert_for_test(&mut self, interface_name: Symbol, method_name: Symbol, implementor: Symbol) {
        self.implementations.entry((interface_name, method_name)).or_default().push(implementor);
    }
}

/// Scan every package's every function for `implements` metadata and build
/// the registry that lets P expand an `InterfaceCall` edge into the union
/// over every known implementation's `ReturnFact`.
#[must_use]
pub fn build_impl_registry(program: &Program) -> ImplRegistry {
    let mut implementations: FxHashMap<(Symbol, Symbol), Vec<Symbol>> = FxHashMap::default();
    for package in &program.packages {
        for function in &package.functions {
            if let Some(method) = &function.implements {
                tracing::trace!(
                    function = %function.name,
                    interface = %method.interface_name,
                    method = %method.method_name,
                    "registering interface implementation"
                );
                implementations
                    .entry((method.interface_name, method.method_name))
                    .or_default()
                    .push(function.name);
            }
        }
    }
    ImplRegistry { implementations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errtrace_ir::{ExprArena, Function, InterfaceMethod, Package, StmtArena};
    use pretty_assertions::assert_eq;

    fn leaf_function(name: &str, implements: Option<InterfaceMethod>) -> Function {
        Function {
            name: Symbol::intern(name),
            file: Symbol::intern("pkg/f.go"),
            params: Vec::new(),
            receiver: None,
            implements,
            body: Vec::new(),
            stmts: StmtArena::default(),
            exprs: ExprArena::new(),
        }
    }

    #[test]
    fn collects_implementations_across_packages() {
        let method = InterfaceMethod {
            interface_name: Symbol::intern("iface.Reader"),
            method_name: Symbol::intern("Read"),
        };
        let pkg_a = Package {
            path: Symbol::intern("a"),
            imports: Vec::new(),
            error_types: Vec::new(),
            functions: vec![leaf_function("a.FileReader.Read", Some(method.clone()))],
        };
        let pkg_b = Package {
            path: Symbol::intern("b"),
            imports: Vec::new(),
            error_types: Vec::new(),
            functions: vec![
                leaf_function("b.NetReader.Read", Some(method.clone())),
                leaf_function("b.Helper", None),
            ],
        };
        let program = Program { packages: vec![pkg_a, pkg_b] };

        let registry = build_impl_registry(&program);
        let mut impls = registry
            .implementations(method.interface_name, method.method_name)
            .to_vec();
        impls.sort_unstable();
        assert_eq!(
            impls,
            vec![Symbol::intern("a.FileReader.Read"), Symbol::intern("b.NetReader.Read")]
        );
        assert!(registry.implementations(Symbol::intern("iface.Other"), method.method_name).is_empty());
    }
}
