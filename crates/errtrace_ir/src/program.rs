//! Package and function-level structure: the top of the input-contract IR.

use rustc_hash::FxHashMap;

use crate::expr::{ExprArena, LocalId};
use crate::stmt::{Stmt, StmtArena, StmtId};
use crate::symbol::Symbol;

/// The source file a function is declared in, for diagnostic positions.
pub type FileId = Symbol;

/// A declared type that implements the target language's error interface.
#[derive(Clone, Debug)]
pub struct ErrorTypeDecl {
    /// Fully qualified type name.
    pub name: Symbol,
}

impl ErrorTypeDecl {
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.name.is_exported()
    }
}

/// A method's receiver, when a function is declared as a method on a type.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Receiver {
    pub type_name: Symbol,
    pub by_pointer: bool,
}

/// Identifies the interface method this function implements, if any. Used
/// to populate the cross-package implementation-discovery registry.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct InterfaceMethod {
    pub interface_name: Symbol,
    pub method_name: Symbol,
}

/// One parameter of a function or method.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Param {
    pub index: u32,
    pub is_error_type: bool,
    pub is_function_type: bool,
}

/// A defined function, method, or function literal.
#[derive(Clone, Debug)]
pub struct Function {
    /// Fully qualified name. For a method this includes the receiver type;
    /// for a closure, a synthesized name scoped to its binding site.
    pub name: Symbol,
    pub file: FileId,
    pub params: Vec<Param>,
    pub receiver: Option<Receiver>,
    pub implements: Option<InterfaceMethod>,
    pub body: Vec<StmtId>,
    pub stmts: StmtArena,
    pub exprs: ExprArena,
}

impl Function {
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.name.is_exported()
    }

    pub fn param(&self, index: u32) -> Option<&Param> {
        self.params.iter().find(|p| p.index == index)
    }

    /// Maps each local to the value it was assigned, by walking every
    /// statement reachable from the function body (including inside `if`,
    /// `switch`, and `defer`). The input contract models SSA-like single
    /// assignment, so a local has exactly one definition; the first one
    /// found wins if an upstream producer violates that.
    #[must_use]
    pub fn local_defs(&self) -> FxHashMap<LocalId, crate::expr::ExprId> {
        let mut defs = FxHashMap::default();
        self.walk_stmts(&self.body, &mut defs);
        defs
    }

    fn walk_stmts(&self, ids: &[StmtId], defs: &mut FxHashMap<LocalId, crate::expr::ExprId>) {
        for &id in ids {
            match self.stmts.get(id) {
                Stmt::Assign { targets, value } => {
                    for target in targets.iter().flatten() {
                        defs.entry(*target).or_insert(*value);
                    }
                }
                Stmt::ExprStmt(_) | Stmt::Return(_) => {}
                Stmt::If { then_branch, else_branch, .. } => {
                    self.walk_stmts(then_branch, defs);
                    self.walk_stmts(else_branch, defs);
                }
                Stmt::Switch { cases, .. } => {
                    for case in cases {
                        self.walk_stmts(&case.body, defs);
                    }
                }
                Stmt::Defer(body) | Stmt::Block(body) => self.walk_stmts(body, defs),
            }
        }
    }
}

/// One analyzed package: a unit of compilation with its own import list,
/// declared error types, and defined functions/methods.
#[derive(Clone, Debug)]
pub struct Package {
    /// Fully qualified package path, e.g. `"example.com/pkg"`.
    pub path: Symbol,
    pub imports: Vec<Symbol>,
    pub error_types: Vec<ErrorTypeDecl>,
    pub functions: Vec<Function>,
}

impl Package {
    pub fn function(&self, name: Symbol) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// The whole-program input: every package to be analyzed, already resolved
/// into a reverse-topologically-orderable import graph.
#[derive(Clone, Default, Debug)]
pub struct Program {
    pub packages: Vec<Package>,
}

impl Program {
    #[must_use]
    pub fn new() -> Self {
        Program::default()
    }

    pub fn package(&self, path: Symbol) -> Option<&Package> {
        self.packages.iter().find(|p| p.path == path)
    }
}
