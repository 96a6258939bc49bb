//! Core data model and input-contract IR for the error-origin inference and
//! call-site exhaustiveness checker.
//!
//! This crate has no notion of source text, parsing, or type checking — it
//! is the contract a front end would lower typed AST + SSA into. Callers
//! (in particular the analyzer's own tests) construct [`program::Program`]
//! values directly.

pub mod dataflow;
pub mod expr;
pub mod identity;
pub mod program;
pub mod span;
pub mod stmt;
pub mod symbol;

pub use dataflow::{checks_before_escape, TrackedRoot};
pub use expr::{Expr, ExprArena, ExprId, LocalId};
pub use identity::{CheckSet, ErrorIdentity, FactElem, ParamCheckFact, ReturnFact};
pub use program::{
    ErrorTypeDecl, FileId, Function, InterfaceMethod, Package, Param, Program, Receiver,
};
pub use span::Span;
pub use stmt::{Stmt, StmtArena, StmtId, SwitchCase};
pub use symbol::Symbol;
