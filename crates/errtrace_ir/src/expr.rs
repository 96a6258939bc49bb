//! Flat expression arena: the value-producing half of the input-contract IR.
//!
//! Expressions are stored in a per-function arena and referenced by
//! [`ExprId`] rather than boxed, mirroring the teacher's `ExprId`/`ExprArena`
//! split for its own flat AST — one `Vec`, integer indices, `Copy` ids.

use crate::identity::ErrorIdentity;
use crate::span::Span;
use crate::symbol::Symbol;

/// Index into a function's [`ExprArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct ExprId(u32);

impl ExprId {
    pub const INVALID: ExprId = ExprId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        ExprId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Default for ExprId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// A local variable binding within one function, including the blank
/// identifier's targets (see [`crate::stmt::Stmt::Assign`]).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct LocalId(u32);

impl LocalId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        LocalId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of the expression tree.
///
/// This is deliberately narrower than a general-purpose expression AST: it
/// carries exactly the shapes the detector's seven classification rules
/// (rule numbers below) and the checker's four check forms need to
/// recognize, since a real front end would lower everything else away
/// before handing SSA to this analyzer.
#[derive(Clone, Debug)]
pub enum Expr {
    /// Rule 1: reference to a package-level sentinel error value.
    SentinelRef(Symbol),
    /// Rule 2: address-of or construction of a named error-implementing type.
    TypeConstruct { type_name: Symbol, by_pointer: bool },
    /// Rule 3: the result of calling another function. `result_index`
    /// picks out which of the callee's declared results this expression
    /// observes (the analyzer only cares about the error-typed result).
    /// `span` is the call site's source position, carried here because it
    /// is the only node kind the checker ever needs to report a diagnostic
    /// against.
    Call {
        callee: Symbol,
        args: Vec<ExprId>,
        result_index: u32,
        span: Span,
    },
    /// A call through an interface method, rather than a directly named
    /// function or concrete-type method. Unlike `Call`, the propagator
    /// cannot resolve this to one callee's `ReturnFact` directly — it must
    /// expand it to the union over every known implementation of
    /// `interface_name::method_name` (spec §4.2 method resolution).
    InterfaceCall {
        interface_name: Symbol,
        method_name: Symbol,
        args: Vec<ExprId>,
        result_index: u32,
        span: Span,
    },
    /// Rule 4: reference to one of the enclosing function's parameters.
    ParamRef(u32),
    /// Rule 5: invocation of a function-typed parameter.
    ParamInvoke {
        param: u32,
        args: Vec<ExprId>,
        span: Span,
    },
    /// Rule 6: a wrapping-formatter call (`%w`-style) around `inner`; the
    /// wrapped operand's identity passes through untouched.
    WrapCall { inner: ExprId },
    /// Reference to a previously bound local variable.
    LocalRef(LocalId),
    /// Reference to a named function or method, passed as a first-class
    /// callable value (e.g. an argument to a higher-order function). The
    /// propagator resolves this to the referenced function's own
    /// `ReturnFact` when instantiating a `call:j` marker at the call site
    /// that eventually invokes it.
    FuncRef(Symbol),
    /// The nil/no-error literal, used as an operand of direct comparisons.
    Nil,
    /// `Is(subject, identity)` — sentinel identity-check primitive.
    Is { subject: ExprId, identity: ErrorIdentity },
    /// `As(subject, &t)` — dynamic-type-match primitive against `identity`.
    As { subject: ExprId, identity: ErrorIdentity },
    /// Direct identity comparison: `left == right`, with one side a
    /// sentinel reference and the other the tracked variable (or vice
    /// versa); also used for a tag-less switch case's implicit comparison.
    Eq { left: ExprId, right: ExprId },
}

/// Contiguous storage for one function's expressions.
#[derive(Clone, Default, Debug)]
pub struct ExprArena {
    exprs: Vec<Expr>,
}

impl ExprArena {
    #[must_use]
    pub fn new() -> Self {
        ExprArena::default()
    }

    // A function body can't hold anywhere near u32::MAX expressions.
    #[allow(clippy::expect_used)]
    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(u32::try_from(self.exprs.len()).expect("expression arena overflow"));
        self.exprs.push(expr);
        id
    }

    pub fn get(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }
}
