//! Flat statement arena: the control-flow half of the input-contract IR.

use crate::expr::{ExprId, LocalId};

/// Index into a function's [`StmtArena`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct StmtId(u32);

impl StmtId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        StmtId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One case of a [`Stmt::Switch`]: either a tag-less comparison case (an
/// identity-bearing expression) or a type-switch case naming the matched
/// type by its `TypeError` identity; `None` marks the default case.
#[derive(Clone, Debug)]
pub struct SwitchCase {
    pub check: Option<ExprId>,
    pub body: Vec<StmtId>,
}

/// One statement node.
#[derive(Clone, Debug)]
pub enum Stmt {
    /// Binds `value` to zero or more targets; a `None` target is the blank
    /// identifier (`_`). An all-blank assignment of an error result is a
    /// `BlankAssign` site; so is every blank position within a partial
    /// assignment like `x, _ := h()`.
    Assign {
        targets: Vec<Option<LocalId>>,
        value: ExprId,
    },
    /// A call (or other expression) used as a full statement, its results
    /// entirely discarded — a `DiscardedReturn` site when it returns errors.
    ExprStmt(ExprId),
    /// Returns zero or more values from the enclosing function.
    Return(Vec<ExprId>),
    If {
        cond: ExprId,
        then_branch: Vec<StmtId>,
        else_branch: Vec<StmtId>,
    },
    /// A tag-less or type switch over `subject`.
    Switch {
        subject: ExprId,
        cases: Vec<SwitchCase>,
    },
    /// A deferred closure body; its statements run after the enclosing
    /// function's other statements, on every path, and may still discharge
    /// checks that dominate the function's exit.
    Defer(Vec<StmtId>),
    Block(Vec<StmtId>),
}

/// Contiguous storage for one function's statements.
#[derive(Clone, Default, Debug)]
pub struct StmtArena {
    stmts: Vec<Stmt>,
}

impl StmtArena {
    #[must_use]
    pub fn new() -> Self {
        StmtArena::default()
    }

    // A function body can't hold anywhere near u32::MAX statements.
    #[allow(clippy::expect_used)]
    pub fn alloc(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId::new(u32::try_from(self.stmts.len()).expect("statement arena overflow"));
        self.stmts.push(stmt);
        id
    }

    pub fn get(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }
}
