use std::fmt;

use errtrace_ir::{ErrorIdentity, FileId, Span};

/// A position a diagnostic is reported against: a file plus a byte span
/// within it. The front end that lowers real source positions into
/// `errtrace_ir` is responsible for line/column mapping; this analyzer
/// only ever needs file + span to identify a call site uniquely.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Position {
    pub file: FileId,
    pub span: Span,
}

impl Position {
    #[must_use]
    pub fn new(file: FileId, span: Span) -> Self {
        Position { file, span }
    }
}

/// The three ways a call site can fail its checking obligation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DiagnosticKind {
    /// The error result escapes unchecked (but not via a bare expression
    /// statement or blank assignment — see the other two kinds).
    UncheckedReturn,
    /// The call appears as an expression statement; every result, errors
    /// included, is discarded.
    DiscardedReturn,
    /// The call's error result is assigned to the blank identifier.
    BlankAssign,
}

impl DiagnosticKind {
    /// Stable machine-readable kind code, per the fact/diagnostic schema.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::UncheckedReturn => "unchecked-return",
            DiagnosticKind::DiscardedReturn => "discarded-return",
            DiagnosticKind::BlankAssign => "blank-assign",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single emitted diagnostic: a (position, identity, kind) triple.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct DiagnosticRecord {
    pub position: Position,
    pub identity: ErrorIdentity,
    pub kind: DiagnosticKind,
}

impl DiagnosticRecord {
    #[must_use]
    pub fn new(position: Position, identity: ErrorIdentity, kind: DiagnosticKind) -> Self {
        DiagnosticRecord { position, identity, kind }
    }

    /// `missing Is check for <fully-qualified-identity>`.
    #[must_use]
    pub fn message(&self) -> String {
        format!("missing Is check for {}", self.identity.name())
    }

    /// The (position, identity) key two records are deduplicated on —
    /// deliberately excludes `kind`, since the same site can't legitimately
    /// emit two different kinds for the same identity.
    pub(crate) fn dedup_key(&self) -> (Position, errtrace_ir::Symbol) {
        (self.position, self.identity.name())
    }
}
