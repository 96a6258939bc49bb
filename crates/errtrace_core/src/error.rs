use errtrace_ir::Symbol;

/// Failures that can stop a whole-program analysis run before any
/// diagnostics are produced.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    #[error("import graph has a cycle involving package {0}")]
    CyclicImports(Symbol),
    #[error("package {importer} imports unknown package {imported}")]
    UnknownImport { importer: Symbol, imported: Symbol },
}
