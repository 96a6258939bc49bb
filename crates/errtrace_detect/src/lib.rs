//! Error-origin detector (component D): scans each function once for its
//! local `ReturnFact` and publishes exported-error-type facts.

mod classify;
mod function;
mod package;

pub use classify::{classify_expr, CalleeEdge, CalleeTarget, Origin};
pub use function::{detect_function, DetectedFunction};
pub use package::{detect_package, DetectedPackage};
