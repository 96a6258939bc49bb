//! Per-call-site exhaustiveness checker (component C).

mod function;
mod package;
mod sites;

pub use function::check_function;
pub use package::check_package;
pub use sites::{collect_call_sites, CallSite, SiteOutcome};
