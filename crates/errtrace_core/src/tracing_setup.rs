//! Logging setup for standalone/CLI use of the analyzer: an `EnvFilter`
//! driven by `ERRTRACE_LOG` (falling back to `RUST_LOG`), rendered as a
//! tree so nested D/P/C spans are easy to follow.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Install a global tracing subscriber. Idempotent: a second call is a
/// no-op rather than a panic, so tests and embedding callers can call it
/// freely.
pub fn init() {
    let filter = EnvFilter::try_from_env("ERRTRACE_LOG")
        .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_tree::HierarchicalLayer::new(2))
        .try_init();
}
