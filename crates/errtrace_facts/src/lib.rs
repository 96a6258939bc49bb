//! Cross-package fact store: the append-only map of published
//! `ErrorTypeFact`/`ReturnFact`/`ParamCheckFact` entries a package's
//! propagator reads from its already-analyzed dependencies and writes to
//! at the end of its own fixed-point pass.

mod store;

#[cfg(feature = "cache")]
mod error;
#[cfg(feature = "cache")]
mod snapshot;

pub use store::{ErrorTypeFact, FactReader, FactStore, InMemoryFactStore};

#[cfg(feature = "cache")]
pub use error::FactStoreError;
#[cfg(feature = "cache")]
pub use snapshot::FactSnapshot;
