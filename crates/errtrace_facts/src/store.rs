//! The cross-package fact store.
//!
//! Append-only per symbol: a package publishes facts about its own exported
//! symbols once, at the end of its own fixed-point pass, and every later
//! reader (always a different package's propagator, never itself) only
//! ever reads already-published entries (spec §5). A `dashmap::DashMap`
//! gives this without an explicit lock, the same way `sigilc-v2` reaches
//! for `dashmap` for its own concurrent incremental caches.

use dashmap::DashMap;

use errtrace_ir::{ParamCheckFact, ReturnFact, Symbol};

/// A published fact about an exported error-implementing type, keyed by
/// its fully qualified name.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorTypeFact {
    pub fully_qualified_name: Symbol,
}

/// Read-only view of the fact store, as seen by a package analyzing its
/// own dependencies. Intentionally narrower than [`FactStore`]: a
/// dependency package's facts must already be published by the time this
/// package runs, so there is no publish side to expose here.
pub trait FactReader {
    fn error_type(&self, name: Symbol) -> Option<ErrorTypeFact>;
    fn return_fact(&self, symbol: Symbol) -> Option<ReturnFact>;
    fn param_check_facts(&self, symbol: Symbol) -> Vec<ParamCheckFact>;
}

/// The full read/publish interface, used by the package currently being
/// analyzed.
pub trait FactStore: FactReader {
    fn publish_error_type(&self, fact: ErrorTypeFact);
    fn publish_return_fact(&self, symbol: Symbol, fact: ReturnFact);
    fn publish_param_check_facts(&self, symbol: Symbol, facts: Vec<ParamCheckFact>);
}

/// In-memory, concurrent fact store implementation.
#[derive(Default)]
pub struct InMemoryFactStore {
    pub(crate) error_types: DashMap<Symbol, ErrorTypeFact>,
    pub(crate) return_facts: DashMap<Symbol, ReturnFact>,
    pub(crate) param_check_facts: DashMap<Symbol, Vec<ParamCheckFact>>,
}

impl InMemoryFactStore {
    #[must_use]
    pub fn new() -> Self {
        InMemoryFactStore::default()
    }
}

impl FactReader for InMemoryFactStore {
    fn error_type(&self, name: Symbol) -> Option<ErrorTypeFact> {
        self.error_types.get(&name).map(|entry| *entry)
    }

    fn return_fact(&self, symbol: Symbol) -> Option<ReturnFact> {
        self.return_facts.get(&symbol).map(|entry| entry.clone())
    }

    fn param_check_facts(&self, symbol: Symbol) -> Vec<ParamCheckFact> {
        self.param_check_facts
            .get(&symbol)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }
}

impl FactStore for InMemoryFactStore {
    fn publish_error_type(&self, fact: ErrorTypeFact) {
        tracing::trace!(name = %fact.fully_qualified_name, "publishing error type fact");
        self.error_types.insert(fact.fully_qualified_name, fact);
    }

    fn publish_return_fact(&self, symbol: Symbol, fact: ReturnFact) {
        tracing::trace!(symbol = %symbol, elements = fact.elements().len(), "publishing return fact");
        self.return_facts.insert(symbol, fact);
    }

    fn publish_param_check_facts(&self, symbol: Symbol, facts: Vec<ParamCheckFact>) {
        tracing::trace!(symbol = %symbol, count = facts.len(), "publishing param check facts");
        self.param_check_facts.insert(symbol, facts);
    }
}
