//! Serializable snapshot of a [`InMemoryFactStore`](crate::store::InMemoryFactStore),
//! for persisting facts about a package's exported symbols across process
//! invocations (the `cache` feature, mirroring `ori_arc`/`ori_ir`'s own
//! `cache`-feature-gated `serde` + `bincode` persistence).

use errtrace_ir::{ParamCheckFact, ReturnFact, Symbol};
use serde::{Deserialize, Serialize};

use crate::error::FactStoreError;
use crate::store::{ErrorTypeFact, FactStore, InMemoryFactStore};

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct FactSnapshot {
    error_types: Vec<(Symbol, ErrorTypeFact)>,
    return_facts: Vec<(Symbol, ReturnFact)>,
    param_check_facts: Vec<(Symbol, Vec<ParamCheckFact>)>,
}

impl FactSnapshot {
    #[must_use]
    pub fn capture(store: &InMemoryFactStore) -> Self {
        FactSnapshot {
            error_types: store
                .error_types
                .iter()
                .map(|entry| (*entry.key(), *entry.value()))
                .collect(),
            return_facts: store
                .return_facts
                .iter()
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect(),
            param_check_facts: store
                .param_check_facts
                .iter()
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect(),
        }
    }

    /// Restore this snapshot's entries into `store`, as if each had just
    /// been published.
    pub fn restore_into(self, store: &InMemoryFactStore) {
        for (symbol, fact) in self.error_types {
            let _ = symbol;
            store.publish_error_type(fact);
        }
        for (symbol, fact) in self.return_facts {
            store.publish_return_fact(symbol, fact);
        }
        for (symbol, facts) in self.param_check_facts {
            store.publish_param_check_facts(symbol, facts);
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, FactStoreError> {
        bincode::serialize(self).map_err(FactStoreError::Serialize)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FactStoreError> {
        bincode::deserialize(bytes).map_err(FactStoreError::Deserialize)
    }
}
