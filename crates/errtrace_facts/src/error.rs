use thiserror::Error;

/// Failures reading or writing the fact store. Per spec §7, these always
/// degrade to "no known facts for this symbol" at the call site — they
/// never escalate into a spurious diagnostic, only into under-reporting.
#[derive(Debug, Error)]
pub enum FactStoreError {
    #[error("failed to serialize fact snapshot: {0}")]
    Serialize(#[source] bincode::Error),

    #[error("failed to deserialize fact snapshot: {0}")]
    Deserialize(#[source] bincode::Error),
}
