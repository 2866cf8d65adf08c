use crate::Id;
use thiserror::Error;

/// Errors raised while building or querying a [`super::WorkGraph`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkGraphError {
    #[error("adding this dependency would create a cycle")]
    CycleDetected,
    #[error("work unit id `{0}` already exists in the graph")]
    DuplicateId(Id),
    #[error("work unit id `{0}` is not present in the graph")]
    UnknownId(Id),
    #[error("work unit `{0}` cannot be its own inseparable successor")]
    SelfInseparable(Id),
    #[error("work unit `{0}` already has an inseparable predecessor")]
    AlreadyChained(Id),
}
