use thiserror::Error;
use uuid::Uuid;

use crate::models::MAX_PARENTS;

/// Failures raised by the registry core.
///
/// Domain failures (everything except [`RegistryError::Storage`] and
/// [`RegistryError::LockPoisoned`]) are scoped to a single request and leave
/// the store unchanged.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Person {0} not found")]
    NotFound(Uuid),

    #[error("Person {child} already has {max} parents", max = MAX_PARENTS)]
    ParentLimitExceeded { child: Uuid },

    #[error("Person {0} cannot be their own parent")]
    SelfParenting(Uuid),

    #[error("Person {parent} is a descendant of {child} and cannot become their parent")]
    CyclicParentage { child: Uuid, parent: Uuid },

    #[error("Person has not been saved yet")]
    Unsaved,

    #[error("Invalid person: {0}")]
    Invalid(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl RegistryError {
    /// Whether the failure was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_) | Self::LockPoisoned)
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
