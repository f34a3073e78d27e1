//! Error taxonomy shared by the domain, the repository contracts and the use
//! cases. Storage adapters translate their native errors into these variants so
//! nothing above the persistence layer has to know which engine is in use.

use thiserror::Error;

/// Boxed cause carried by storage-originated variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// An identifier string was not a well-formed UUID.
    #[error("invalid identifier `{value}`")]
    InvalidFormat {
        value: String,
        #[source]
        source: uuid::Error,
    },

    /// The store rejected a write because of a uniqueness or referential
    /// integrity rule (for example a duplicate author name).
    #[error("{message}")]
    ConstraintViolation {
        message: String,
        #[source]
        source: BoxError,
    },

    /// Beginning or committing a transaction failed. Nothing issued inside the
    /// failed unit of work is persisted.
    #[error("transaction failed")]
    TransactionFailure {
        #[source]
        source: BoxError,
    },

    /// Any other failure reported by the storage engine.
    #[error("storage error")]
    Storage {
        #[source]
        source: BoxError,
    },
}

impl CatalogError {
    pub fn constraint_violation(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        CatalogError::ConstraintViolation {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn transaction_failure(source: impl Into<BoxError>) -> Self {
        CatalogError::TransactionFailure {
            source: source.into(),
        }
    }

    pub fn storage(source: impl Into<BoxError>) -> Self {
        CatalogError::Storage {
            source: source.into(),
        }
    }

    /// True for errors the user can fix by changing their input.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, CatalogError::ConstraintViolation { .. })
    }
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
