//! Storage layer errors

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity (product, warehouse, order, movement)
        entity_type: String,
        /// Entity ID
        id: String,
    },

    /// Business rule rejected by the stored procedure
    #[error("{0}")]
    Raised(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Deserialization error (reading rows)
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Domain error passthrough
    #[error("Domain error: {0}")]
    Domain(#[from] stockroom_domain::DomainError),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }
}

/// SQLSTATE of a PL/pgSQL `RAISE EXCEPTION` without an explicit code.
#[cfg(feature = "postgres")]
pub(crate) const RAISE_EXCEPTION_SQLSTATE: &str = "P0001";

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::not_found("row", "unknown"),
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some(RAISE_EXCEPTION_SQLSTATE) {
                    StoreError::Raised(db_err.message().to_string())
                } else {
                    StoreError::Database(db_err.to_string())
                }
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Connection(err.to_string())
            },
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::Decode(_) => StoreError::Deserialization(err.to_string()),
            _ => StoreError::Database(err.to_string()),
        }
    }
}
