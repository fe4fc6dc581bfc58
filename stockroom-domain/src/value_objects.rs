//! Value Objects for the Stockroom Domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Product id must be positive
    #[error("Invalid product id: {0}")]
    InvalidProductId(i32),

    /// Warehouse id must be positive
    #[error("Invalid warehouse id: {0}")]
    InvalidWarehouseId(i32),

    /// Amount must be positive
    #[error("Invalid amount: {0}")]
    InvalidAmount(i32),

    /// Timestamp missing or left at its default value
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Invalid state transition
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

// =============================================================================
// ProductId
// =============================================================================

/// Identifier of a product row
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct ProductId(i32);

impl ProductId {
    /// Create a new ProductId with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidProductId` if value <= 0
    pub fn new(value: i32) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidProductId(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying integer
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for ProductId {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductId> for i32 {
    fn from(id: ProductId) -> Self {
        id.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// WarehouseId
// =============================================================================

/// Identifier of a warehouse row
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct WarehouseId(i32);

impl WarehouseId {
    /// Create a new WarehouseId with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidWarehouseId` if value <= 0
    pub fn new(value: i32) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidWarehouseId(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying integer
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for WarehouseId {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WarehouseId> for i32 {
    fn from(id: WarehouseId) -> Self {
        id.0
    }
}

impl fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Amount
// =============================================================================

/// Amount represents a positive quantity of product units
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Amount(i32);

impl Amount {
    /// Create a new Amount with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidAmount` if value <= 0
    pub fn new(value: i32) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidAmount(value));
        }
        Ok(Self(value))
    }

    /// Get the underlying integer
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Amount {
    type Error = DomainError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for i32 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Tests
// =============================================================================
