//! Domain errors
//!
//! Only the failures the rules themselves can produce live here.
//! Unknown quest ids are not errors: completing or deleting them is a no-op.

use super::decoration::Decoration;

/// Errors raised by the reward economy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input rejected before touching any state
    Validation { field: &'static str, reason: String },
    /// A debit would take the gold balance below zero
    InsufficientFunds { needed: u64, available: u64 },
    /// The decoration is already in the chamber
    AlreadyOwned { decoration: Decoration },
}

impl DomainError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl core::fmt::Display for DomainError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DomainError::Validation { field, reason } => {
                write!(f, "Invalid {}: {}", field, reason)
            }
            DomainError::InsufficientFunds { needed, available } => {
                write!(f, "Insufficient gold: need {}, have {}", needed, available)
            }
            DomainError::AlreadyOwned { decoration } => {
                write!(f, "Decoration already owned: {}", decoration)
            }
        }
    }
}

impl std::error::Error for DomainError {}
