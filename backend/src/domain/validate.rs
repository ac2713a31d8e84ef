//! Entry-time validation shared by the ledger services.
//!
//! Invalid input is rejected here, before anything reaches storage or the
//! reporting pipeline; nothing downstream corrects bad data.

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
    #[error("Amount must be greater than zero")]
    AmountNotPositive,
}

/// Require a non-blank text field
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField(field))
    } else {
        Ok(())
    }
}

/// Require a strictly positive amount
pub fn require_positive_amount(amount: Decimal) -> Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        Err(ValidationError::AmountNotPositive)
    } else {
        Ok(())
    }
}
