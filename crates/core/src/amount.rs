//! Unit of account.

use crate::error::{LedgerError, LedgerResult};

/// Amount in the smallest unit of account (one asset per group).
pub type Amount = u128;

/// Reject zero amounts, naming the offending field in the error.
pub fn ensure_positive(amount: Amount, what: &str) -> LedgerResult<Amount> {
    if amount == 0 {
        return Err(LedgerError::invalid_amount(format!("{what} must be positive")));
    }
    Ok(amount)
}
