//! Split calculation (pure domain logic).
//!
//! Turns an expense amount and a debtor list into exact per-debtor shares under
//! one of the supported split methods. No IO, no ledger state.

pub mod calculator;

pub use calculator::{Share, Shares, SplitMethod, compute_shares};
