//! Pairwise debt ledger (netted obligations per group).
//!
//! Pure state transitions live in [`debt`]; [`book`] keeps one ledger per group
//! behind its own lock so that every read-modify-write is serialized per group.

pub mod book;
pub mod debt;

pub use book::LedgerBook;
pub use debt::{DebtLedger, MemberBalance, Netting, PairwiseDebt};
