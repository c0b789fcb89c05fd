//! Application layer of the expense ledger.
//!
//! Orchestrates validation, split computation, ledger updates and external
//! value transfers. Collaborators (membership, transfer, clock, event bus) are
//! injected through the traits in [`ports`]; this crate performs no IO itself.

pub mod engine;
pub mod events;
pub mod expense;
pub mod ports;
pub mod publisher;
pub mod settlement;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{EngineSettings, LedgerEngine};
pub use events::{DebtSettled, ExpenseRecorded, LedgerEvent};
pub use expense::{ExpenseProcessor, ExpenseReceipt, ExpenseRequest};
pub use ports::{Clock, MembershipDirectory, TransferError, ValueTransfer};
pub use publisher::EventPublisher;
pub use settlement::{SettlementProcessor, SettlementReceipt, SettlementRequest};
