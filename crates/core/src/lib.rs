//! Shared building blocks for the expense ledger.
//!
//! Identifiers, the unit of account, and the error model. No IO, no locking.

pub mod amount;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use amount::{Amount, ensure_positive};
pub use entity::Entity;
pub use error::{LedgerError, LedgerResult};
pub use id::{GroupId, MemberId};
pub use value_object::ValueObject;
