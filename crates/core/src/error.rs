//! Ledger error model.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::id::{GroupId, MemberId};

/// Result type used across the ledger crates.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Every variant is a caller-visible, deterministic failure. The engine never
/// retries; none of these leave ledger state partially updated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The group does not exist in the membership directory.
    #[error("group not found: {0}")]
    NoSuchGroup(GroupId),

    /// An identity taking part in an operation is not a group member.
    #[error("{member} is not a member of group {group}")]
    NotAMember { group: GroupId, member: MemberId },

    /// An amount was zero or would overflow the unit of account.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The expense date lies after the processing time.
    #[error("expense date {date} is after {now}")]
    FutureDate { date: DateTime<Utc>, now: DateTime<Utc> },

    /// An expense named no debtors.
    #[error("expense has no debtors")]
    EmptyDebtorSet,

    /// A raw split method code did not map to a known method.
    #[error("unknown split method code: {0}")]
    UnknownSplitMethod(u8),

    /// Split parameters were inconsistent with the method or the amount.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    /// No obligation exists in the requested direction.
    #[error("{debtor} owes nothing to {creditor}")]
    NoSuchDebt { debtor: MemberId, creditor: MemberId },

    /// The external value transfer reported failure.
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// Sender and receiver of a settlement are the same identity.
    #[error("{0} cannot settle a debt with themselves")]
    SelfSettlement(MemberId),

    /// Debtor and creditor of an obligation are the same identity.
    #[error("{0} cannot owe themselves")]
    SelfObligation(MemberId),

    /// An identifier was malformed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A group with this name already exists.
    #[error("group already exists: {0}")]
    GroupAlreadyExists(GroupId),

    /// The identity has already joined the group.
    #[error("{member} already joined group {group}")]
    AlreadyMember { group: GroupId, member: MemberId },

    /// A group was created without initial members.
    #[error("a group needs at least one initial member")]
    EmptyMemberSet,

    /// Ledger state could not be accessed (e.g. a poisoned lock).
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),
}

impl LedgerError {
    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    pub fn invalid_split(msg: impl Into<String>) -> Self {
        Self::InvalidSplit(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn transfer_failed(msg: impl Into<String>) -> Self {
        Self::TransferFailed(msg.into())
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::LedgerUnavailable(msg.into())
    }

    pub fn not_a_member(group: &GroupId, member: &MemberId) -> Self {
        Self::NotAMember {
            group: group.clone(),
            member: member.clone(),
        }
    }

    pub fn no_such_debt(debtor: &MemberId, creditor: &MemberId) -> Self {
        Self::NoSuchDebt {
            debtor: debtor.clone(),
            creditor: creditor.clone(),
        }
    }
}
