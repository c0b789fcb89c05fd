//! Collaborator contracts consumed by the engine.
//!
//! Membership, value transfer and time are owned by other components. The
//! engine only asks questions through these traits and never caches answers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use splitledger_core::{Amount, GroupId, MemberId};

/// Read-only view of the group directory.
pub trait MembershipDirectory: Send + Sync {
    fn group_exists(&self, group: &GroupId) -> bool;

    fn is_member(&self, group: &GroupId, member: &MemberId) -> bool;
}

/// Failure reported by a value-transfer backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("{account} holds {available}, needs {required}")]
    InsufficientBalance {
        account: MemberId,
        available: Amount,
        required: Amount,
    },

    #[error("{account} approved {approved}, needs {required}")]
    InsufficientAllowance {
        account: MemberId,
        approved: Amount,
        required: Amount,
    },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Moves value between two identities.
///
/// Called at most once per settlement attempt. The result must be final when
/// the call returns: `Ok` means the value has moved, `Err` means nothing moved.
pub trait ValueTransfer: Send + Sync {
    fn transfer(&self, from: &MemberId, to: &MemberId, amount: Amount) -> Result<(), TransferError>;
}

/// Source of processing time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<D> MembershipDirectory for Arc<D>
where
    D: MembershipDirectory + ?Sized,
{
    fn group_exists(&self, group: &GroupId) -> bool {
        (**self).group_exists(group)
    }

    fn is_member(&self, group: &GroupId, member: &MemberId) -> bool {
        (**self).is_member(group, member)
    }
}

impl<T> ValueTransfer for Arc<T>
where
    T: ValueTransfer + ?Sized,
{
    fn transfer(&self, from: &MemberId, to: &MemberId, amount: Amount) -> Result<(), TransferError> {
        (**self).transfer(from, to, amount)
    }
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
