//! Debt settlement: cap to what is owed, move value, then update the ledger.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use splitledger_core::{Amount, GroupId, LedgerError, LedgerResult, MemberId, ensure_positive};
use splitledger_ledger::LedgerBook;

use crate::ports::{MembershipDirectory, ValueTransfer};

/// Request by `sender` to pay down what they owe `receiver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub group: GroupId,
    pub sender: MemberId,
    pub receiver: MemberId,
    /// Upper bound; anything above the owed amount is ignored.
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub group: GroupId,
    pub sender: MemberId,
    pub receiver: MemberId,
    pub requested: Amount,
    pub settled: Amount,
    /// What `sender` still owes `receiver` afterwards.
    pub remaining: Amount,
}

/// Settles pairwise debts against an external value transfer.
///
/// The owed lookup, the transfer and the ledger update run inside the group's
/// critical section, in that order. A failed transfer leaves the ledger as it
/// was; the ledger is never decremented before the transfer returned `Ok`.
#[derive(Debug)]
pub struct SettlementProcessor<D, T> {
    directory: D,
    transfer: T,
    ledgers: Arc<LedgerBook>,
}

impl<D, T> SettlementProcessor<D, T>
where
    D: MembershipDirectory,
    T: ValueTransfer,
{
    pub fn new(directory: D, transfer: T, ledgers: Arc<LedgerBook>) -> Self {
        Self {
            directory,
            transfer,
            ledgers,
        }
    }

    #[tracing::instrument(
        name = "settle_debt",
        skip_all,
        fields(
            group = %request.group,
            sender = %request.sender,
            receiver = %request.receiver,
            requested = %request.amount
        )
    )]
    pub fn settle(&self, request: &SettlementRequest) -> LedgerResult<SettlementReceipt> {
        if !self.directory.group_exists(&request.group) {
            return Err(LedgerError::NoSuchGroup(request.group.clone()));
        }
        if request.sender == request.receiver {
            return Err(LedgerError::SelfSettlement(request.sender.clone()));
        }
        ensure_positive(request.amount, "settlement amount")?;

        let (settled, remaining) = self.ledgers.with_group(&request.group, |ledger| {
            let owed = ledger.owed(&request.sender, &request.receiver);
            if owed == 0 {
                return Err(LedgerError::no_such_debt(&request.sender, &request.receiver));
            }
            let capped = request.amount.min(owed);

            if let Err(err) = self.transfer.transfer(&request.sender, &request.receiver, capped) {
                tracing::warn!(amount = %capped, error = %err, "value transfer failed; ledger untouched");
                return Err(LedgerError::transfer_failed(err.to_string()));
            }

            let settled = ledger.settle(&request.sender, &request.receiver, capped)?;
            Ok((settled, ledger.owed(&request.sender, &request.receiver)))
        })?;

        tracing::info!(settled = %settled, remaining = %remaining, "debt settled");

        Ok(SettlementReceipt {
            group: request.group.clone(),
            sender: request.sender.clone(),
            receiver: request.receiver.clone(),
            requested: request.amount,
            settled,
            remaining,
        })
    }
}
