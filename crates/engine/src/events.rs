//! Notifications emitted after ledger changes are committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{Amount, GroupId, MemberId};
use splitledger_events::Event;
use splitledger_splits::{Shares, SplitMethod};

/// Event: an expense was accepted and its obligations recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecorded {
    pub group: GroupId,
    pub payer: MemberId,
    pub amount: Amount,
    pub description: String,
    pub method: SplitMethod,
    pub shares: Shares,
    /// Expense date as submitted.
    pub occurred_at: DateTime<Utc>,
}

/// Event: a debt was (partially) settled after a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtSettled {
    pub group: GroupId,
    pub sender: MemberId,
    pub receiver: MemberId,
    pub settled: Amount,
    pub remaining: Amount,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    ExpenseRecorded(ExpenseRecorded),
    DebtSettled(DebtSettled),
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::ExpenseRecorded(_) => "ledger.expense.recorded",
            LedgerEvent::DebtSettled(_) => "ledger.debt.settled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn group_id(&self) -> &GroupId {
        match self {
            LedgerEvent::ExpenseRecorded(e) => &e.group,
            LedgerEvent::DebtSettled(e) => &e.group,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::ExpenseRecorded(e) => e.occurred_at,
            LedgerEvent::DebtSettled(e) => e.occurred_at,
        }
    }
}
