//! Engine facade: the operations exposed to whatever surface wraps the ledger.

use std::sync::Arc;

use chrono::Duration;

use splitledger_core::{Amount, GroupId, LedgerResult, MemberId};
use splitledger_events::{EventBus, EventEnvelope, Subscription};
use splitledger_ledger::{LedgerBook, MemberBalance, PairwiseDebt};

use crate::events::{DebtSettled, ExpenseRecorded, LedgerEvent};
use crate::expense::{ExpenseProcessor, ExpenseReceipt, ExpenseRequest};
use crate::ports::{Clock, MembershipDirectory, ValueTransfer};
use crate::publisher::EventPublisher;
use crate::settlement::{SettlementProcessor, SettlementRequest};

/// Tunables for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// How far after the processing time an expense date may lie.
    pub future_date_tolerance: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            future_date_tolerance: Duration::zero(),
        }
    }
}

/// Shared-expense ledger engine.
///
/// - `D`: membership directory
/// - `T`: value transfer used for settlements
/// - `C`: clock
/// - `B`: bus receiving [`LedgerEvent`] envelopes after each committed change
///
/// All operations are synchronous and either fully apply or leave the
/// ledger unchanged.
pub struct LedgerEngine<D, T, C, B> {
    expenses: ExpenseProcessor<Arc<D>, Arc<C>>,
    settlements: SettlementProcessor<Arc<D>, T>,
    clock: Arc<C>,
    ledgers: Arc<LedgerBook>,
    publisher: EventPublisher<B>,
}

impl<D, T, C, B> LedgerEngine<D, T, C, B>
where
    D: MembershipDirectory,
    T: ValueTransfer,
    C: Clock,
    B: EventBus<EventEnvelope<LedgerEvent>>,
{
    pub fn new(directory: Arc<D>, transfer: T, clock: Arc<C>, bus: B, settings: EngineSettings) -> Self {
        let ledgers = Arc::new(LedgerBook::new());

        Self {
            expenses: ExpenseProcessor::new(directory.clone(), clock.clone(), ledgers.clone())
                .with_future_date_tolerance(settings.future_date_tolerance),
            settlements: SettlementProcessor::new(directory, transfer, ledgers.clone()),
            clock,
            ledgers,
            publisher: EventPublisher::new(bus),
        }
    }

    /// Validate an expense, split it and record one obligation per debtor
    /// toward the payer.
    pub fn process_expense(&self, request: &ExpenseRequest) -> LedgerResult<ExpenseReceipt> {
        let receipt = self.expenses.process(request)?;

        self.publisher.publish(LedgerEvent::ExpenseRecorded(ExpenseRecorded {
            group: receipt.group.clone(),
            payer: receipt.payer.clone(),
            amount: receipt.amount,
            description: request.description.clone(),
            method: request.method,
            shares: receipt.shares.clone(),
            occurred_at: request.date,
        }));

        Ok(receipt)
    }

    /// Pay down what `sender` owes `receiver`, capped at the owed amount.
    ///
    /// Returns the amount actually settled.
    pub fn settle_debt(
        &self,
        group: &GroupId,
        sender: &MemberId,
        receiver: &MemberId,
        amount: Amount,
    ) -> LedgerResult<Amount> {
        let receipt = self.settlements.settle(&SettlementRequest {
            group: group.clone(),
            sender: sender.clone(),
            receiver: receiver.clone(),
            amount,
        })?;

        self.publisher.publish(LedgerEvent::DebtSettled(DebtSettled {
            group: receipt.group,
            sender: receipt.sender,
            receiver: receipt.receiver,
            settled: receipt.settled,
            remaining: receipt.remaining,
            occurred_at: self.clock.now(),
        }));

        Ok(receipt.settled)
    }

    /// Amount `debtor` owes `creditor` in `group` (zero when absent).
    pub fn query_owed(&self, group: &GroupId, debtor: &MemberId, creditor: &MemberId) -> LedgerResult<Amount> {
        self.ledgers.query_owed(group, debtor, creditor)
    }

    /// Every outstanding debt of `group`, ordered by (debtor, creditor).
    pub fn debts(&self, group: &GroupId) -> LedgerResult<Vec<PairwiseDebt>> {
        Ok(self.ledgers.snapshot(group)?.debts())
    }

    pub fn balance_of(&self, group: &GroupId, member: &MemberId) -> LedgerResult<MemberBalance> {
        Ok(self.ledgers.snapshot(group)?.balance_of(member))
    }

    /// Subscribe to ledger events published from now on.
    pub fn subscribe(&self) -> Subscription<EventEnvelope<LedgerEvent>> {
        self.publisher.bus().subscribe()
    }
}
