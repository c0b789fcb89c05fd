//! Expense intake: validate, split, record obligations toward the payer.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use splitledger_core::{Amount, GroupId, LedgerError, LedgerResult, MemberId, ensure_positive};
use splitledger_ledger::LedgerBook;
use splitledger_splits::{Shares, SplitMethod, compute_shares};

use crate::ports::{Clock, MembershipDirectory};

/// A shared expense submitted by an already-authorized caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRequest {
    pub group: GroupId,
    /// Smallest unit of account; must be positive.
    pub amount: Amount,
    pub description: String,
    /// When the expense happened; must not be after processing time.
    pub date: DateTime<Utc>,
    pub payer: MemberId,
    pub method: SplitMethod,
    pub debtors: Vec<MemberId>,
    /// Method-specific values, one per debtor (empty for equal splits).
    pub params: Vec<Amount>,
}

/// Outcome of an accepted expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseReceipt {
    pub group: GroupId,
    pub payer: MemberId,
    pub amount: Amount,
    pub shares: Shares,
    /// Obligations actually written (zero shares and the payer's own share
    /// are skipped).
    pub recorded: usize,
}

/// Turns expenses into pairwise obligations.
///
/// All validation happens before the group's ledger is touched, and the
/// obligations of one expense are applied to a staged copy that replaces the
/// ledger only when every obligation succeeded.
#[derive(Debug)]
pub struct ExpenseProcessor<D, C> {
    directory: D,
    clock: C,
    ledgers: Arc<LedgerBook>,
    future_date_tolerance: Duration,
}

impl<D, C> ExpenseProcessor<D, C>
where
    D: MembershipDirectory,
    C: Clock,
{
    pub fn new(directory: D, clock: C, ledgers: Arc<LedgerBook>) -> Self {
        Self {
            directory,
            clock,
            ledgers,
            future_date_tolerance: Duration::zero(),
        }
    }

    /// Accept expense dates up to `tolerance` after the processing time.
    pub fn with_future_date_tolerance(mut self, tolerance: Duration) -> Self {
        self.future_date_tolerance = tolerance;
        self
    }

    #[tracing::instrument(
        name = "process_expense",
        skip_all,
        fields(group = %request.group, payer = %request.payer, amount = %request.amount)
    )]
    pub fn process(&self, request: &ExpenseRequest) -> LedgerResult<ExpenseReceipt> {
        self.validate(request)?;

        let shares = compute_shares(
            request.amount,
            &request.debtors,
            request.method,
            &request.params,
        )?;

        let recorded = self.ledgers.with_group(&request.group, |ledger| {
            let mut staged = ledger.clone();
            let mut recorded = 0usize;

            for share in shares.iter() {
                if share.amount == 0 || share.member == request.payer {
                    continue;
                }
                let netting = staged.record_obligation(&share.member, &request.payer, share.amount)?;
                tracing::debug!(
                    debtor = %share.member,
                    share = %share.amount,
                    offset = %netting.offset,
                    forward = %netting.forward,
                    "obligation recorded"
                );
                recorded += 1;
            }

            *ledger = staged;
            Ok(recorded)
        })?;

        tracing::info!(
            method = ?request.method,
            debtors = request.debtors.len(),
            recorded,
            "expense recorded"
        );

        Ok(ExpenseReceipt {
            group: request.group.clone(),
            payer: request.payer.clone(),
            amount: request.amount,
            shares,
            recorded,
        })
    }

    fn validate(&self, request: &ExpenseRequest) -> LedgerResult<()> {
        ensure_positive(request.amount, "expense amount")?;

        let now = self.clock.now();
        // A tolerance reaching past the representable range imposes no bound.
        let latest = now.checked_add_signed(self.future_date_tolerance);
        if latest.is_some_and(|latest| request.date > latest) {
            return Err(LedgerError::FutureDate {
                date: request.date,
                now,
            });
        }

        if !self.directory.group_exists(&request.group) {
            return Err(LedgerError::NoSuchGroup(request.group.clone()));
        }
        if !self.directory.is_member(&request.group, &request.payer) {
            return Err(LedgerError::not_a_member(&request.group, &request.payer));
        }

        if request.debtors.is_empty() {
            return Err(LedgerError::EmptyDebtorSet);
        }
        if let Some(outsider) = request
            .debtors
            .iter()
            .find(|d| !self.directory.is_member(&request.group, d))
        {
            return Err(LedgerError::not_a_member(&request.group, outsider));
        }

        Ok(())
    }
}
