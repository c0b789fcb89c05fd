use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use splitledger_core::{Amount, GroupId, LedgerError, LedgerResult, MemberId, ValueObject, ensure_positive};

/// Directed, netted amount one member owes another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseDebt {
    pub debtor: MemberId,
    pub creditor: MemberId,
    pub amount: Amount,
}

impl ValueObject for PairwiseDebt {}

/// What a single `record_obligation` did to the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Netting {
    /// Amount absorbed by an opposing debt (creditor -> debtor).
    pub offset: Amount,
    /// Amount added to the debtor -> creditor debt.
    pub forward: Amount,
}

impl ValueObject for Netting {}

/// Aggregate position of one member inside a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    pub member: MemberId,
    /// Sum of debts other members owe to this member.
    pub receivable: Amount,
    /// Sum of debts this member owes to others.
    pub payable: Amount,
}

impl ValueObject for MemberBalance {}

impl MemberBalance {
    /// Receivable minus payable; positive means the member is owed money.
    pub fn net(&self) -> i128 {
        let receivable = i128::try_from(self.receivable).unwrap_or(i128::MAX);
        let payable = i128::try_from(self.payable).unwrap_or(i128::MAX);
        receivable.saturating_sub(payable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct DebtKey {
    debtor: MemberId,
    creditor: MemberId,
}

impl DebtKey {
    fn new(debtor: &MemberId, creditor: &MemberId) -> Self {
        Self {
            debtor: debtor.clone(),
            creditor: creditor.clone(),
        }
    }
}

/// Netted pairwise obligations of one group.
///
/// Invariants:
/// - only positive amounts are stored (absence == zero)
/// - for any pair at most one direction is present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebtLedger {
    group: GroupId,
    debts: BTreeMap<DebtKey, Amount>,
}

impl DebtLedger {
    pub fn new(group: GroupId) -> Self {
        Self {
            group,
            debts: BTreeMap::new(),
        }
    }

    pub fn group(&self) -> &GroupId {
        &self.group
    }

    /// Number of stored (nonzero) debts.
    pub fn len(&self) -> usize {
        self.debts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }

    /// Amount `debtor` owes `creditor`; zero when absent.
    pub fn owed(&self, debtor: &MemberId, creditor: &MemberId) -> Amount {
        self.debts
            .get(&DebtKey::new(debtor, creditor))
            .copied()
            .unwrap_or(0)
    }

    /// Record that `debtor` owes `creditor` a further `amount`, netting it
    /// against any debt in the opposite direction first.
    ///
    /// State is untouched when an error is returned.
    pub fn record_obligation(
        &mut self,
        debtor: &MemberId,
        creditor: &MemberId,
        amount: Amount,
    ) -> LedgerResult<Netting> {
        if debtor == creditor {
            return Err(LedgerError::SelfObligation(debtor.clone()));
        }
        ensure_positive(amount, "obligation amount")?;

        let reverse = self.owed(creditor, debtor);
        let offset = amount.min(reverse);
        let forward = amount - offset;

        // Compute the new forward total before touching anything.
        let forward_total = if forward > 0 {
            let current = self.owed(debtor, creditor);
            Some(current.checked_add(forward).ok_or_else(|| {
                LedgerError::invalid_amount(format!("debt of {debtor} to {creditor} overflows"))
            })?)
        } else {
            None
        };

        if offset > 0 {
            self.reduce(DebtKey::new(creditor, debtor), offset);
        }
        if let Some(total) = forward_total {
            self.debts.insert(DebtKey::new(debtor, creditor), total);
        }

        Ok(Netting { offset, forward })
    }

    /// Reduce the debt `payer` owes `receiver` by up to `requested`.
    ///
    /// Returns the amount actually settled, capped at what is owed. Callers
    /// must only invoke this once the matching value transfer succeeded.
    pub fn settle(
        &mut self,
        payer: &MemberId,
        receiver: &MemberId,
        requested: Amount,
    ) -> LedgerResult<Amount> {
        ensure_positive(requested, "settlement amount")?;

        let owed = self.owed(payer, receiver);
        if owed == 0 {
            return Err(LedgerError::no_such_debt(payer, receiver));
        }

        let settled = requested.min(owed);
        self.reduce(DebtKey::new(payer, receiver), settled);

        Ok(settled)
    }

    /// All debts, ordered by (debtor, creditor).
    pub fn debts(&self) -> Vec<PairwiseDebt> {
        self.debts
            .iter()
            .map(|(key, amount)| PairwiseDebt {
                debtor: key.debtor.clone(),
                creditor: key.creditor.clone(),
                amount: *amount,
            })
            .collect()
    }

    /// Debts owed by `member`.
    pub fn debts_of(&self, member: &MemberId) -> Vec<PairwiseDebt> {
        self.debts()
            .into_iter()
            .filter(|d| &d.debtor == member)
            .collect()
    }

    /// Debts owed to `member`.
    pub fn credits_of(&self, member: &MemberId) -> Vec<PairwiseDebt> {
        self.debts()
            .into_iter()
            .filter(|d| &d.creditor == member)
            .collect()
    }

    pub fn balance_of(&self, member: &MemberId) -> MemberBalance {
        let mut balance = MemberBalance {
            member: member.clone(),
            receivable: 0,
            payable: 0,
        };

        for (key, amount) in &self.debts {
            if &key.creditor == member {
                balance.receivable = balance.receivable.saturating_add(*amount);
            } else if &key.debtor == member {
                balance.payable = balance.payable.saturating_add(*amount);
            }
        }

        balance
    }

    /// True when no zero entries are stored and no pair has debts in both
    /// directions.
    pub fn is_netted(&self) -> bool {
        self.debts.iter().all(|(key, amount)| {
            *amount > 0
                && key.debtor != key.creditor
                && !self
                    .debts
                    .contains_key(&DebtKey::new(&key.creditor, &key.debtor))
        })
    }

    fn reduce(&mut self, key: DebtKey, by: Amount) {
        if let Some(current) = self.debts.get_mut(&key) {
            *current -= by;
            if *current == 0 {
                self.debts.remove(&key);
            }
        }
    }
}
