use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use splitledger_core::{Amount, LedgerError, LedgerResult, MemberId, ValueObject, ensure_positive};

/// Policy for dividing an expense among its debtors.
///
/// Wire codes: `0` = Equal, `1` = Exact, `2` = Percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMethod {
    /// Same share for everyone; remainder units go to the earliest debtors.
    Equal,
    /// Explicit per-debtor amounts that must add up to the expense amount.
    Exact,
    /// Per-debtor percentages that must add up to 100.
    Percentage,
}

impl SplitMethod {
    pub fn code(self) -> u8 {
        match self {
            SplitMethod::Equal => 0,
            SplitMethod::Exact => 1,
            SplitMethod::Percentage => 2,
        }
    }
}

impl TryFrom<u8> for SplitMethod {
    type Error = LedgerError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(SplitMethod::Equal),
            1 => Ok(SplitMethod::Exact),
            2 => Ok(SplitMethod::Percentage),
            other => Err(LedgerError::UnknownSplitMethod(other)),
        }
    }
}

/// One debtor's part of an expense. May be zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub member: MemberId,
    pub amount: Amount,
}

impl ValueObject for Share {}

/// Computed shares, in debtor input order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shares(Vec<Share>);

impl ValueObject for Shares {}

impl Shares {
    pub fn iter(&self) -> impl Iterator<Item = &Share> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Share of `member`, if it is one of the debtors.
    pub fn get(&self, member: &MemberId) -> Option<Amount> {
        self.0.iter().find(|s| &s.member == member).map(|s| s.amount)
    }

    /// Sum of all shares. Always equals the expense amount.
    pub fn total(&self) -> Amount {
        self.0.iter().map(|s| s.amount).sum()
    }
}

impl IntoIterator for Shares {
    type Item = Share;
    type IntoIter = std::vec::IntoIter<Share>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Divide `amount` among `debtors` according to `method`.
///
/// `params` is method-specific: empty for Equal, amounts for Exact,
/// percentages for Percentage (one per debtor, same order).
///
/// The returned shares always sum to `amount` exactly.
pub fn compute_shares(
    amount: Amount,
    debtors: &[MemberId],
    method: SplitMethod,
    params: &[Amount],
) -> LedgerResult<Shares> {
    ensure_positive(amount, "expense amount")?;
    ensure_distinct(debtors)?;

    let amounts = match method {
        SplitMethod::Equal => split_equal(amount, debtors.len(), params)?,
        SplitMethod::Exact => split_exact(amount, debtors.len(), params)?,
        SplitMethod::Percentage => split_percentage(amount, debtors.len(), params)?,
    };

    let shares = Shares(
        debtors
            .iter()
            .cloned()
            .zip(amounts)
            .map(|(member, amount)| Share { member, amount })
            .collect(),
    );
    debug_assert_eq!(shares.total(), amount);

    Ok(shares)
}

fn ensure_distinct(debtors: &[MemberId]) -> LedgerResult<()> {
    if debtors.is_empty() {
        return Err(LedgerError::invalid_split("debtor list is empty"));
    }

    let mut seen = HashSet::with_capacity(debtors.len());
    for debtor in debtors {
        if !seen.insert(debtor) {
            return Err(LedgerError::invalid_split(format!("duplicate debtor {debtor}")));
        }
    }

    Ok(())
}

fn ensure_param_count(count: usize, params: &[Amount]) -> LedgerResult<()> {
    if params.len() != count {
        return Err(LedgerError::invalid_split(format!(
            "expected {count} split values, got {}",
            params.len()
        )));
    }
    Ok(())
}

/// Hand out `remainder` single units to the first debtors. Caller guarantees
/// `remainder < shares.len()`.
fn spread_remainder(shares: &mut [Amount], remainder: Amount) {
    for (idx, share) in shares.iter_mut().enumerate() {
        if (idx as Amount) < remainder {
            *share += 1;
        }
    }
}

fn split_equal(amount: Amount, count: usize, params: &[Amount]) -> LedgerResult<Vec<Amount>> {
    if !params.is_empty() {
        return Err(LedgerError::invalid_split("equal split takes no split values"));
    }

    let n = count as Amount;
    let mut shares = vec![amount / n; count];
    spread_remainder(&mut shares, amount % n);

    Ok(shares)
}

fn split_exact(amount: Amount, count: usize, params: &[Amount]) -> LedgerResult<Vec<Amount>> {
    ensure_param_count(count, params)?;

    let mut sum: Amount = 0;
    for value in params {
        if *value == 0 {
            return Err(LedgerError::invalid_split("exact split values must be positive"));
        }
        sum = sum
            .checked_add(*value)
            .ok_or_else(|| LedgerError::invalid_split("exact split values overflow"))?;
    }

    if sum != amount {
        return Err(LedgerError::invalid_split(format!(
            "exact split values sum to {sum}, expected {amount}"
        )));
    }

    Ok(params.to_vec())
}

fn split_percentage(amount: Amount, count: usize, params: &[Amount]) -> LedgerResult<Vec<Amount>> {
    ensure_param_count(count, params)?;

    if let Some(pct) = params.iter().find(|p| **p > 100) {
        return Err(LedgerError::invalid_split(format!("percentage {pct} exceeds 100")));
    }
    let total_pct: Amount = params.iter().sum();
    if total_pct != 100 {
        return Err(LedgerError::invalid_split(format!(
            "percentages sum to {total_pct}, expected 100"
        )));
    }

    // floor(amount * pct / 100) without forming amount * pct.
    let mut shares: Vec<Amount> = params
        .iter()
        .map(|pct| (amount / 100) * pct + (amount % 100) * pct / 100)
        .collect();
    let floored: Amount = shares.iter().sum();
    spread_remainder(&mut shares, amount - floored);

    Ok(shares)
}
