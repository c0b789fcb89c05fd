//! Value object trait: equality by value, not identity.
//!
//! Shares, pairwise debts and netting outcomes are value objects: two of them
//! with the same fields describe the same fact.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. To "modify" one,
/// build a new one.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Share {
///     member: MemberId,
///     amount: Amount,
/// }
///
/// impl ValueObject for Share {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
