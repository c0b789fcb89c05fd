use chrono::{DateTime, Utc};

use splitledger_core::GroupId;

/// A ledger notification.
///
/// Every event describes one committed change inside exactly one group; the
/// envelope takes its routing key from [`Event::group_id`].
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable name, e.g. "ledger.expense.recorded".
    fn event_type(&self) -> &'static str;

    /// Payload schema version; bump on incompatible changes.
    fn version(&self) -> u32;

    fn group_id(&self) -> &GroupId;

    fn occurred_at(&self) -> DateTime<Utc>;
}
