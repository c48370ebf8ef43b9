//! The ledger store interface

use async_trait::async_trait;
use velocity_core::{CalendarDay, DailyAggregate, IsoWeek, LedgerEntry, WeeklyAggregate};

use crate::error::StoreResult;

/// Storage and aggregate lookup for accepted loads.
///
/// Aggregates for a customer with no matching entries are zero, never an
/// error. There is deliberately no update or delete.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Sum and count of the customer's entries on `day`
    async fn daily_aggregate(&self, customer_id: u64, day: CalendarDay)
        -> StoreResult<DailyAggregate>;

    /// Sum of the customer's entries in `week`
    async fn weekly_aggregate(&self, customer_id: u64, week: IsoWeek)
        -> StoreResult<WeeklyAggregate>;

    /// Persist one entry
    async fn append(&self, entry: &LedgerEntry) -> StoreResult<()>;

    /// Whether an entry for this customer and attempt id was already recorded
    async fn contains_attempt(&self, customer_id: u64, attempt_id: u64) -> StoreResult<bool>;
}
