//! In-memory ledger

use async_trait::async_trait;
use std::sync::{PoisonError, RwLock};
use velocity_core::{CalendarDay, DailyAggregate, IsoWeek, LedgerEntry, WeeklyAggregate};

use crate::error::{StoreError, StoreResult};
use crate::store::LedgerStore;

/// Process-local ledger. Contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: RwLock<Vec<LedgerEntry>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Snapshot of all entries in append order
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.read().clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<LedgerEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn daily_aggregate(
        &self,
        customer_id: u64,
        day: CalendarDay,
    ) -> StoreResult<DailyAggregate> {
        let entries = self.read();
        DailyAggregate::from_amounts(
            entries
                .iter()
                .filter(|e| e.customer_id == customer_id && e.calendar_day() == day)
                .map(|e| e.load_amount),
        )
        .ok_or(StoreError::Overflow { customer_id })
    }

    async fn weekly_aggregate(
        &self,
        customer_id: u64,
        week: IsoWeek,
    ) -> StoreResult<WeeklyAggregate> {
        let entries = self.read();
        WeeklyAggregate::from_amounts(
            entries
                .iter()
                .filter(|e| e.customer_id == customer_id && e.iso_week() == week)
                .map(|e| e.load_amount),
        )
        .ok_or(StoreError::Overflow { customer_id })
    }

    async fn append(&self, entry: &LedgerEntry) -> StoreResult<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
        Ok(())
    }

    async fn contains_attempt(&self, customer_id: u64, attempt_id: u64) -> StoreResult<bool> {
        Ok(self
            .read()
            .iter()
            .any(|e| e.customer_id == customer_id && e.attempt_id == attempt_id))
    }
}
