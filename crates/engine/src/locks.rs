//! Per-customer serialization
//!
//! The aggregate read and the append for one attempt must not interleave
//! with another attempt for the same customer. Each customer gets its own
//! async mutex; different customers never contend. A customer's mutex is
//! dropped from the registry once nobody holds or waits on it. A waiter
//! cancelled mid-acquire leaves its entry behind until that customer's
//! next release.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<u64, Arc<AsyncMutex<()>>>;

/// Registry of per-customer async mutexes
#[derive(Debug, Default)]
pub struct CustomerLocks {
    locks: Mutex<LockMap>,
}

impl CustomerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one customer's ledger rows
    pub async fn acquire(&self, customer_id: u64) -> CustomerGuard<'_> {
        // Cloned under the map lock, so pruning never races a waiter
        let lock = Arc::clone(self.map().entry(customer_id).or_default());
        let guard = lock.lock_owned().await;

        CustomerGuard {
            locks: self,
            customer_id,
            guard: Some(guard),
        }
    }

    /// Number of customers currently holding or waiting on a lock
    pub fn customer_count(&self) -> usize {
        self.map().len()
    }

    fn map(&self) -> std::sync::MutexGuard<'_, LockMap> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self, customer_id: u64) {
        let mut locks = self.map();
        if locks
            .get(&customer_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&customer_id);
        }
    }
}

/// Exclusive access to one customer, released on drop
#[derive(Debug)]
pub struct CustomerGuard<'a> {
    locks: &'a CustomerLocks,
    customer_id: u64,
    guard: Option<OwnedMutexGuard<()>>,
}

impl CustomerGuard<'_> {
    pub fn customer_id(&self) -> u64 {
        self.customer_id
    }
}

impl Drop for CustomerGuard<'_> {
    fn drop(&mut self) {
        // Unlock first so our own reference no longer counts
        drop(self.guard.take());
        self.locks.release(self.customer_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_customer_waits() {
        let locks = CustomerLocks::new();

        let guard = locks.acquire(1).await;
        let second = tokio::time::timeout(Duration::from_millis(20), locks.acquire(1)).await;
        assert!(second.is_err());

        drop(guard);
        let second = tokio::time::timeout(Duration::from_millis(20), locks.acquire(1)).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn test_different_customers_do_not_contend() {
        let locks = CustomerLocks::new();

        let first = locks.acquire(1).await;
        let other = locks.acquire(2).await;

        assert_eq!(first.customer_id(), 1);
        assert_eq!(other.customer_id(), 2);
        assert_eq!(locks.customer_count(), 2);
    }

    #[tokio::test]
    async fn test_released_customers_are_forgotten() {
        let locks = CustomerLocks::new();

        for customer_id in 0..1_000 {
            let _guard = locks.acquire(customer_id).await;
            assert_eq!(locks.customer_count(), 1);
        }

        assert_eq!(locks.customer_count(), 0);
    }

    #[tokio::test]
    async fn test_waiter_keeps_lock_registered() {
        let locks = Arc::new(CustomerLocks::new());

        let guard = locks.acquire(7).await;
        let waiter = tokio::spawn({
            let locks = Arc::clone(&locks);
            async move {
                let _guard = locks.acquire(7).await;
            }
        });
        // Let the waiter reach the mutex
        tokio::time::sleep(Duration::from_millis(20)).await;

        drop(guard);
        // The waiter's clone keeps the same mutex in the registry
        assert_eq!(locks.customer_count(), 1);

        waiter.await.unwrap();
        assert_eq!(locks.customer_count(), 0);
    }
}
