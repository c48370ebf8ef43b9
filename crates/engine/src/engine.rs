//! Velocity Engine - Main orchestrator
//!
//! Reads the customer's aggregates, applies the limit rules in order and
//! appends accepted attempts to the ledger.

use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::time::Instant;
use velocity_core::{Attempt, Decision, LedgerEntry};
use velocity_ledger::LedgerStore;

use crate::config::{ConfigError, DuplicatePolicy, VelocityConfig};
use crate::error::{EvalError, EvalResult};
use crate::locks::CustomerLocks;
use crate::rules::{LimitRule, Verdict};

/// Main Velocity Engine
///
/// The store is injected and its lifecycle belongs to the caller. The
/// engine is `Send + Sync`; share it behind an `Arc` to evaluate from
/// several tasks at once.
pub struct VelocityEngine {
    /// Limits
    config: VelocityConfig,
    /// Ledger of accepted attempts
    store: Arc<dyn LedgerStore>,
    /// One async mutex per customer
    locks: CustomerLocks,
}

impl VelocityEngine {
    /// Create a new engine, rejecting limits that fail validation
    pub fn new(config: VelocityConfig, store: Arc<dyn LedgerStore>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, store))
    }

    /// Create an engine with the default limits
    pub fn with_defaults(store: Arc<dyn LedgerStore>) -> Self {
        Self::build(VelocityConfig::default(), store)
    }

    fn build(config: VelocityConfig, store: Arc<dyn LedgerStore>) -> Self {
        Self {
            config,
            store,
            locks: CustomerLocks::new(),
        }
    }

    /// Evaluate a batch in order, one decision per attempt.
    ///
    /// Earlier acceptances in the batch count toward later attempts. The
    /// first ledger failure aborts the batch and no decisions are returned.
    pub async fn evaluate(&self, attempts: &[Attempt]) -> EvalResult<Vec<Decision>> {
        self.run(attempts, None).await
    }

    /// Like [`VelocityEngine::evaluate`], but stops once `deadline` has passed.
    ///
    /// The deadline is checked before each attempt, so an attempt that has
    /// started always completes. Stopping early yields
    /// [`EvalError::Cancelled`] holding the decisions made so far.
    pub async fn evaluate_until(
        &self,
        attempts: &[Attempt],
        deadline: Instant,
    ) -> EvalResult<Vec<Decision>> {
        self.run(attempts, Some(deadline)).await
    }

    /// Evaluate a single attempt
    pub async fn evaluate_one(&self, attempt: &Attempt) -> EvalResult<Decision> {
        let verdict = self.check(attempt).await?;
        Ok(if verdict.is_accepted() {
            attempt.accept()
        } else {
            attempt.decline()
        })
    }

    /// Evaluate a single attempt and report which rule, if any, declined it
    pub async fn check(&self, attempt: &Attempt) -> EvalResult<Verdict> {
        let _guard = self.locks.acquire(attempt.customer_id).await;
        let verdict = self.check_locked(attempt).await?;

        tracing::debug!(
            attempt_id = attempt.id,
            customer_id = attempt.customer_id,
            rule = verdict.rule().map(|r| r.code()),
            verdict = ?verdict,
            "Attempt evaluated"
        );

        Ok(verdict)
    }

    /// Get the current configuration
    pub fn config(&self) -> &VelocityConfig {
        &self.config
    }

    /// Get the ledger store
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    async fn run(
        &self,
        attempts: &[Attempt],
        deadline: Option<Instant>,
    ) -> EvalResult<Vec<Decision>> {
        let mut decisions = Vec::with_capacity(attempts.len());

        for attempt in attempts {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::warn!(
                    decided = decisions.len(),
                    remaining = attempts.len() - decisions.len(),
                    "Deadline passed, batch cancelled"
                );
                return Err(EvalError::Cancelled { decisions });
            }

            match self.evaluate_one(attempt).await {
                Ok(decision) => decisions.push(decision),
                Err(e) => {
                    tracing::error!(
                        attempt_id = attempt.id,
                        customer_id = attempt.customer_id,
                        decided = decisions.len(),
                        error = %e,
                        "Ledger failure, batch aborted"
                    );
                    return Err(e);
                }
            }
        }

        let accepted = decisions.iter().filter(|d| d.accepted).count();
        tracing::info!(
            attempts = decisions.len(),
            accepted,
            declined = decisions.len() - accepted,
            "Batch evaluated"
        );

        Ok(decisions)
    }

    /// Rules and append. Caller holds the customer's lock.
    async fn check_locked(&self, attempt: &Attempt) -> EvalResult<Verdict> {
        if self.config.duplicate_policy == DuplicatePolicy::Skip
            && self
                .store
                .contains_attempt(attempt.customer_id, attempt.id)
                .await?
        {
            return Ok(Verdict::AlreadyRecorded);
        }

        let daily = self
            .store
            .daily_aggregate(attempt.customer_id, attempt.day())
            .await?;

        if exceeds(attempt.load_amount, daily.total_amount, self.config.daily_amount_limit) {
            return Ok(Verdict::Declined(LimitRule::DailyAmount));
        }

        if daily.count >= self.config.daily_load_limit {
            return Ok(Verdict::Declined(LimitRule::DailyCount));
        }

        let weekly = self
            .store
            .weekly_aggregate(attempt.customer_id, attempt.week())
            .await?;

        if exceeds(attempt.load_amount, weekly.total_amount, self.config.weekly_amount_limit) {
            return Ok(Verdict::Declined(LimitRule::WeeklyAmount));
        }

        self.store.append(&LedgerEntry::from_attempt(attempt)).await?;
        Ok(Verdict::Accepted)
    }
}

/// Overflowing the decimal range counts as over the limit
fn exceeds(amount: Decimal, total: Decimal, limit: Decimal) -> bool {
    amount.checked_add(total).map_or(true, |sum| sum > limit)
}
