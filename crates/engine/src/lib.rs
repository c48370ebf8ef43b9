//! Velocity Engine - per-customer load limits
//!
//! Decides accept/decline for each fund-load attempt and extends the ledger
//! on acceptance.
//!
//! ## Flow (per attempt)
//!
//! ```text
//! Attempt ──► daily aggregate ──► DAILY_AMOUNT_LIMIT ──► DAILY_COUNT_LIMIT
//!                                                              │
//!   Decision ◄── append entry ◄── WEEKLY_AMOUNT_LIMIT ◄── weekly aggregate
//! ```
//!
//! The first failing rule declines and nothing is written. Attempts for the
//! same customer are serialized, so the aggregate read and the append act
//! as one step even when the engine is shared across tasks.
//!
//! ## Key Components
//!
//! - [`config::VelocityConfig`] - Limits (defaults 5000/day, 3 loads/day, 20000/week)
//! - [`rules::LimitRule`] - The three limit rules, in evaluation order
//! - [`locks::CustomerLocks`] - Per-customer async mutexes, pruned when released
//! - [`engine::VelocityEngine`] - Main orchestrator

pub mod config;
pub mod engine;
pub mod error;
pub mod locks;
pub mod rules;

pub use config::{ConfigError, DuplicatePolicy, VelocityConfig};
pub use engine::VelocityEngine;
pub use error::{EvalError, EvalResult};
pub use locks::{CustomerGuard, CustomerLocks};
pub use rules::{LimitRule, Verdict};
