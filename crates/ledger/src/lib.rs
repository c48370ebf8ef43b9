//! Velocity Ledger - append-only record of accepted loads
//!
//! The ledger is the source of truth for the velocity limits. It is
//! write-once, read-many: entries are appended on acceptance and only ever
//! read back through the two aggregate queries.
//!
//! ## Backends
//!
//! - [`MemoryLedger`] - process-local, for tests and single-shot batches
//! - [`SqliteLedger`] - durable, backed by an `sqlx` SQLite pool

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;
pub use store::LedgerStore;
