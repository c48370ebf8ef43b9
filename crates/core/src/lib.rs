//! Velocity Core - Domain types
//!
//! This crate contains the types shared by the ledger and the engine:
//! - `Attempt`: one fund-load request, already parsed by the caller
//! - `Decision`: the accept/decline outcome for one attempt
//! - `LedgerEntry`: an accepted attempt as persisted in the ledger
//! - `CalendarDay` / `IsoWeek`: the aggregation keys derived from a timestamp

pub mod attempt;
pub mod calendar;
pub mod entry;

pub use attempt::{Attempt, Decision};
pub use calendar::{CalendarDay, IsoWeek};
pub use entry::{DailyAggregate, LedgerEntry, WeeklyAggregate};
