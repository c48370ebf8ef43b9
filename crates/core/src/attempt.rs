//! Load attempts and their decisions

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarDay, IsoWeek};

/// A request to load funds into a customer account.
///
/// Ids are assigned by the caller and are not checked for uniqueness.
/// `occurred_at` keeps the offset it was recorded with; the calendar keys
/// are derived in that offset, never in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: u64,
    pub customer_id: u64,
    pub load_amount: Decimal,
    pub occurred_at: DateTime<FixedOffset>,
}

impl Attempt {
    pub fn new(
        id: u64,
        customer_id: u64,
        load_amount: Decimal,
        occurred_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id,
            customer_id,
            load_amount,
            occurred_at,
        }
    }

    /// Calendar day the attempt falls on
    pub fn day(&self) -> CalendarDay {
        CalendarDay::of(&self.occurred_at)
    }

    /// ISO-8601 week the attempt falls in
    pub fn week(&self) -> IsoWeek {
        IsoWeek::of(&self.occurred_at)
    }

    /// Accepting decision for this attempt
    pub fn accept(&self) -> Decision {
        Decision::new(self.id, self.customer_id, true)
    }

    /// Declining decision for this attempt
    pub fn decline(&self) -> Decision {
        Decision::new(self.id, self.customer_id, false)
    }
}

/// Outcome for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decision {
    pub id: u64,
    pub customer_id: u64,
    pub accepted: bool,
}

impl Decision {
    pub fn new(id: u64, customer_id: u64, accepted: bool) -> Self {
        Self {
            id,
            customer_id,
            accepted,
        }
    }
}
