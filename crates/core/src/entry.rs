//! Ledger entries and the aggregates computed over them

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::attempt::Attempt;
use crate::calendar::{CalendarDay, IsoWeek};

/// An accepted attempt, as stored in the ledger.
///
/// Written once at acceptance time and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub attempt_id: u64,
    pub customer_id: u64,
    pub load_amount: Decimal,
    pub occurred_at: DateTime<FixedOffset>,
    pub iso_year: i32,
    pub iso_week: u32,
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl LedgerEntry {
    /// Build the entry for an accepted attempt
    pub fn from_attempt(attempt: &Attempt) -> Self {
        let day = attempt.day();
        let week = attempt.week();
        Self {
            attempt_id: attempt.id,
            customer_id: attempt.customer_id,
            load_amount: attempt.load_amount,
            occurred_at: attempt.occurred_at,
            iso_year: week.iso_year,
            iso_week: week.iso_week,
            year: day.year,
            month: day.month,
            day: day.day,
        }
    }

    pub fn calendar_day(&self) -> CalendarDay {
        CalendarDay::new(self.year, self.month, self.day)
    }

    pub fn iso_week(&self) -> IsoWeek {
        IsoWeek::new(self.iso_year, self.iso_week)
    }
}

/// Sum and count of one customer's entries on one calendar day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyAggregate {
    pub total_amount: Decimal,
    pub count: u32,
}

impl DailyAggregate {
    /// Fold entries into an aggregate; `None` if the sum or count overflows
    pub fn from_amounts<I: IntoIterator<Item = Decimal>>(amounts: I) -> Option<Self> {
        amounts.into_iter().try_fold(Self::default(), |acc, amount| {
            Some(Self {
                total_amount: acc.total_amount.checked_add(amount)?,
                count: acc.count.checked_add(1)?,
            })
        })
    }
}

/// Sum of one customer's entries in one ISO week
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeeklyAggregate {
    pub total_amount: Decimal,
}

impl WeeklyAggregate {
    /// `None` if the sum overflows
    pub fn from_amounts<I: IntoIterator<Item = Decimal>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
            .map(|total_amount| Self { total_amount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_entry_from_attempt() {
        let at = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2000, 1, 1, 0, 0, 0)
            .unwrap();
        let attempt = Attempt::new(15887, 528, dec!(3318.47), at);

        let entry = LedgerEntry::from_attempt(&attempt);

        assert_eq!(entry.attempt_id, 15887);
        assert_eq!(entry.customer_id, 528);
        assert_eq!(entry.load_amount, dec!(3318.47));
        assert_eq!(entry.calendar_day(), CalendarDay::new(2000, 1, 1));
        assert_eq!(entry.iso_week(), IsoWeek::new(1999, 52));
    }

    #[test]
    fn test_empty_aggregates_are_zero() {
        assert_eq!(DailyAggregate::from_amounts(Vec::new()), Some(DailyAggregate::default()));
        assert_eq!(
            WeeklyAggregate::from_amounts(Vec::new()).map(|w| w.total_amount),
            Some(Decimal::ZERO)
        );
    }

    #[test]
    fn test_aggregates_sum_exactly() {
        let daily = DailyAggregate::from_amounts([dec!(0.1), dec!(0.2), dec!(4999.7)]).unwrap();
        assert_eq!(daily.total_amount, dec!(5000.0));
        assert_eq!(daily.count, 3);

        let weekly = WeeklyAggregate::from_amounts([dec!(5000), dec!(5000), dec!(0.01)]).unwrap();
        assert_eq!(weekly.total_amount, dec!(10000.01));
    }

    #[test]
    fn test_aggregates_report_overflow() {
        assert_eq!(DailyAggregate::from_amounts([Decimal::MAX, Decimal::MAX]), None);
        assert_eq!(WeeklyAggregate::from_amounts([Decimal::MAX, Decimal::ONE]), None);
        assert!(DailyAggregate::from_amounts([Decimal::MAX]).is_some());
    }
}
