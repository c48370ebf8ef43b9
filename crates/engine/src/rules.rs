//! Limit rules and per-attempt verdicts

use std::fmt;

/// A velocity limit, in the order the engine checks them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitRule {
    /// Amount loaded on one calendar day
    DailyAmount,
    /// Number of loads on one calendar day
    DailyCount,
    /// Amount loaded in one ISO week
    WeeklyAmount,
}

impl LimitRule {
    /// Stable rule code for logs
    pub fn code(&self) -> &'static str {
        match self {
            LimitRule::DailyAmount => "DAILY_AMOUNT_LIMIT",
            LimitRule::DailyCount => "DAILY_COUNT_LIMIT",
            LimitRule::WeeklyAmount => "WEEKLY_AMOUNT_LIMIT",
        }
    }
}

impl fmt::Display for LimitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of checking one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// All limits passed and the entry was appended
    Accepted,
    /// Declined by the first rule that failed
    Declined(LimitRule),
    /// Already in the ledger; reported as accepted without a new entry
    AlreadyRecorded,
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Verdict::Declined(_))
    }

    /// The rule that declined, if any
    pub fn rule(&self) -> Option<LimitRule> {
        match self {
            Verdict::Declined(rule) => Some(*rule),
            _ => None,
        }
    }
}
