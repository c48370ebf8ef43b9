//! Calendar keys for the daily and weekly aggregates
//!
//! Both keys are taken from the local date of the timestamp, in whatever
//! offset it carries.

use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A local calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CalendarDay {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDay {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    pub fn of<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
            day: at.day(),
        }
    }
}

impl fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// An ISO-8601 week: Monday start, week 1 holds the year's first Thursday.
///
/// `iso_year` may differ from the calendar year around New Year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IsoWeek {
    pub iso_year: i32,
    pub iso_week: u32,
}

impl IsoWeek {
    pub fn new(iso_year: i32, iso_week: u32) -> Self {
        Self { iso_year, iso_week }
    }

    pub fn of<Tz: TimeZone>(at: &DateTime<Tz>) -> Self {
        let week = at.iso_week();
        Self {
            iso_year: week.year(),
            iso_week: week.week(),
        }
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-W{:02}", self.iso_year, self.iso_week)
    }
}
