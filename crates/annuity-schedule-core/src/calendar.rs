//! Calendar primitives and the business-day calendar used for payment dates.
//!
//! Dates are pure calendar dates (`chrono::NaiveDate`); there is no time of
//! day and no time zone, so a formatted date is the same everywhere.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::AnnuityError;
use crate::AnnuityResult;

/// ISO calendar date format used for all date strings (`YYYY-MM-DD`).
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Date arithmetic
// ---------------------------------------------------------------------------

/// Add calendar months, clamping the day to the end of the target month
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> AnnuityResult<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| AnnuityError::DateOutOfRange {
            context: format!("{date} + {months} months"),
        })
}

/// Add calendar days.
pub fn add_days(date: NaiveDate, days: u64) -> AnnuityResult<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| AnnuityError::DateOutOfRange {
            context: format!("{date} + {days} days"),
        })
}

/// Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in the calendar year: 366 for leap years, else 365.
pub fn year_length(year: i32) -> i64 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

pub fn parse_iso_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE_FORMAT)
}

// ---------------------------------------------------------------------------
// Holiday calendar
// ---------------------------------------------------------------------------

/// Non-business days: every Saturday and Sunday plus an explicit holiday set.
///
/// Serializes as a plain array of `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolidayCalendar {
    holidays: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    /// A calendar with weekends only.
    pub fn weekends_only() -> Self {
        Self::default()
    }

    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Build a calendar from `YYYY-MM-DD` strings, rejecting malformed entries.
    pub fn from_iso_strings<I, S>(values: I) -> AnnuityResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut holidays = BTreeSet::new();
        for value in values {
            let value = value.as_ref();
            let date = parse_iso_date(value).map_err(|e| AnnuityError::InvalidHoliday {
                value: value.to_string(),
                reason: e.to_string(),
            })?;
            holidays.insert(date);
        }
        Ok(Self { holidays })
    }

    pub fn len(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holidays.is_empty()
    }

    /// Holiday dates in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.holidays.iter().copied()
    }

    /// True if the date is in the explicit holiday set (weekends excluded).
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.is_holiday(date)
    }

    /// Roll forward one day at a time until a business day is reached.
    /// A date that is already a business day is returned unchanged.
    pub fn following(&self, date: NaiveDate) -> AnnuityResult<NaiveDate> {
        let mut adjusted = date;
        while !self.is_business_day(adjusted) {
            adjusted = adjusted
                .succ_opt()
                .ok_or_else(|| AnnuityError::DateOutOfRange {
                    context: format!("business-day adjustment of {date}"),
                })?;
        }
        Ok(adjusted)
    }
}

impl Extend<NaiveDate> for HolidayCalendar {
    fn extend<T: IntoIterator<Item = NaiveDate>>(&mut self, iter: T) {
        self.holidays.extend(iter);
    }
}
