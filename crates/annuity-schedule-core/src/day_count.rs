//! Actual/actual interest accrual on whole minor units.
//!
//! Interest over `[from, to)` is `R * rate% * days / (100 * year_length)`,
//! rounded half away from zero to a whole minor unit. A period crossing
//! New Year is split: the old-year part runs from `from` to December 31,
//! the new-year part from January 1 to `to`. Each part uses its own year
//! length and is rounded on its own before the two are added.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::calendar::{days_between, year_length};
use crate::error::AnnuityError;
use crate::types::{Money, Rate};
use crate::AnnuityResult;

const PERCENT_DIVISOR: Decimal = dec!(100);

/// Round to a whole minor unit, half away from zero.
pub fn round_minor(amount: Decimal) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Interest on `balance` for `days` days of a year with `year_days` days.
pub fn interest_for_days(
    balance: Money,
    annual_rate_percent: Rate,
    days: i64,
    year_days: i64,
) -> AnnuityResult<Money> {
    let overflow = || AnnuityError::ArithmeticOverflow {
        context: format!("interest on {balance} for {days} days"),
    };
    let numerator = balance
        .checked_mul(annual_rate_percent)
        .and_then(|v| v.checked_mul(Decimal::from(days)))
        .ok_or_else(overflow)?;
    let denominator = PERCENT_DIVISOR * Decimal::from(year_days);
    let interest = numerator.checked_div(denominator).ok_or_else(overflow)?;
    Ok(round_minor(interest))
}

/// Interest accrued on `balance` between two boundary dates.
///
/// Fails with `InvalidAccrualPeriod` when `to` precedes `from` or the period
/// spans more than one year boundary. Equal dates accrue nothing.
pub fn accrued_interest(
    from: NaiveDate,
    to: NaiveDate,
    balance: Money,
    annual_rate_percent: Rate,
) -> AnnuityResult<Money> {
    if to < from || to.year() > from.year() + 1 {
        return Err(AnnuityError::InvalidAccrualPeriod { from, to });
    }

    if from.year() == to.year() {
        return interest_for_days(
            balance,
            annual_rate_percent,
            days_between(from, to),
            year_length(from.year()),
        );
    }

    let year_end = NaiveDate::from_ymd_opt(from.year(), 12, 31)
        .ok_or(AnnuityError::InvalidAccrualPeriod { from, to })?;
    let year_start = NaiveDate::from_ymd_opt(to.year(), 1, 1)
        .ok_or(AnnuityError::InvalidAccrualPeriod { from, to })?;

    let old_year_part = interest_for_days(
        balance,
        annual_rate_percent,
        days_between(from, year_end),
        year_length(from.year()),
    )?;
    let new_year_part = interest_for_days(
        balance,
        annual_rate_percent,
        days_between(year_start, to),
        year_length(to.year()),
    )?;

    Ok(old_year_part + new_year_part)
}
