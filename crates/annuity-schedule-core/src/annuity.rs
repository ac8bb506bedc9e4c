//! Annuity loan schedule with an interest-only first period and a closing
//! balloon payment.
//!
//! A loan of `term_months` payments is repaid as:
//!
//! 1. one interest-only payment one month after disbursement;
//! 2. `term_months - 2` level payments of `round(principal * A)`, where `A`
//!    is the annuity coefficient for `term_months - 1` installments;
//! 3. one closing payment of the whole remaining balance plus interest.
//!
//! Interest accrues between *unadjusted* payment dates. Moving a payment to
//! the next business day changes only the date shown to the borrower.

use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::calendar::{add_months, days_between, format_iso_date, parse_iso_date, HolidayCalendar};
use crate::day_count::{accrued_interest, round_minor};
use crate::error::AnnuityError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::AnnuityResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT_DIVISOR: Decimal = dec!(100);
/// Shortest loan: one interest-only payment plus one closing payment.
pub const MIN_TERM_MONTHS: u32 = 2;
/// Longest loan: one hundred years of monthly payments.
pub const MAX_TERM_MONTHS: u32 = 1200;
/// Largest principal: a signed 64-bit count of minor units.
pub const MAX_PRINCIPAL: Money = dec!(9_223_372_036_854_775_807);
/// Ceiling on `balance * rate * days` over the life of a loan. Leaves room
/// below `Decimal::MAX` (~7.9e28) for the running totals.
const MAX_ACCRUAL_PRODUCT: Decimal = dec!(100_000_000_000_000_000_000_000_000);
/// Longest accrual period and largest year length, used to bound balance growth.
const MAX_PERIOD_DAYS: Decimal = dec!(31);
const MIN_YEAR_DAYS: Decimal = dec!(365);
const MAX_YEAR_DAYS: Decimal = dec!(366);
/// Business-day shifts longer than this are reported as warnings.
const LONG_SHIFT_WARNING_DAYS: i64 = 7;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

/// Loan parameters for one schedule calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    /// Annual rate in percent (20 = 20% p.a.).
    pub annual_rate_percent: Rate,
    /// Total number of payments, including the interest-only first one.
    pub term_months: u32,
    /// Disbursed amount in whole minor units.
    pub principal: Money,
    /// Disbursement date.
    pub start_date: NaiveDate,
    /// Holidays in addition to weekends.
    #[serde(default)]
    pub holidays: HolidayCalendar,
}

impl LoanRequest {
    pub fn new(
        annual_rate_percent: Rate,
        term_months: u32,
        principal: Money,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            annual_rate_percent,
            term_months,
            principal,
            start_date,
            holidays: HolidayCalendar::weekends_only(),
        }
    }

    pub fn with_holidays(mut self, holidays: HolidayCalendar) -> Self {
        self.holidays = holidays;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Grace period: interest only, no principal.
    InterestOnly,
    /// Level annuity payment.
    Annuity,
    /// Final payment clearing the remaining balance.
    Closing,
}

/// One row of the payment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// 1-based payment number.
    pub number: u32,
    pub kind: PaymentKind,
    /// Business-day adjusted payment date.
    pub scheduled_date: NaiveDate,
    /// Unadjusted date closing the accrual period.
    pub accrual_end: NaiveDate,
    pub accrual_days: i64,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub total_amount: Money,
    pub remaining_principal_after: Money,
}

/// Full schedule with totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    /// Level payment applied to the intermediate periods.
    pub monthly_payment: Money,
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_sum: Money,
    pub payments: Vec<Payment>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the payment schedule and totals for an annuity loan.
pub fn calculate_annuity_schedule(
    request: &LoanRequest,
) -> AnnuityResult<ComputationOutput<ScheduleResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_request(request)?;

    let rate = monthly_rate(request.annual_rate_percent);
    let coefficient = annuity_coefficient(rate, request.term_months - 1)?;
    let level = level_payment(request.principal, coefficient)?;

    debug!(
        monthly_rate = %rate,
        annuity_coefficient = %coefficient,
        monthly_payment = %level,
        term_months = request.term_months,
        "derived annuity constants"
    );

    let payments = build_payments(request, level, &mut warnings)?;
    let result = summarise(level, payments)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Annuity schedule — interest-only first period, level payments, closing balance; \
         actual/actual day count split at year boundaries",
        &serde_json::json!({
            "annual_rate_percent": request.annual_rate_percent.to_string(),
            "term_months": request.term_months,
            "principal": request.principal.to_string(),
            "start_date": format_iso_date(request.start_date),
            "holiday_count": request.holidays.len(),
            "monthly_rate": rate.to_string(),
            "annuity_coefficient": coefficient.to_string(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

/// Reject requests that cannot produce a schedule. Checks run in field order:
/// rate, term, principal, start date.
///
/// Principal is also rejected when the balance could outgrow the decimal range
/// for this rate and term, so an accepted request always yields a schedule.
pub fn validate_request(request: &LoanRequest) -> AnnuityResult<()> {
    if request.annual_rate_percent <= Decimal::ZERO {
        return Err(AnnuityError::InvalidRate {
            reason: "Percent rate must be greater than 0".into(),
        });
    }

    if request.term_months == 0 {
        return Err(AnnuityError::InvalidTerm {
            reason: "Term must be a positive integer".into(),
        });
    }
    if request.term_months < MIN_TERM_MONTHS {
        return Err(AnnuityError::InvalidTerm {
            reason: format!(
                "Term must be at least {MIN_TERM_MONTHS} months \
                 (interest-only first payment plus closing payment)"
            ),
        });
    }
    if request.term_months > MAX_TERM_MONTHS {
        return Err(AnnuityError::InvalidTerm {
            reason: format!(
                "Term must be at most {MAX_TERM_MONTHS} months, got {}",
                request.term_months
            ),
        });
    }

    if request.principal <= Decimal::ZERO {
        return Err(AnnuityError::InvalidPrincipal {
            reason: "Principal must be greater than 0".into(),
        });
    }
    if !request.principal.fract().is_zero() {
        return Err(AnnuityError::InvalidPrincipal {
            reason: format!(
                "Principal must be a whole number of minor units, got {}",
                request.principal
            ),
        });
    }
    if request.principal > MAX_PRINCIPAL {
        return Err(AnnuityError::InvalidPrincipal {
            reason: format!(
                "Principal must be at most {MAX_PRINCIPAL} minor units, got {}",
                request.principal
            ),
        });
    }
    let fits = peak_accrual_product(request).is_some_and(|p| p <= MAX_ACCRUAL_PRODUCT);
    if !fits {
        return Err(AnnuityError::InvalidPrincipal {
            reason: format!(
                "Principal {} is too large for {}% over {} months",
                request.principal, request.annual_rate_percent, request.term_months
            ),
        });
    }

    if add_months(request.start_date, request.term_months).is_err() {
        return Err(AnnuityError::InvalidStartDate {
            reason: format!(
                "{} + {} months is outside the supported calendar range",
                request.start_date, request.term_months
            ),
        });
    }

    Ok(())
}

/// Upper bound on `balance * rate * days` for any period of the loan.
///
/// Each period adds at most `rate * 31 / 365 / 100` of the balance as interest
/// and payments never add to it, so the balance stays below
/// `principal * (1 + that)^term`. `None` when the bound itself overflows.
fn peak_accrual_product(request: &LoanRequest) -> Option<Decimal> {
    let rate = request.annual_rate_percent;
    let growth_per_period = rate
        .checked_mul(MAX_PERIOD_DAYS)?
        .checked_div(MIN_YEAR_DAYS)?
        .checked_div(PERCENT_DIVISOR)?;
    let peak_balance = (Decimal::ONE + growth_per_period)
        .checked_powu(u64::from(request.term_months))?
        .checked_mul(request.principal)?;
    // Rounding adds at most half a unit per period.
    let peak_balance = peak_balance.checked_add(Decimal::from(request.term_months))?;
    peak_balance.checked_mul(rate)?.checked_mul(MAX_YEAR_DAYS)
}

/// Parse a `YYYY-MM-DD` disbursement date.
pub fn parse_start_date(value: &str) -> AnnuityResult<NaiveDate> {
    parse_iso_date(value).map_err(|e| AnnuityError::InvalidStartDate {
        reason: format!("'{value}' is not a valid YYYY-MM-DD date ({e})"),
    })
}

/// Monthly rate as a plain fraction: `annual% / 12 / 100`.
pub fn monthly_rate(annual_rate_percent: Rate) -> Rate {
    annual_rate_percent / MONTHS_PER_YEAR / PERCENT_DIVISOR
}

/// `A = r(1+r)^n / ((1+r)^n - 1)`.
pub fn annuity_coefficient(monthly_rate: Rate, installments: u32) -> AnnuityResult<Decimal> {
    let overflow = || AnnuityError::ArithmeticOverflow {
        context: format!("annuity coefficient for {installments} installments"),
    };
    let growth = (Decimal::ONE + monthly_rate)
        .checked_powu(u64::from(installments))
        .ok_or_else(overflow)?;
    let denominator = growth - Decimal::ONE;
    if denominator <= Decimal::ZERO {
        return Err(AnnuityError::InvalidRate {
            reason: format!("Monthly rate {monthly_rate} is too small to amortise the loan"),
        });
    }
    monthly_rate
        .checked_mul(growth)
        .and_then(|n| n.checked_div(denominator))
        .ok_or_else(overflow)
}

/// Level payment `round(principal * A)` in whole minor units.
pub fn level_payment(principal: Money, coefficient: Decimal) -> AnnuityResult<Money> {
    principal
        .checked_mul(coefficient)
        .map(round_minor)
        .ok_or_else(|| AnnuityError::ArithmeticOverflow {
            context: "level payment".into(),
        })
}

// ---------------------------------------------------------------------------
// Schedule construction
// ---------------------------------------------------------------------------

/// Interest and dates for one accrual period.
struct Accrual {
    scheduled_date: NaiveDate,
    accrual_end: NaiveDate,
    accrual_days: i64,
    interest: Money,
}

fn accrue(
    request: &LoanRequest,
    accrual_start: NaiveDate,
    accrual_end: NaiveDate,
    balance: Money,
    warnings: &mut Vec<String>,
) -> AnnuityResult<Accrual> {
    let scheduled_date = request.holidays.following(accrual_end)?;
    let shift = days_between(accrual_end, scheduled_date);
    if shift > LONG_SHIFT_WARNING_DAYS {
        let msg = format!(
            "Payment due {} moved {} days to next business day {}",
            format_iso_date(accrual_end),
            shift,
            format_iso_date(scheduled_date)
        );
        warn!("{msg}");
        warnings.push(msg);
    }

    let interest = accrued_interest(
        accrual_start,
        accrual_end,
        balance,
        request.annual_rate_percent,
    )?;

    Ok(Accrual {
        scheduled_date,
        accrual_end,
        accrual_days: days_between(accrual_start, accrual_end),
        interest,
    })
}

fn interest_only_payment(
    request: &LoanRequest,
    warnings: &mut Vec<String>,
) -> AnnuityResult<Payment> {
    let due = add_months(request.start_date, 1)?;
    // 100.00 and 100 are the same amount; keep scale 0 in the output.
    let principal = request.principal.normalize();
    let accrual = accrue(request, request.start_date, due, principal, warnings)?;

    Ok(Payment {
        number: 1,
        kind: PaymentKind::InterestOnly,
        scheduled_date: accrual.scheduled_date,
        accrual_end: accrual.accrual_end,
        accrual_days: accrual.accrual_days,
        principal_portion: Decimal::ZERO,
        interest_portion: accrual.interest,
        total_amount: accrual.interest,
        remaining_principal_after: principal,
    })
}

fn annuity_payment(
    request: &LoanRequest,
    number: u32,
    previous: &Payment,
    level: Money,
    warnings: &mut Vec<String>,
) -> AnnuityResult<Payment> {
    let due = add_months(request.start_date, number)?;
    let balance = previous.remaining_principal_after;
    let accrual = accrue(request, previous.accrual_end, due, balance, warnings)?;

    let principal_portion = level - accrual.interest;
    if principal_portion < Decimal::ZERO {
        let msg = format!(
            "Payment {number}: interest {} exceeds level payment {level}; balance grows by {}",
            accrual.interest, -principal_portion
        );
        warn!("{msg}");
        warnings.push(msg);
    }

    Ok(Payment {
        number,
        kind: PaymentKind::Annuity,
        scheduled_date: accrual.scheduled_date,
        accrual_end: accrual.accrual_end,
        accrual_days: accrual.accrual_days,
        principal_portion,
        interest_portion: accrual.interest,
        total_amount: level,
        remaining_principal_after: balance - principal_portion,
    })
}

fn closing_payment(
    request: &LoanRequest,
    previous: &Payment,
    warnings: &mut Vec<String>,
) -> AnnuityResult<Payment> {
    let due = add_months(previous.accrual_end, 1)?;
    let balance = previous.remaining_principal_after;
    let accrual = accrue(request, previous.accrual_end, due, balance, warnings)?;

    Ok(Payment {
        number: request.term_months,
        kind: PaymentKind::Closing,
        scheduled_date: accrual.scheduled_date,
        accrual_end: accrual.accrual_end,
        accrual_days: accrual.accrual_days,
        principal_portion: balance,
        interest_portion: accrual.interest,
        total_amount: balance + accrual.interest,
        remaining_principal_after: Decimal::ZERO,
    })
}

fn build_payments(
    request: &LoanRequest,
    level: Money,
    warnings: &mut Vec<String>,
) -> AnnuityResult<Vec<Payment>> {
    let mut payments: Vec<Payment> = Vec::with_capacity(request.term_months as usize);

    let mut previous = interest_only_payment(request, warnings)?;
    for number in 2..request.term_months {
        let next = annuity_payment(request, number, &previous, level, warnings)?;
        trace!(
            number,
            date = %next.scheduled_date,
            interest = %next.interest_portion,
            "annuity payment"
        );
        payments.push(previous);
        previous = next;
    }
    let last = closing_payment(request, &previous, warnings)?;
    payments.push(previous);
    payments.push(last);

    Ok(payments)
}

fn summarise(monthly_payment: Money, payments: Vec<Payment>) -> AnnuityResult<ScheduleResult> {
    let total = |label: &str, amount: fn(&Payment) -> Money| -> AnnuityResult<Money> {
        payments
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(amount(p)))
            .ok_or_else(|| AnnuityError::ArithmeticOverflow {
                context: format!("schedule total {label}"),
            })
    };
    let total_principal = total("principal", |p| p.principal_portion)?;
    let total_interest = total("interest", |p| p.interest_portion)?;
    let total_sum = total("sum", |p| p.total_amount)?;

    Ok(ScheduleResult {
        monthly_payment,
        total_principal,
        total_interest,
        total_sum,
        payments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day_count::interest_for_days;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// 20% p.a., 12 payments, 100 000.00 in kopecks, disbursed 2024-02-05.
    fn reference_request() -> LoanRequest {
        LoanRequest::new(dec!(20), 12, dec!(10_000_000), d(2024, 2, 5))
    }

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(12)), dec!(0.01));
        assert_eq!(monthly_rate(dec!(24)), dec!(0.02));
    }

    #[test]
    fn test_annuity_coefficient_single_installment() {
        // n = 1: A = r(1+r)/r = 1 + r
        let a = annuity_coefficient(dec!(0.01), 1).unwrap();
        assert_eq!(a.round_dp(12), dec!(1.01));
    }

    #[test]
    fn test_annuity_coefficient_two_installments() {
        // r = 10%, n = 2: 0.1 * 1.21 / 0.21 = 0.576190476...
        let a = annuity_coefficient(dec!(0.1), 2).unwrap();
        assert_eq!(a.round_dp(9), dec!(0.576190476));
    }

    #[test]
    fn test_level_payment_rounds_half_away_from_zero() {
        assert_eq!(level_payment(dec!(5), dec!(0.5)).unwrap(), dec!(3));
        assert_eq!(level_payment(dec!(1000), dec!(0.1004)).unwrap(), dec!(100));
    }

    #[test]
    fn test_reference_schedule_shape() {
        let out = calculate_annuity_schedule(&reference_request()).unwrap();
        let r = &out.result;

        assert_eq!(r.payments.len(), 12);
        assert_eq!(r.total_principal, dec!(10_000_000));
        assert_eq!(r.total_sum, r.total_principal + r.total_interest);

        let first = &r.payments[0];
        assert_eq!(first.kind, PaymentKind::InterestOnly);
        assert_eq!(first.scheduled_date, d(2024, 3, 5));
        assert_eq!(first.principal_portion, Decimal::ZERO);
        // 29 days of leap 2024 on the full principal
        assert_eq!(first.interest_portion, dec!(158470));
        assert_eq!(first.total_amount, first.interest_portion);
        assert_eq!(first.remaining_principal_after, dec!(10_000_000));

        let last = r.payments.last().unwrap();
        assert_eq!(last.kind, PaymentKind::Closing);
        assert_eq!(last.number, 12);
        assert_eq!(last.accrual_end, d(2025, 2, 5));
        assert_eq!(last.remaining_principal_after, Decimal::ZERO);
    }

    #[test]
    fn test_reference_second_payment() {
        let out = calculate_annuity_schedule(&reference_request()).unwrap();
        let second = &out.result.payments[1];
        // Mar 5 -> Apr 5: 31 days on 10_000_000 at 20% / 366 = 169398.9...
        assert_eq!(second.accrual_days, 31);
        assert_eq!(second.interest_portion, dec!(169399));
        assert_eq!(second.total_amount, out.result.monthly_payment);
        assert_eq!(
            second.principal_portion,
            out.result.monthly_payment - dec!(169399)
        );
    }

    #[test]
    fn test_reference_level_payment_range() {
        let out = calculate_annuity_schedule(&reference_request()).unwrap();
        let m = out.result.monthly_payment;
        assert!(m > dec!(990_000) && m < dec!(1_010_000), "level payment {m}");
        assert!(m.fract().is_zero());
    }

    #[test]
    fn test_weekend_dates_are_shifted() {
        let out = calculate_annuity_schedule(&reference_request()).unwrap();
        let p = &out.result.payments;
        // 2024-05-05 is a Sunday
        assert_eq!(p[2].accrual_end, d(2024, 5, 5));
        assert_eq!(p[2].scheduled_date, d(2024, 5, 6));
        // 2024-10-05 is a Saturday
        assert_eq!(p[7].accrual_end, d(2024, 10, 5));
        assert_eq!(p[7].scheduled_date, d(2024, 10, 7));
        // 2025-01-05 is a Sunday
        assert_eq!(p[10].accrual_end, d(2025, 1, 5));
        assert_eq!(p[10].scheduled_date, d(2025, 1, 6));
    }

    #[test]
    fn test_year_crossing_period_is_split() {
        let out = calculate_annuity_schedule(&reference_request()).unwrap();
        let p = &out.result.payments;
        // Payment 11 accrues 2024-12-05 -> 2025-01-05
        let balance = p[9].remaining_principal_after;
        let old_part = interest_for_days(balance, dec!(20), 26, 366).unwrap();
        let new_part = interest_for_days(balance, dec!(20), 4, 365).unwrap();
        assert_eq!(p[10].interest_portion, old_part + new_part);
    }

    #[test]
    fn test_holidays_do_not_change_amounts() {
        let holidays = HolidayCalendar::from_iso_strings([
            "2024-03-05",
            "2024-03-06",
            "2024-03-07",
            "2024-03-08",
            "2024-06-05",
        ])
        .unwrap();
        let plain = calculate_annuity_schedule(&reference_request()).unwrap();
        let shifted =
            calculate_annuity_schedule(&reference_request().with_holidays(holidays)).unwrap();

        assert_eq!(shifted.result.payments[0].scheduled_date, d(2024, 3, 11));
        assert_eq!(shifted.result.payments[3].scheduled_date, d(2024, 6, 6));

        for (a, b) in plain.result.payments.iter().zip(&shifted.result.payments) {
            assert_eq!(a.accrual_end, b.accrual_end);
            assert_eq!(a.interest_portion, b.interest_portion);
            assert_eq!(a.principal_portion, b.principal_portion);
            assert_eq!(a.total_amount, b.total_amount);
            assert_eq!(a.remaining_principal_after, b.remaining_principal_after);
        }
        assert_eq!(plain.result.total_sum, shifted.result.total_sum);
    }

    #[test]
    fn test_two_month_term_has_no_annuity_payments() {
        let req = LoanRequest::new(dec!(12), 2, dec!(1_000_000), d(2023, 6, 15));
        let out = calculate_annuity_schedule(&req).unwrap();
        let p = &out.result.payments;

        assert_eq!(p.len(), 2);
        assert_eq!(p[0].kind, PaymentKind::InterestOnly);
        assert_eq!(p[1].kind, PaymentKind::Closing);
        assert_eq!(p[1].principal_portion, dec!(1_000_000));
        // Jul 15 -> Aug 15: 31 days of 2023
        assert_eq!(p[1].interest_portion, dec!(10192));
        assert_eq!(p[1].total_amount, dec!(1_010_192));
        assert_eq!(p[1].remaining_principal_after, Decimal::ZERO);
    }

    #[test]
    fn test_closing_date_follows_previous_unadjusted_date() {
        // Jan 31 start: payment 2 falls on Mar 31, closing = Apr 30
        let req = LoanRequest::new(dec!(10), 3, dec!(300_000), d(2024, 1, 31));
        let out = calculate_annuity_schedule(&req).unwrap();
        let p = &out.result.payments;
        assert_eq!(p[0].accrual_end, d(2024, 2, 29));
        assert_eq!(p[1].accrual_end, d(2024, 3, 31));
        assert_eq!(p[2].accrual_end, d(2024, 4, 30));
    }

    #[test]
    fn test_rejects_zero_rate() {
        let mut req = reference_request();
        req.annual_rate_percent = Decimal::ZERO;
        let err = calculate_annuity_schedule(&req).unwrap_err();
        assert!(matches!(err, AnnuityError::InvalidRate { .. }));
    }

    #[test]
    fn test_rejects_short_terms() {
        for term in [0, 1] {
            let mut req = reference_request();
            req.term_months = term;
            let err = calculate_annuity_schedule(&req).unwrap_err();
            assert!(matches!(err, AnnuityError::InvalidTerm { .. }), "term {term}");
        }
    }

    #[test]
    fn test_rejects_bad_principal() {
        for principal in [Decimal::ZERO, dec!(-100), dec!(100.5)] {
            let mut req = reference_request();
            req.principal = principal;
            let err = calculate_annuity_schedule(&req).unwrap_err();
            assert!(
                matches!(err, AnnuityError::InvalidPrincipal { .. }),
                "principal {principal}"
            );
        }
    }

    #[test]
    fn test_rejects_start_date_at_calendar_edge() {
        let mut req = reference_request();
        req.start_date = NaiveDate::MAX;
        let err = calculate_annuity_schedule(&req).unwrap_err();
        assert!(matches!(err, AnnuityError::InvalidStartDate { .. }));
    }

    #[test]
    fn test_max_principal_is_i64_max() {
        assert_eq!(MAX_PRINCIPAL, Decimal::from(i64::MAX));
    }

    #[test]
    fn test_principal_at_limit_is_scheduled() {
        let req = LoanRequest::new(dec!(0.0001), 3, MAX_PRINCIPAL, d(2024, 1, 15));
        let out = calculate_annuity_schedule(&req).unwrap();
        assert_eq!(out.result.total_principal, MAX_PRINCIPAL);
        assert_eq!(
            out.result.total_sum,
            out.result.total_principal + out.result.total_interest
        );
        assert_eq!(out.result.payments[2].remaining_principal_after, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_principal_above_limit() {
        let cases = [
            (dec!(0.0001), 3, MAX_PRINCIPAL + Decimal::ONE),
            (dec!(0.0001), 3, Decimal::MAX),
            (dec!(20), 2, dec!(50_000_000_000_000_000_000_000_000_000)),
        ];
        for (rate, term, principal) in cases {
            let req = LoanRequest::new(rate, term, principal, d(2024, 1, 15));
            let err = calculate_annuity_schedule(&req).unwrap_err();
            assert!(
                matches!(err, AnnuityError::InvalidPrincipal { .. }),
                "principal {principal}: {err}"
            );
        }
    }

    #[test]
    fn test_rejects_principal_that_could_outgrow_decimal_range() {
        // Fits i64 but compounds past the accrual ceiling over 30 years at 36%.
        let req = LoanRequest::new(dec!(36), 360, MAX_PRINCIPAL, d(2024, 1, 15));
        let err = validate_request(&req).unwrap_err();
        assert!(matches!(err, AnnuityError::InvalidPrincipal { .. }));

        let req = LoanRequest::new(Decimal::MAX, 12, dec!(1_000), d(2024, 1, 15));
        let err = validate_request(&req).unwrap_err();
        assert!(matches!(err, AnnuityError::InvalidPrincipal { .. }));
    }

    #[test]
    fn test_longest_term_is_scheduled() {
        let req = LoanRequest::new(dec!(10), MAX_TERM_MONTHS, dec!(1_000_000), d(2024, 1, 15));
        let out = calculate_annuity_schedule(&req).unwrap();
        assert_eq!(out.result.payments.len(), MAX_TERM_MONTHS as usize);
        assert_eq!(out.result.total_principal, dec!(1_000_000));
    }

    #[test]
    fn test_summarise_reports_total_overflow() {
        let out = calculate_annuity_schedule(&reference_request()).unwrap();
        let mut payments = out.result.payments;
        payments[0].total_amount = Decimal::MAX;
        payments[1].total_amount = Decimal::MAX;
        let err = summarise(dec!(1), payments).unwrap_err();
        assert!(matches!(err, AnnuityError::ArithmeticOverflow { .. }));
        assert!(err.to_string().contains("total sum"));
    }

    #[test]
    fn test_rejects_term_above_limit() {
        let mut req = reference_request();
        req.term_months = MAX_TERM_MONTHS + 1;
        let err = calculate_annuity_schedule(&req).unwrap_err();
        assert!(matches!(err, AnnuityError::InvalidTerm { .. }));
    }

    #[test]
    fn test_validation_order_reports_rate_first() {
        let req = LoanRequest::new(Decimal::ZERO, 1, Decimal::ZERO, d(2024, 1, 1));
        let err = validate_request(&req).unwrap_err();
        assert!(matches!(err, AnnuityError::InvalidRate { .. }));
    }

    #[test]
    fn test_parse_start_date() {
        assert_eq!(parse_start_date("2024-02-05").unwrap(), d(2024, 2, 5));
        let err = parse_start_date("not-a-date").unwrap_err();
        assert!(matches!(err, AnnuityError::InvalidStartDate { .. }));
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn test_long_holiday_shift_warns() {
        let holidays = HolidayCalendar::new((1..=12).map(|day| d(2024, 3, day)));
        let out = calculate_annuity_schedule(&reference_request().with_holidays(holidays)).unwrap();
        assert_eq!(out.result.payments[0].scheduled_date, d(2024, 3, 13));
        assert!(out.warnings.iter().any(|w| w.contains("2024-03-05")));
    }

    #[test]
    fn test_amounts_serialize_as_strings() {
        let out = calculate_annuity_schedule(&reference_request()).unwrap();
        let json = serde_json::to_value(&out.result).unwrap();
        assert_eq!(json["total_principal"], "10000000");
        assert_eq!(json["payments"][0]["scheduled_date"], "2024-03-05");
        assert_eq!(json["payments"][0]["kind"], "interest_only");
    }
}
