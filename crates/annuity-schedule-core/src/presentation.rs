//! Display conversion from minor units (kopecks) to major units (rubles).

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::annuity::{PaymentKind, ScheduleResult};
use crate::error::AnnuityError;
use crate::types::Money;
use crate::AnnuityResult;

/// Schedule row in major units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorUnitPayment {
    pub number: u32,
    pub kind: PaymentKind,
    pub scheduled_date: NaiveDate,
    pub total_amount: Decimal,
    pub principal_portion: Decimal,
    pub interest_portion: Decimal,
    pub remaining_principal_after: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MajorUnitSchedule {
    pub minor_per_major: u32,
    pub monthly_payment: Decimal,
    pub total_principal: Decimal,
    pub total_interest: Decimal,
    pub total_sum: Decimal,
    pub payments: Vec<MajorUnitPayment>,
}

/// Decimal places implied by a power-of-ten unit scale (100 -> 2).
fn scale_places(minor_per_major: u32) -> AnnuityResult<u32> {
    let mut places = 0;
    let mut rest = minor_per_major;
    while rest > 1 && rest % 10 == 0 {
        rest /= 10;
        places += 1;
    }
    if rest != 1 {
        return Err(AnnuityError::InvalidUnitScale { minor_per_major });
    }
    Ok(places)
}

/// Convert a minor-unit amount to major units with a fixed number of
/// decimals, rounding half away from zero.
pub fn to_major_units(amount: Money, minor_per_major: u32) -> AnnuityResult<Decimal> {
    let places = scale_places(minor_per_major)?;
    let mut major = (amount / Decimal::from(minor_per_major))
        .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero);
    major.rescale(places);
    Ok(major)
}

/// Convert every amount of a schedule to major units.
pub fn convert_schedule(
    schedule: &ScheduleResult,
    minor_per_major: u32,
) -> AnnuityResult<MajorUnitSchedule> {
    let convert = |amount: Money| to_major_units(amount, minor_per_major);

    let payments = schedule
        .payments
        .iter()
        .map(|p| {
            Ok(MajorUnitPayment {
                number: p.number,
                kind: p.kind,
                scheduled_date: p.scheduled_date,
                total_amount: convert(p.total_amount)?,
                principal_portion: convert(p.principal_portion)?,
                interest_portion: convert(p.interest_portion)?,
                remaining_principal_after: convert(p.remaining_principal_after)?,
            })
        })
        .collect::<AnnuityResult<Vec<_>>>()?;

    Ok(MajorUnitSchedule {
        minor_per_major,
        monthly_payment: convert(schedule.monthly_payment)?,
        total_principal: convert(schedule.total_principal)?,
        total_interest: convert(schedule.total_interest)?,
        total_sum: convert(schedule.total_sum)?,
        payments,
    })
}
