//! Annuity loan amortisation schedules.
//!
//! Amounts are whole minor currency units held in `rust_decimal::Decimal`;
//! dates are `chrono::NaiveDate`. The engine is a pure function of the
//! [`annuity::LoanRequest`] and can run concurrently without coordination.

pub mod annuity;
pub mod calendar;
pub mod day_count;
pub mod error;
pub mod presentation;
pub mod types;

pub use annuity::{calculate_annuity_schedule, LoanRequest, Payment, PaymentKind, ScheduleResult};
pub use calendar::HolidayCalendar;
pub use error::AnnuityError;
pub use types::*;

/// Standard result type for all annuity-schedule operations
pub type AnnuityResult<T> = Result<T, AnnuityError>;
