use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnuityError {
    #[error("Invalid rate: annual_rate_percent — {reason}")]
    InvalidRate { reason: String },

    #[error("Invalid term: term_months — {reason}")]
    InvalidTerm { reason: String },

    #[error("Invalid principal: principal — {reason}")]
    InvalidPrincipal { reason: String },

    #[error("Invalid start date: start_date — {reason}")]
    InvalidStartDate { reason: String },

    #[error("Invalid holiday '{value}': {reason}")]
    InvalidHoliday { value: String, reason: String },

    #[error("Invalid accrual period: {from} to {to}")]
    InvalidAccrualPeriod { from: NaiveDate, to: NaiveDate },

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    #[error("Date out of range: {context}")]
    DateOutOfRange { context: String },

    #[error("Invalid unit scale: {minor_per_major} minor units per major is not a power of ten")]
    InvalidUnitScale { minor_per_major: u32 },
}
