use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use annuity_schedule_core::annuity::{self, LoanRequest};
use annuity_schedule_core::calendar::HolidayCalendar;
use annuity_schedule_core::presentation;
use annuity_schedule_core::ComputationOutput;

use crate::input;

/// Arguments for an annuity schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON loan request (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Annual interest rate in percent (20 = 20%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Number of monthly payments (at least 2)
    #[arg(long)]
    pub term: Option<u32>,

    /// Loan amount in minor currency units (kopecks, cents)
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Disbursement date, YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<String>,

    /// Holiday date, YYYY-MM-DD (repeatable)
    #[arg(long = "holiday")]
    pub holidays: Vec<String>,

    /// Path to a JSON array of YYYY-MM-DD holiday dates
    #[arg(long)]
    pub holidays_file: Option<String>,

    /// Report amounts in major units, given minor units per major unit (e.g. 100)
    #[arg(long)]
    pub major_units: Option<u32>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: LoanRequest = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(request) = input::stdin::read_stdin()? {
        request
    } else {
        let start_date = args
            .start_date
            .as_deref()
            .ok_or("--start-date is required (or provide --input)")?;
        LoanRequest::new(
            args.rate.ok_or("--rate is required (or provide --input)")?,
            args.term.ok_or("--term is required (or provide --input)")?,
            args.principal
                .ok_or("--principal is required (or provide --input)")?,
            annuity::parse_start_date(start_date)?,
        )
    };

    if let Some(ref path) = args.holidays_file {
        let from_file: HolidayCalendar = input::file::read_json(path)?;
        request.holidays.extend(from_file.iter());
    }
    if !args.holidays.is_empty() {
        let from_flags = HolidayCalendar::from_iso_strings(&args.holidays)?;
        request.holidays.extend(from_flags.iter());
    }

    debug!(
        term_months = request.term_months,
        holidays = request.holidays.len(),
        "loan request assembled"
    );
    let output = annuity::calculate_annuity_schedule(&request)?;

    match args.major_units {
        Some(minor_per_major) => {
            let converted = ComputationOutput {
                result: presentation::convert_schedule(&output.result, minor_per_major)?,
                methodology: output.methodology,
                assumptions: output.assumptions,
                warnings: output.warnings,
                metadata: output.metadata,
            };
            Ok(serde_json::to_value(converted)?)
        }
        None => Ok(serde_json::to_value(output)?),
    }
}
