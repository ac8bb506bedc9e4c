use napi::Result as NapiResult;
use napi_derive::napi;

use annuity_schedule_core::annuity::{self, LoanRequest};
use annuity_schedule_core::presentation;
use annuity_schedule_core::ComputationOutput;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_request(input_json: &str) -> NapiResult<LoanRequest> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Annuity schedule
// ---------------------------------------------------------------------------

/// Schedule in minor units. Amounts are returned as decimal strings so large
/// values survive JSON.parse without losing precision.
#[napi]
pub fn calculate_annuity_schedule(input_json: String) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let output = annuity::calculate_annuity_schedule(&request).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Schedule converted to major units (`minor_per_major` = 100 for rubles).
#[napi]
pub fn calculate_annuity_schedule_major(
    input_json: String,
    minor_per_major: u32,
) -> NapiResult<String> {
    let request = parse_request(&input_json)?;
    let output = annuity::calculate_annuity_schedule(&request).map_err(to_napi_error)?;
    let converted = ComputationOutput {
        result: presentation::convert_schedule(&output.result, minor_per_major)
            .map_err(to_napi_error)?,
        methodology: output.methodology,
        assumptions: output.assumptions,
        warnings: output.warnings,
        metadata: output.metadata,
    };
    serde_json::to_string(&converted).map_err(to_napi_error)
}
