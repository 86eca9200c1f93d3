use napi::Result as NapiResult;
use napi_derive::napi;

use loan_engine_core::amortization::LoanRequest;
use loan_engine_core::portfolio::PortfolioLoan;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_loan(input_json: String) -> NapiResult<String> {
    let input: LoanRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_engine_core::run_loan(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn loan_schedule(input_json: String) -> NapiResult<String> {
    let input: LoanRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let result = loan_engine_core::compute(&input).map_err(to_napi_error)?;
    serde_json::to_string(&result.schedule).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct ProgressBindingInput {
    #[serde(flatten)]
    request: LoanRequest,
    paid_months: u32,
}

#[napi]
pub fn loan_progress(input_json: String) -> NapiResult<String> {
    let binding_input: ProgressBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = loan_engine_core::portfolio::track_loan(
        &binding_input.request,
        binding_input.paid_months,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn summarize_portfolio(input_json: String) -> NapiResult<String> {
    let loans: Vec<PortfolioLoan> = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        loan_engine_core::portfolio::summarize_portfolio(&loans).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
