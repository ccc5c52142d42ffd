use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use loan_calc_core::amortization::{checked_monthly_payment, checked_schedule};
use loan_calc_core::amortization::validation::validate_inputs;
use loan_calc_core::loan::details::{compute_with_quote, LoanRequest};
use loan_calc_core::tax::lookup::TaxQuote;
use loan_calc_core::tax::normalize::{normalize_tax_rate as normalize, RateFormat};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Principal, annual rate (percent) and term shared by the engine calls.
#[derive(Deserialize)]
struct TermsInput {
    principal: Decimal,
    annual_rate: Decimal,
    years: u32,
}

fn parse_terms(input_json: &str) -> NapiResult<TermsInput> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization engine
// ---------------------------------------------------------------------------

#[napi]
pub fn monthly_payment(input_json: String) -> NapiResult<String> {
    let terms = parse_terms(&input_json)?;
    let payment = checked_monthly_payment(terms.principal, terms.annual_rate, terms.years)
        .map_err(to_napi_error)?;
    serde_json::to_string(&payment).map_err(to_napi_error)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    let terms = parse_terms(&input_json)?;
    let schedule = checked_schedule(terms.principal, terms.annual_rate, terms.years)
        .map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

/// Validation never throws; the result carries `is_valid` and `error`.
#[napi]
pub fn validate_loan_inputs(input_json: String) -> NapiResult<String> {
    #[derive(Deserialize)]
    struct ValidateInput {
        principal: Decimal,
        annual_rate: Option<Decimal>,
        years: u32,
    }
    let input: ValidateInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let result = validate_inputs(input.principal, input.annual_rate, input.years);
    serde_json::to_string(&result).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tax
// ---------------------------------------------------------------------------

#[napi]
pub fn normalize_tax_rate(raw_rate: f64, format: Option<String>) -> NapiResult<String> {
    let format: RateFormat = match format {
        Some(f) => serde_json::from_value(serde_json::Value::String(f)).map_err(to_napi_error)?,
        None => RateFormat::Auto,
    };
    serde_json::to_string(&normalize(raw_rate, format)).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loan details
// ---------------------------------------------------------------------------

/// Full loan breakdown. The UI fetches the tax quote itself and passes it
/// in; `null` or an unparseable quote is treated as a failed lookup.
///
/// The request uses snake_case keys (`annual_rate`, `property_value`) like
/// every other call here. The quote keeps the provider's camelCase shape
/// (`rate`, `source`, `updatedAt`) so it can be forwarded untouched.
#[napi]
pub fn loan_details(request_json: String, quote_json: Option<String>) -> NapiResult<String> {
    let request: LoanRequest = serde_json::from_str(&request_json).map_err(to_napi_error)?;
    let quote: Option<TaxQuote> = quote_json.and_then(|json| serde_json::from_str(&json).ok());
    let output = compute_with_quote(&request, quote.as_ref()).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

