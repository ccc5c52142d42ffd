//! Full loan computation: tax enrichment, payment, schedule and PMI summary.
//!
//! The only suspension point is the injected [`TaxLookup`]. It is called at
//! most once, and any failure is absorbed as a zero tax rate so the result
//! is always produced for valid inputs.

use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::insurance::{
    calculate_ltv, calculate_monthly_pmi, calculate_pmi_drop_off, calculate_total_pmi,
    pmi_required,
};
use crate::amortization::payment::{
    calculate_monthly_payment, generate_amortization_schedule, total_paid, ScheduleEntry,
};
use crate::amortization::validation::validate_inputs;
use crate::error::LoanCalcError;
use crate::tax::lookup::{TaxLookup, TaxQuote};
use crate::tax::normalize::{is_ambiguous, normalize_tax_rate, RateFormat};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::LoanCalcResult;

/// Default annual PMI rate, in percent.
pub const DEFAULT_PMI_RATE_PCT: Percent = dec!(0.8);

/// Highest annual PMI rate accepted, in percent.
pub const MAX_PMI_RATE_PCT: Percent = dec!(5);

const METHODOLOGY: &str = "Fixed-Rate Amortization with PMI and Financed Sales Tax";

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Loan parameters as entered by the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    /// Amount borrowed before any financed tax.
    pub principal: Money,
    /// Appraised property value. Defaults to the principal (100% LTV).
    #[serde(default)]
    pub property_value: Option<Money>,
    /// Annual interest rate in percent (6.5 = 6.5%).
    pub annual_rate: Percent,
    /// Term in years.
    pub years: u32,
    /// Two-letter state code used for the sales-tax lookup.
    #[serde(default)]
    pub state_code: Option<String>,
    /// Finance the state sales tax on the principal.
    #[serde(default)]
    pub include_sales_tax: bool,
    /// Annual PMI rate in percent.
    #[serde(default = "default_pmi_rate")]
    pub pmi_rate: Percent,
    #[serde(default)]
    pub monthly_insurance: Money,
    /// Unit of the rate returned by the tax lookup.
    #[serde(default)]
    pub tax_rate_format: RateFormat,
}

fn default_pmi_rate() -> Percent {
    DEFAULT_PMI_RATE_PCT
}

impl LoanRequest {
    pub fn new(principal: Money, annual_rate: Percent, years: u32) -> Self {
        Self {
            principal,
            property_value: None,
            annual_rate,
            years,
            state_code: None,
            include_sales_tax: false,
            pmi_rate: DEFAULT_PMI_RATE_PCT,
            monthly_insurance: Decimal::ZERO,
            tax_rate_format: RateFormat::Auto,
        }
    }

    /// State code to look up, if sales tax is requested and a code is set.
    fn tax_state(&self) -> Option<&str> {
        if !self.include_sales_tax {
            return None;
        }
        self.state_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Derived loan facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInfo {
    pub principal: Money,
    /// Principal plus financed sales tax.
    pub financed_principal: Money,
    pub annual_rate: Percent,
    pub years: u32,
    pub state_code: Option<String>,
    pub include_sales_tax: bool,
    /// Normalized decimal tax rate (0.0725 = 7.25%).
    pub tax_rate: Rate,
    pub tax_amount: Money,
    pub ltv: Rate,
    pub down_payment: Money,
    pub pmi_required: bool,
    pub property_value: Money,
}

/// Monthly and lifetime totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    /// Principal and interest only.
    pub monthly_payment: Money,
    pub monthly_pmi: Money,
    pub monthly_insurance: Money,
    pub total_monthly_payment: Money,
    pub pmi_drop_off_month: Option<u32>,
    pub total_pmi_paid: Money,
    pub total_paid: Money,
    pub total_interest: Money,
}

/// Everything the UI renders for one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanDetails {
    pub loan_info: LoanInfo,
    pub results: ResultsSummary,
    pub schedule: Vec<ScheduleEntry>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute loan details, resolving sales tax through `tax_lookup`.
///
/// The lookup is only consulted when `include_sales_tax` is set and a state
/// code is present. A failed lookup is logged and treated as a zero rate.
pub async fn compute_loan_details<L: TaxLookup>(
    request: &LoanRequest,
    tax_lookup: &L,
) -> LoanCalcResult<ComputationOutput<LoanDetails>> {
    let start = Instant::now();
    validate_request(request)?;

    let quote = match request.tax_state() {
        Some(code) => match tax_lookup.lookup(code).await {
            Ok(quote) => Some(quote),
            Err(e) => {
                warn!("sales tax lookup for {code} failed, continuing without tax: {e}");
                None
            }
        },
        None => None,
    };

    Ok(build_details(request, quote.as_ref(), start))
}

/// Compute loan details from an already-resolved tax quote.
///
/// Used by callers that fetch the quote themselves. The quote is ignored
/// unless `include_sales_tax` is set and a state code is present.
pub fn compute_with_quote(
    request: &LoanRequest,
    quote: Option<&TaxQuote>,
) -> LoanCalcResult<ComputationOutput<LoanDetails>> {
    let start = Instant::now();
    validate_request(request)?;
    Ok(build_details(request, quote, start))
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

fn build_details(
    request: &LoanRequest,
    quote: Option<&TaxQuote>,
    start: Instant,
) -> ComputationOutput<LoanDetails> {
    let mut warnings: Vec<String> = Vec::new();

    let property_value = match request.property_value {
        Some(value) => value,
        None => {
            warnings.push("Property value not supplied; assuming 100% LTV".into());
            request.principal
        }
    };

    let tax_state = request.tax_state();
    let tax_rate = match (tax_state, quote) {
        (Some(code), Some(q)) => {
            let rate = normalize_tax_rate(q.rate, request.tax_rate_format);
            debug!(
                "tax quote for {code} from {:?}: raw {} -> {rate}",
                q.source, q.rate
            );
            if rate >= Decimal::ONE {
                warn!("tax quote for {code} normalizes to {rate}, continuing without tax");
                warnings.push(format!(
                    "Tax rate {} for {code} is not below 100%; sales tax ignored",
                    q.rate
                ));
                Decimal::ZERO
            } else {
                if request.tax_rate_format == RateFormat::Auto && is_ambiguous(q.rate) {
                    warnings.push(format!(
                        "Tax rate {} for {code} read as a decimal fraction ({}%)",
                        q.rate,
                        rate * dec!(100)
                    ));
                }
                rate
            }
        }
        _ => Decimal::ZERO,
    };

    let principal = request.principal;
    let tax_amount = principal * tax_rate;
    let financed_principal = principal + tax_amount;

    let ltv = calculate_ltv(principal, property_value);
    let pmi_required = pmi_required(ltv);

    let monthly_payment =
        calculate_monthly_payment(financed_principal, request.annual_rate, request.years);
    let monthly_pmi = if pmi_required {
        calculate_monthly_pmi(financed_principal, request.pmi_rate / dec!(100))
    } else {
        Decimal::ZERO
    };
    if monthly_pmi > Decimal::ZERO {
        warnings.push(format!(
            "LTV of {}% exceeds 80%; PMI applies until the balance reaches 78% of property value",
            (ltv * dec!(100)).round_dp(2)
        ));
    }

    let schedule = generate_amortization_schedule(
        financed_principal,
        request.annual_rate,
        request.years,
        monthly_payment,
    );

    let pmi_drop_off_month = if monthly_pmi > Decimal::ZERO {
        calculate_pmi_drop_off(&schedule, property_value)
    } else {
        None
    };
    let total_pmi_paid = calculate_total_pmi(monthly_pmi, pmi_drop_off_month);

    let total_paid = total_paid(&schedule);
    let total_interest = total_paid - financed_principal;

    let loan_info = LoanInfo {
        principal,
        financed_principal,
        annual_rate: request.annual_rate,
        years: request.years,
        state_code: request.state_code.clone(),
        include_sales_tax: request.include_sales_tax,
        tax_rate,
        tax_amount,
        ltv,
        down_payment: (property_value - principal).max(Decimal::ZERO),
        pmi_required,
        property_value,
    };

    let results = ResultsSummary {
        monthly_payment,
        monthly_pmi,
        monthly_insurance: request.monthly_insurance,
        total_monthly_payment: monthly_payment + monthly_pmi + request.monthly_insurance,
        pmi_drop_off_month,
        total_pmi_paid,
        total_paid,
        total_interest,
    };

    with_metadata(
        METHODOLOGY,
        request,
        warnings,
        start,
        LoanDetails {
            loan_info,
            results,
            schedule,
        },
    )
}

fn validate_request(request: &LoanRequest) -> LoanCalcResult<()> {
    validate_inputs(request.principal, Some(request.annual_rate), request.years).into_result()?;

    if request.pmi_rate < Decimal::ZERO || request.pmi_rate > MAX_PMI_RATE_PCT {
        return Err(LoanCalcError::InvalidInput {
            field: "pmi_rate".into(),
            reason: "PMI rate must be between 0% and 5%".into(),
        });
    }
    if request.monthly_insurance < Decimal::ZERO {
        return Err(LoanCalcError::InvalidInput {
            field: "monthly_insurance".into(),
            reason: "Monthly insurance cannot be negative".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
