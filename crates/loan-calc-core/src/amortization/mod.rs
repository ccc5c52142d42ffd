//! Fixed-rate amortization: payment, schedule, LTV/PMI and input checks.

pub mod insurance;
pub mod payment;
pub mod validation;

use crate::types::{Money, Percent};
use crate::LoanCalcResult;
use payment::{calculate_monthly_payment, generate_amortization_schedule, ScheduleEntry};
use validation::validate_inputs;

/// Monthly payment for terms that pass [`validate_inputs`].
pub fn checked_monthly_payment(
    principal: Money,
    annual_rate_pct: Percent,
    years: u32,
) -> LoanCalcResult<Money> {
    validate_inputs(principal, Some(annual_rate_pct), years).into_result()?;
    Ok(calculate_monthly_payment(principal, annual_rate_pct, years))
}

/// Level-payment schedule for terms that pass [`validate_inputs`].
pub fn checked_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    years: u32,
) -> LoanCalcResult<Vec<ScheduleEntry>> {
    let payment = checked_monthly_payment(principal, annual_rate_pct, years)?;
    Ok(generate_amortization_schedule(
        principal,
        annual_rate_pct,
        years,
        payment,
    ))
}
