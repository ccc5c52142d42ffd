//! Loan-to-value and private mortgage insurance (PMI) derivations.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::payment::ScheduleEntry;
use crate::types::{Money, Rate};

/// LTV above which PMI is required.
pub const PMI_REQUIRED_LTV: Rate = dec!(0.80);

/// LTV at which PMI is cancelled, measured against the original property value.
pub const PMI_CANCEL_LTV: Rate = dec!(0.78);

/// Loan-to-value ratio. Zero when the property value is not positive.
pub fn calculate_ltv(loan_amount: Money, property_value: Money) -> Rate {
    if property_value <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    loan_amount / property_value
}

/// Whether an LTV ratio requires PMI.
pub fn pmi_required(ltv: Rate) -> bool {
    ltv > PMI_REQUIRED_LTV
}

/// Monthly PMI premium from an annual decimal rate (0.008 = 0.8%).
pub fn calculate_monthly_pmi(loan_amount: Money, annual_pmi_rate: Rate) -> Money {
    if annual_pmi_rate <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    loan_amount * annual_pmi_rate / dec!(12)
}

/// First payment number whose remaining balance is at or below 78% of the
/// property value, or `None` if the property value is not positive or the
/// threshold is never reached.
pub fn calculate_pmi_drop_off(schedule: &[ScheduleEntry], property_value: Money) -> Option<u32> {
    if property_value <= Decimal::ZERO {
        return None;
    }
    let target = property_value * PMI_CANCEL_LTV;
    schedule
        .iter()
        .find(|e| e.remaining_balance <= target)
        .map(|e| e.payment_number)
}

/// Total PMI paid until drop-off.
pub fn calculate_total_pmi(monthly_pmi: Money, drop_off_month: Option<u32>) -> Money {
    match drop_off_month {
        Some(month) if month > 0 && monthly_pmi > Decimal::ZERO => {
            monthly_pmi * Decimal::from(month)
        }
        _ => Decimal::ZERO,
    }
}
