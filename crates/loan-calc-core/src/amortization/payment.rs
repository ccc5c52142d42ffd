//! Level-payment annuity math and the period-by-period amortization schedule.
//!
//! Payments are carried at full `Decimal` precision; rounding to cents is a
//! presentation concern. The final period pays off the exact outstanding
//! balance so the schedule always closes at zero.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percent, Rate};

/// One row of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 1-based period number.
    pub payment_number: u32,
    /// Total paid this period (principal + interest).
    pub payment_amount: Money,
    pub principal_payment: Money,
    pub interest_payment: Money,
    /// Outstanding balance after this payment, never negative.
    pub remaining_balance: Money,
}

/// Convert an annual percentage rate (5 = 5%) to a monthly decimal rate.
pub fn monthly_rate(annual_rate_pct: Percent) -> Rate {
    annual_rate_pct / dec!(100) / dec!(12)
}

/// Number of monthly periods in a term of `years`.
pub fn total_periods(years: u32) -> u32 {
    years.saturating_mul(12)
}

/// Fixed monthly principal-and-interest payment.
///
/// `P * r(1+r)^n / ((1+r)^n - 1)` with `r` the monthly rate and `n` the
/// number of months, evaluated as `P * r / (1 - (1+r)^-n)` to keep the
/// intermediate inside Decimal range. A zero rate degenerates to
/// straight-line `P / n`. Returns zero for a zero-length term.
pub fn calculate_monthly_payment(principal: Money, annual_rate_pct: Percent, years: u32) -> Money {
    let n = total_periods(years);
    if n == 0 {
        return Decimal::ZERO;
    }

    let r = monthly_rate(annual_rate_pct);
    if r.is_zero() {
        return principal / Decimal::from(n);
    }

    let one_plus_r = Decimal::ONE + r;
    match one_plus_r.checked_powi(i64::from(n)) {
        Some(factor) if factor.is_zero() => Decimal::ZERO,
        Some(factor) => {
            let denom = Decimal::ONE - Decimal::ONE / factor;
            if denom.is_zero() {
                return principal / Decimal::from(n);
            }
            principal * (r / denom)
        }
        // (1+r)^n beyond Decimal range: the annuity tends to interest-only.
        None => principal * r,
    }
}

/// Build the full schedule for `years * 12` periods.
///
/// Every period but the last applies `monthly_payment - interest` to
/// principal. The reported balance is clamped at zero while the working
/// balance keeps any residue so the next period's interest is computed on
/// the true amount. The last period pays exactly the outstanding balance
/// plus its interest and reports a balance of zero.
pub fn generate_amortization_schedule(
    principal: Money,
    annual_rate_pct: Percent,
    years: u32,
    monthly_payment: Money,
) -> Vec<ScheduleEntry> {
    let n = total_periods(years);
    let r = monthly_rate(annual_rate_pct);

    let mut schedule = Vec::with_capacity(n as usize);
    let mut balance = principal;

    for period in 1..=n {
        let interest = balance * r;
        let is_last_period = period == n;

        if is_last_period {
            let principal_portion = balance;
            schedule.push(ScheduleEntry {
                payment_number: period,
                payment_amount: principal_portion + interest,
                principal_payment: principal_portion,
                interest_payment: interest,
                remaining_balance: Decimal::ZERO,
            });
            balance = Decimal::ZERO;
        } else {
            let principal_portion = monthly_payment - interest;
            balance -= principal_portion;
            schedule.push(ScheduleEntry {
                payment_number: period,
                payment_amount: monthly_payment,
                principal_payment: principal_portion,
                interest_payment: interest,
                remaining_balance: balance.max(Decimal::ZERO),
            });
        }
    }

    schedule
}

/// Sum of every scheduled payment.
pub fn total_paid(schedule: &[ScheduleEntry]) -> Money {
    schedule.iter().map(|e| e.payment_amount).sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
