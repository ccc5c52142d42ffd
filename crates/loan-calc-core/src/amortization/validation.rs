//! Range checks applied before any loan terms reach the engine.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanCalcError;
use crate::types::{Money, Percent};
use crate::LoanCalcResult;

/// Largest principal accepted by the calculator.
pub const MAX_PRINCIPAL: Money = dec!(100_000_000);

/// Highest annual rate accepted, in percent.
pub const MAX_ANNUAL_RATE_PCT: Percent = dec!(100);

/// Longest term accepted, in years.
pub const MAX_YEARS: u32 = 50;

/// Outcome of range-checking loan inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Input that failed, for callers that map the message to a form field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationResult {
    fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
            field: None,
        }
    }

    fn reject(field: &str, message: &str) -> Self {
        Self {
            is_valid: false,
            error: Some(message.to_string()),
            field: Some(field.to_string()),
        }
    }

    /// Convert a rejection into `LoanCalcError::InvalidInput`.
    pub fn into_result(self) -> LoanCalcResult<()> {
        if self.is_valid {
            return Ok(());
        }
        Err(LoanCalcError::InvalidInput {
            field: self.field.unwrap_or_default(),
            reason: self.error.unwrap_or_default(),
        })
    }
}

/// Range-check principal, annual rate (percent) and term.
///
/// Checks run in a fixed order and the first failure wins, so the message
/// for a given input is deterministic. A missing rate is rejected.
pub fn validate_inputs(
    principal: Money,
    annual_rate_pct: Option<Percent>,
    years: u32,
) -> ValidationResult {
    if principal <= Decimal::ZERO {
        return ValidationResult::reject("principal", "Loan amount must be greater than 0");
    }
    let rate = match annual_rate_pct {
        Some(r) if r >= Decimal::ZERO => r,
        _ => {
            return ValidationResult::reject(
                "annual_rate",
                "Interest rate must be 0 or greater",
            )
        }
    };
    if years == 0 {
        return ValidationResult::reject("years", "Loan term must be greater than 0");
    }
    if principal > MAX_PRINCIPAL {
        return ValidationResult::reject("principal", "Loan amount is too large");
    }
    if rate > MAX_ANNUAL_RATE_PCT {
        return ValidationResult::reject("annual_rate", "Interest rate is too high");
    }
    if years > MAX_YEARS {
        return ValidationResult::reject("years", "Loan term is too long");
    }
    ValidationResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_inputs() {
        let v = validate_inputs(dec!(200_000), Some(dec!(5)), 30);
        assert_eq!(v, ValidationResult::ok());
        assert!(v.into_result().is_ok());
    }

    #[test]
    fn test_boundaries_accepted() {
        assert!(validate_inputs(MAX_PRINCIPAL, Some(Decimal::ZERO), 1).is_valid);
        assert!(validate_inputs(dec!(0.01), Some(MAX_ANNUAL_RATE_PCT), MAX_YEARS).is_valid);
    }

    #[test]
    fn test_principal_rejected() {
        let v = validate_inputs(Decimal::ZERO, Some(dec!(5)), 30);
        assert!(!v.is_valid);
        assert!(v.error.unwrap().contains("must be greater than 0"));

        let v = validate_inputs(dec!(100_000_001), Some(dec!(5)), 30);
        assert!(v.error.unwrap().contains("too large"));
    }

    #[test]
    fn test_rate_rejected() {
        let v = validate_inputs(dec!(1000), None, 30);
        assert_eq!(v.field.as_deref(), Some("annual_rate"));
        let v = validate_inputs(dec!(1000), Some(dec!(-0.5)), 30);
        assert_eq!(v.field.as_deref(), Some("annual_rate"));
        let v = validate_inputs(dec!(1000), Some(dec!(100.01)), 30);
        assert!(v.error.unwrap().contains("too high"));
    }

    #[test]
    fn test_years_rejected() {
        let v = validate_inputs(dec!(1000), Some(dec!(5)), 0);
        assert_eq!(v.field.as_deref(), Some("years"));
        let v = validate_inputs(dec!(1000), Some(dec!(5)), 51);
        assert!(v.error.unwrap().contains("too long"));
    }

    #[test]
    fn test_first_failure_wins() {
        // Zero principal is reported before the out-of-range rate and term.
        let v = validate_inputs(Decimal::ZERO, Some(dec!(500)), 0);
        assert_eq!(v.field.as_deref(), Some("principal"));
        // Lower-bound checks run before upper-bound checks.
        let v = validate_inputs(dec!(500_000_000), Some(dec!(5)), 0);
        assert_eq!(v.field.as_deref(), Some("years"));
    }

    #[test]
    fn test_into_result_carries_field() {
        match validate_inputs(dec!(1000), Some(dec!(5)), 99).into_result() {
            Err(LoanCalcError::InvalidInput { field, reason }) => {
                assert_eq!(field, "years");
                assert!(reason.contains("too long"));
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }
}
