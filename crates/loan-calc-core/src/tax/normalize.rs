//! Canonicalize provider tax rates to a decimal fraction.
//!
//! Providers disagree on units: some return 0.065, others 6.5. In `Auto`
//! mode anything above 1 is read as a percent and anything at or below 1 as
//! a decimal fraction, so 0.5 means 50%, not 0.5%.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Rate;

/// Unit a raw tax rate is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateFormat {
    /// Infer from magnitude: `> 1` is a percent, otherwise a decimal.
    #[default]
    Auto,
    Decimal,
    Percent,
}

/// Convert a raw provider rate to a decimal fraction.
///
/// Non-finite, non-positive or unrepresentable values yield zero.
pub fn normalize_tax_rate(raw_rate: f64, format: RateFormat) -> Rate {
    if !raw_rate.is_finite() || raw_rate <= 0.0 {
        return Decimal::ZERO;
    }
    let Some(rate) = Decimal::from_f64(raw_rate) else {
        return Decimal::ZERO;
    };

    match format {
        RateFormat::Decimal => rate,
        RateFormat::Percent => rate / dec!(100),
        RateFormat::Auto if rate > Decimal::ONE => rate / dec!(100),
        RateFormat::Auto => rate,
    }
}

/// True when `Auto` would read `raw_rate` as a decimal fraction although it
/// could plausibly be a small percent.
pub fn is_ambiguous(raw_rate: f64) -> bool {
    raw_rate.is_finite() && raw_rate > 0.0 && raw_rate <= 1.0
}
