use clap::Args;
use serde_json::{json, Value};

use loan_calc_core::tax::normalize::{is_ambiguous, normalize_tax_rate, RateFormat};

use super::loan::TaxFormatArg;

/// Arguments for tax rate normalization
#[derive(Args)]
pub struct NormalizeTaxArgs {
    /// Raw rate as returned by a provider (0.065 or 6.5)
    #[arg(long, allow_hyphen_values = true)]
    pub rate: f64,

    /// Unit of the raw rate
    #[arg(long, value_enum, default_value = "auto")]
    pub format: TaxFormatArg,
}

pub fn run_normalize_tax(args: NormalizeTaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let format: RateFormat = args.format.into();
    let rate = normalize_tax_rate(args.rate, format);

    let mut warnings = Vec::new();
    if format == RateFormat::Auto && is_ambiguous(args.rate) {
        warnings.push(format!(
            "{} is read as a decimal fraction; pass --format percent if it is a percent",
            args.rate
        ));
    }

    Ok(json!({
        "result": {
            "tax_rate": rate,
            "format": format,
        },
        "warnings": warnings,
    }))
}
