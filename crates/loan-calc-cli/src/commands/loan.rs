use clap::{Args, ValueEnum};
use log::info;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use loan_calc_core::amortization::payment::ScheduleEntry;
use loan_calc_core::amortization::{checked_monthly_payment, checked_schedule};
use loan_calc_core::loan::details::{compute_loan_details, LoanRequest, DEFAULT_PMI_RATE_PCT};
use loan_calc_core::tax::lookup::NoTaxLookup;
use loan_calc_core::tax::normalize::RateFormat;
use loan_calc_core::tax::static_rates::StaticTaxRates;

use crate::input;

/// Unit of the rate returned by the tax table
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TaxFormatArg {
    Auto,
    Decimal,
    Percent,
}

impl From<TaxFormatArg> for RateFormat {
    fn from(arg: TaxFormatArg) -> Self {
        match arg {
            TaxFormatArg::Auto => RateFormat::Auto,
            TaxFormatArg::Decimal => RateFormat::Decimal,
            TaxFormatArg::Percent => RateFormat::Percent,
        }
    }
}

/// Arguments for the full loan breakdown
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON or YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan amount
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (6.5 = 6.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Property value (defaults to the principal)
    #[arg(long)]
    pub property_value: Option<Decimal>,

    /// Two-letter state code for sales tax
    #[arg(long)]
    pub state: Option<String>,

    /// Finance state sales tax into the principal
    #[arg(long)]
    pub include_sales_tax: bool,

    /// Annual PMI rate in percent
    #[arg(long, default_value_t = DEFAULT_PMI_RATE_PCT)]
    pub pmi_rate: Decimal,

    /// Monthly homeowner's insurance
    #[arg(long, default_value_t = Decimal::ZERO)]
    pub monthly_insurance: Decimal,

    /// Unit of the looked-up tax rate
    #[arg(long, value_enum, default_value = "auto")]
    pub tax_format: TaxFormatArg,

    /// JSON table of state tax rates, e.g. {"CA": 7.25}
    #[arg(long, conflicts_with = "no_tax_lookup")]
    pub tax_rates: Option<String>,

    /// Skip the tax lookup entirely
    #[arg(long)]
    pub no_tax_lookup: bool,

    /// Leave the amortization schedule out of the output
    #[arg(long)]
    pub no_schedule: bool,
}

/// Arguments for the monthly payment
#[derive(Args)]
pub struct PaymentArgs {
    /// Loan amount
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Decimal,

    /// Term in years
    #[arg(long)]
    pub years: u32,
}

/// Arguments for the amortization schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Loan amount
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Decimal,

    /// Term in years
    #[arg(long)]
    pub years: u32,

    /// Decimal places shown for amounts
    #[arg(long, default_value_t = 2)]
    pub dp: u32,
}

pub fn run_loan(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: LoanRequest = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(req) = input::stdin::read_stdin()? {
        req
    } else {
        LoanRequest {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            property_value: args.property_value,
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            years: args.years.ok_or("--years is required (or provide --input)")?,
            state_code: args.state.clone(),
            include_sales_tax: args.include_sales_tax,
            pmi_rate: args.pmi_rate,
            monthly_insurance: args.monthly_insurance,
            tax_rate_format: args.tax_format.into(),
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread().build()?;
    let output = if args.no_tax_lookup {
        runtime.block_on(compute_loan_details(&request, &NoTaxLookup))?
    } else {
        let rates = match args.tax_rates {
            Some(ref path) => StaticTaxRates::from_json(&input::file::read_text(path)?)?,
            None => StaticTaxRates::default(),
        };
        info!("using static tax table with {} entries", rates.len());
        runtime.block_on(compute_loan_details(&request, &rates))?
    };

    let mut value = serde_json::to_value(output)?;
    if args.no_schedule {
        if let Some(result) = value.get_mut("result").and_then(Value::as_object_mut) {
            result.remove("schedule");
        }
    }
    Ok(value)
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment = checked_monthly_payment(args.principal, args.rate, args.years)?;
    Ok(json!({
        "result": {
            "monthly_payment": payment,
            "periods": args.years * 12,
        }
    }))
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rows: Vec<ScheduleEntry> = checked_schedule(args.principal, args.rate, args.years)?
        .into_iter()
        .map(|e| round_entry(e, args.dp))
        .collect();
    Ok(serde_json::to_value(rows)?)
}

/// Rounding for display only; the schedule itself is computed unrounded.
fn round_entry(entry: ScheduleEntry, dp: u32) -> ScheduleEntry {
    ScheduleEntry {
        payment_amount: entry.payment_amount.round_dp(dp),
        principal_payment: entry.principal_payment.round_dp(dp),
        interest_payment: entry.interest_payment.round_dp(dp),
        remaining_balance: entry.remaining_balance.round_dp(dp),
        ..entry
    }
}
