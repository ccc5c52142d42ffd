mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::loan::{LoanArgs, PaymentArgs, ScheduleArgs};
use commands::tax::NormalizeTaxArgs;

/// Loan and mortgage amortization calculations
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Loan and mortgage amortization calculations",
    long_about = "A CLI for fixed-rate loan calculations with decimal precision. \
                  Computes monthly payments, full amortization schedules, LTV and \
                  PMI drop-off, and finances state sales tax into the principal."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Full loan breakdown: payment, PMI, sales tax and schedule
    Loan(LoanArgs),
    /// Monthly principal-and-interest payment
    Payment(PaymentArgs),
    /// Period-by-period amortization schedule
    Schedule(ScheduleArgs),
    /// Convert a provider tax rate to a decimal fraction
    NormalizeTax(NormalizeTaxArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Loan(args) => commands::loan::run_loan(args),
        Commands::Payment(args) => commands::loan::run_payment(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::NormalizeTax(args) => commands::tax::run_normalize_tax(args),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
