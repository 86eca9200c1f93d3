mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::loan::{LoanArgs, ProgressArgs};
use commands::portfolio::PortfolioArgs;

/// Loan amortization calculator
#[derive(Parser)]
#[command(
    name = "loanc",
    version,
    about = "Loan amortization calculator",
    long_about = "Solve for the installment, tenure or interest rate of a loan and \
                  print its month-by-month payment schedule with decimal precision. \
                  Supports amortizing (EMI) and interest-only loans, repayment \
                  progress and multi-loan summaries."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver and engine progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the missing loan parameter and build the full result
    Amortize(LoanArgs),
    /// Print only the month-by-month payment schedule
    Schedule(LoanArgs),
    /// Repayment position after a number of paid installments
    Progress(ProgressArgs),
    /// Summarize a set of loans (JSON array input)
    Portfolio(PortfolioArgs),
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

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::loan::run_amortize(args),
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Progress(args) => commands::loan::run_progress(args),
        Commands::Portfolio(args) => commands::portfolio::run_portfolio(args),
        Commands::Version => {
            println!("loanc {}", env!("CARGO_PKG_VERSION"));
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_solve_for_rate() {
        let cli = Cli::try_parse_from([
            "loanc",
            "amortize",
            "--principal",
            "100000",
            "--tenure",
            "24",
            "--installment",
            "4707.35",
            "--solve-for",
            "rate",
            "--output",
            "table",
        ])
        .unwrap();
        assert!(matches!(cli.output, OutputFormat::Table));
        match cli.command {
            Commands::Amortize(args) => {
                assert_eq!(args.tenure, Some(24));
                assert!(matches!(args.solve_for, commands::loan::SolveForArg::Rate));
            }
            _ => panic!("Expected amortize command"),
        }
    }

    #[test]
    fn test_parse_interest_only_progress() {
        let cli = Cli::try_parse_from([
            "loanc",
            "progress",
            "--principal",
            "1000000",
            "--rate",
            "10",
            "--tenure",
            "12",
            "--kind",
            "interest-only",
            "--paid-months",
            "6",
        ])
        .unwrap();
        match cli.command {
            Commands::Progress(args) => {
                assert_eq!(args.paid_months, 6);
                assert!(matches!(args.loan.kind, commands::loan::KindArg::InterestOnly));
            }
            _ => panic!("Expected progress command"),
        }
    }
}
