use clap::Args;
use serde_json::Value;

use loan_engine_core::portfolio::{summarize_portfolio, PortfolioLoan};

use crate::input;

/// Arguments for a multi-loan summary
#[derive(Args, Debug)]
pub struct PortfolioArgs {
    /// Path to JSON or YAML file holding an array of loans
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_portfolio(args: PortfolioArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loans: Vec<PortfolioLoan> = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        return Err("--input <file.json> or stdin required for portfolio summary".into());
    };

    let result = summarize_portfolio(&loans)?;
    Ok(serde_json::to_value(result)?)
}
