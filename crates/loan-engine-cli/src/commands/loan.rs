use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::debug;

use loan_engine_core::amortization::{LoanKind, LoanRequest, SolveFor};
use loan_engine_core::portfolio::track_loan;
use loan_engine_core::{compute, run_loan, SolverConfig};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Amortizing,
    InterestOnly,
}

impl From<KindArg> for LoanKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Amortizing => LoanKind::Amortizing,
            KindArg::InterestOnly => LoanKind::InterestOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SolveForArg {
    Installment,
    Tenure,
    Rate,
}

impl From<SolveForArg> for SolveFor {
    fn from(s: SolveForArg) -> Self {
        match s {
            SolveForArg::Installment => SolveFor::Installment,
            SolveForArg::Tenure => SolveFor::Tenure,
            SolveForArg::Rate => SolveFor::Rate,
        }
    }
}

/// Loan parameters shared by every single-loan command
#[derive(Args, Debug)]
pub struct LoanArgs {
    /// Path to JSON or YAML request file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 12 for 12% p.a.)
    #[arg(long, alias = "interest")]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Monthly installment (EMI)
    #[arg(long, alias = "emi")]
    pub installment: Option<Decimal>,

    /// Loan type
    #[arg(long, value_enum, default_value = "amortizing")]
    pub kind: KindArg,

    /// Parameter to solve for (amortizing loans only)
    #[arg(long, value_enum, default_value = "installment")]
    pub solve_for: SolveForArg,

    /// Rate search stops when the trial installment is within this amount
    #[arg(long)]
    pub installment_tolerance: Option<Decimal>,

    /// Maximum bisection iterations for the rate search
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Upper bound of the annual rate searched, in percent
    #[arg(long)]
    pub rate_ceiling: Option<Decimal>,

    /// Largest final balance accepted in the schedule
    #[arg(long)]
    pub balance_tolerance: Option<Decimal>,
}

impl LoanArgs {
    /// Build the request from a file, piped JSON, or flags, in that order.
    /// Solver flags override whichever source supplied the request.
    pub fn to_request(&self) -> Result<LoanRequest, Box<dyn std::error::Error>> {
        let (mut request, source): (LoanRequest, &str) = if let Some(ref path) = self.input {
            (input::file::read_input(path)?, "file")
        } else if let Some(req) = input::stdin::read_stdin()? {
            (req, "stdin")
        } else {
            (self.request_from_flags()?, "flags")
        };
        debug!(source, solve_for = ?request.solve_for, "loan request loaded");
        self.apply_solver_overrides(&mut request.solver);
        Ok(request)
    }

    fn request_from_flags(&self) -> Result<LoanRequest, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let loan_kind = LoanKind::from(self.kind);
        let solve_for = SolveFor::from(self.solve_for);

        // Name the missing flag here; the engine reports field names instead
        if loan_kind == LoanKind::Amortizing {
            match solve_for {
                SolveFor::Installment => {
                    self.rate.ok_or("--rate is required to solve for installment")?;
                    self.tenure.ok_or("--tenure is required to solve for installment")?;
                }
                SolveFor::Tenure => {
                    self.rate.ok_or("--rate is required to solve for tenure")?;
                    self.installment
                        .ok_or("--installment is required to solve for tenure")?;
                }
                SolveFor::Rate => {
                    self.tenure.ok_or("--tenure is required to solve for rate")?;
                    self.installment
                        .ok_or("--installment is required to solve for rate")?;
                }
            }
        }

        Ok(LoanRequest {
            principal,
            annual_rate_pct: self.rate,
            tenure_months: self.tenure,
            installment: self.installment,
            loan_kind,
            solve_for,
            solver: SolverConfig::default(),
        })
    }

    fn apply_solver_overrides(&self, solver: &mut SolverConfig) {
        if let Some(tol) = self.installment_tolerance {
            solver.installment_tolerance = tol;
        }
        if let Some(iters) = self.max_iterations {
            solver.max_iterations = iters;
        }
        if let Some(ceiling) = self.rate_ceiling {
            solver.rate_ceiling_pct = ceiling;
        }
        if let Some(tol) = self.balance_tolerance {
            solver.balance_tolerance = tol;
        }
    }
}

/// Arguments for loan progress
#[derive(Args, Debug)]
pub struct ProgressArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Installments already paid
    #[arg(long)]
    pub paid_months: u32,
}

pub fn run_amortize(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = args.to_request()?;
    let result = run_loan(&request)?;
    Ok(serde_json::to_value(result)?)
}

/// Schedule rows only, as a bare array so table and CSV output print one
/// row per month.
pub fn run_schedule(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = args.to_request()?;
    let result = compute(&request)?;
    Ok(serde_json::to_value(result.schedule)?)
}

pub fn run_progress(args: ProgressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = args.loan.to_request()?;
    let result = track_loan(&request, args.paid_months)?;
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flags() -> LoanArgs {
        LoanArgs {
            input: None,
            principal: Some(dec!(100000)),
            rate: Some(dec!(12)),
            tenure: Some(24),
            installment: None,
            kind: KindArg::Amortizing,
            solve_for: SolveForArg::Installment,
            installment_tolerance: None,
            max_iterations: None,
            rate_ceiling: None,
            balance_tolerance: None,
        }
    }

    #[test]
    fn test_request_from_flags() {
        let req = flags().request_from_flags().unwrap();
        assert_eq!(req.principal, dec!(100000));
        assert_eq!(req.annual_rate_pct, Some(dec!(12)));
        assert_eq!(req.solve_for, SolveFor::Installment);
    }

    #[test]
    fn test_missing_installment_flag_named() {
        let mut args = flags();
        args.solve_for = SolveForArg::Tenure;
        let err = args.request_from_flags().unwrap_err();
        assert!(err.to_string().contains("--installment"));
    }

    #[test]
    fn test_missing_principal_flag() {
        let mut args = flags();
        args.principal = None;
        assert!(args.request_from_flags().is_err());
    }

    #[test]
    fn test_solver_overrides() {
        let mut args = flags();
        args.installment_tolerance = Some(dec!(0.01));
        args.max_iterations = Some(200);
        let mut solver = SolverConfig::default();
        args.apply_solver_overrides(&mut solver);
        assert_eq!(solver.installment_tolerance, dec!(0.01));
        assert_eq!(solver.max_iterations, 200);
        assert_eq!(solver.balance_tolerance, dec!(1));
    }

    #[test]
    fn test_interest_only_kind_maps() {
        assert_eq!(LoanKind::from(KindArg::InterestOnly), LoanKind::InterestOnly);
        assert_eq!(SolveFor::from(SolveForArg::Rate), SolveFor::Rate);
    }
}
