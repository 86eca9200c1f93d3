//! Tunable solver and schedule-check parameters.
//!
//! The defaults are the historical calculator constants: a one-unit
//! installment tolerance, 100 bisection steps over 0–100% p.a., and a
//! one-unit allowance on the final balance. Every field can be overridden
//! from JSON (missing fields fall back to the default) or from CLI flags.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanEngineError;
use crate::types::{Money, Percent};
use crate::LoanEngineResult;

const DEFAULT_INSTALLMENT_TOLERANCE: Decimal = dec!(1);
const DEFAULT_MAX_ITERATIONS: u32 = 100;
const DEFAULT_RATE_CEILING_PCT: Decimal = dec!(100);
const DEFAULT_BALANCE_TOLERANCE: Decimal = dec!(1);
/// 100 years of monthly payments.
const DEFAULT_MAX_TENURE_MONTHS: u32 = 1200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Rate search stops once the trial installment is this close to the target.
    pub installment_tolerance: Money,
    /// Upper bound on bisection steps.
    pub max_iterations: u32,
    /// Upper end of the annual rate bracket searched by the rate solver.
    pub rate_ceiling_pct: Percent,
    /// Largest final balance accepted before the schedule is reported inconsistent.
    pub balance_tolerance: Money,
    /// Longest tenure the tenure solver will return.
    pub max_tenure_months: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            installment_tolerance: DEFAULT_INSTALLMENT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            rate_ceiling_pct: DEFAULT_RATE_CEILING_PCT,
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
            max_tenure_months: DEFAULT_MAX_TENURE_MONTHS,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> LoanEngineResult<()> {
        if self.installment_tolerance <= Decimal::ZERO {
            return Err(LoanEngineError::invalid(
                "solver.installment_tolerance",
                "Installment tolerance must be positive",
            ));
        }
        if self.max_iterations == 0 {
            return Err(LoanEngineError::invalid(
                "solver.max_iterations",
                "At least one bisection iteration is required",
            ));
        }
        if self.rate_ceiling_pct <= Decimal::ZERO {
            return Err(LoanEngineError::invalid(
                "solver.rate_ceiling_pct",
                "Rate ceiling must be positive",
            ));
        }
        if self.balance_tolerance < Decimal::ZERO {
            return Err(LoanEngineError::invalid(
                "solver.balance_tolerance",
                "Balance tolerance cannot be negative",
            ));
        }
        if self.max_tenure_months == 0 {
            return Err(LoanEngineError::invalid(
                "solver.max_tenure_months",
                "Maximum tenure must be at least 1 month",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = SolverConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.max_iterations, 100);
        assert_eq!(cfg.installment_tolerance, dec!(1));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let cfg: SolverConfig =
            serde_json::from_str(r#"{"installment_tolerance": "0.01"}"#).unwrap();
        assert_eq!(cfg.installment_tolerance, dec!(0.01));
        assert_eq!(cfg.max_iterations, 100);
        assert_eq!(cfg.rate_ceiling_pct, dec!(100));
    }

    #[test]
    fn test_zero_tolerance_rejected() {
        let cfg = SolverConfig {
            installment_tolerance: Decimal::ZERO,
            ..SolverConfig::default()
        };
        match cfg.validate().unwrap_err() {
            LoanEngineError::InvalidInput { field, .. } => {
                assert_eq!(field, "solver.installment_tolerance")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }
}
