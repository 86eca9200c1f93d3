//! Loan parameter and result types shared by the solver, schedule and engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::error::LoanEngineError;
use crate::types::{Money, Percent};
use crate::LoanEngineResult;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanKind {
    /// Fixed installment repays principal and interest every period.
    #[default]
    Amortizing,
    /// Interest every period, principal as a balloon on the last period.
    InterestOnly,
}

/// Which amortizing-loan parameter the engine derives from the other two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveFor {
    #[default]
    Installment,
    Tenure,
    Rate,
}

/// Raw loan parameters as supplied by the caller.
///
/// The field named by `solve_for` may be left empty and is ignored when
/// present. `solve_for` has no effect on interest-only loans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rate_pct: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenure_months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment: Option<Money>,
    #[serde(default)]
    pub loan_kind: LoanKind,
    #[serde(default)]
    pub solve_for: SolveFor,
    #[serde(default)]
    pub solver: SolverConfig,
}

impl LoanRequest {
    /// Amortizing loan with the installment to be solved.
    pub fn amortizing(principal: Money, annual_rate_pct: Percent, tenure_months: u32) -> Self {
        LoanRequest {
            principal,
            annual_rate_pct: Some(annual_rate_pct),
            tenure_months: Some(tenure_months),
            installment: None,
            loan_kind: LoanKind::Amortizing,
            solve_for: SolveFor::Installment,
            solver: SolverConfig::default(),
        }
    }

    /// Amortizing loan whose tenure follows from a fixed installment.
    pub fn for_tenure(principal: Money, annual_rate_pct: Percent, installment: Money) -> Self {
        LoanRequest {
            principal,
            annual_rate_pct: Some(annual_rate_pct),
            tenure_months: None,
            installment: Some(installment),
            loan_kind: LoanKind::Amortizing,
            solve_for: SolveFor::Tenure,
            solver: SolverConfig::default(),
        }
    }

    /// Amortizing loan whose rate is implied by tenure and installment.
    pub fn for_rate(principal: Money, tenure_months: u32, installment: Money) -> Self {
        LoanRequest {
            principal,
            annual_rate_pct: None,
            tenure_months: Some(tenure_months),
            installment: Some(installment),
            loan_kind: LoanKind::Amortizing,
            solve_for: SolveFor::Rate,
            solver: SolverConfig::default(),
        }
    }

    pub fn interest_only(principal: Money, annual_rate_pct: Percent, tenure_months: u32) -> Self {
        LoanRequest {
            principal,
            annual_rate_pct: Some(annual_rate_pct),
            tenure_months: Some(tenure_months),
            installment: None,
            loan_kind: LoanKind::InterestOnly,
            solve_for: SolveFor::Installment,
            solver: SolverConfig::default(),
        }
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Check field presence and sign, producing the typed terms the engine
    /// dispatches on.
    pub fn validate(&self) -> LoanEngineResult<LoanTerms> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanEngineError::invalid(
                "principal",
                "Principal must be positive",
            ));
        }
        self.solver.validate()?;

        let terms = match (self.loan_kind, self.solve_for) {
            (LoanKind::InterestOnly, _) => LoanTerms::InterestOnly {
                annual_rate_pct: self.require_rate()?,
                tenure_months: self.require_tenure()?,
            },
            (LoanKind::Amortizing, SolveFor::Installment) => LoanTerms::SolveInstallment {
                annual_rate_pct: self.require_rate()?,
                tenure_months: self.require_tenure()?,
            },
            (LoanKind::Amortizing, SolveFor::Tenure) => LoanTerms::SolveTenure {
                annual_rate_pct: self.require_rate()?,
                installment: self.require_installment()?,
            },
            (LoanKind::Amortizing, SolveFor::Rate) => LoanTerms::SolveRate {
                tenure_months: self.require_tenure()?,
                installment: self.require_installment()?,
            },
        };
        Ok(terms)
    }

    fn require_rate(&self) -> LoanEngineResult<Percent> {
        match self.annual_rate_pct {
            None => Err(LoanEngineError::invalid(
                "annual_rate_pct",
                "Annual rate is required",
            )),
            Some(r) if r < Decimal::ZERO => Err(LoanEngineError::invalid(
                "annual_rate_pct",
                "Annual rate cannot be negative",
            )),
            Some(r) => Ok(r),
        }
    }

    fn require_tenure(&self) -> LoanEngineResult<u32> {
        match self.tenure_months {
            None => Err(LoanEngineError::invalid(
                "tenure_months",
                "Tenure is required",
            )),
            Some(0) => Err(LoanEngineError::invalid(
                "tenure_months",
                "Tenure must be at least 1 month",
            )),
            Some(n) => Ok(n),
        }
    }

    fn require_installment(&self) -> LoanEngineResult<Money> {
        match self.installment {
            None => Err(LoanEngineError::invalid(
                "installment",
                "Installment is required",
            )),
            Some(e) if e <= Decimal::ZERO => Err(LoanEngineError::invalid(
                "installment",
                "Installment must be positive",
            )),
            Some(e) => Ok(e),
        }
    }
}

/// Validated request: exactly the two known parameters for each case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoanTerms {
    SolveInstallment {
        annual_rate_pct: Percent,
        tenure_months: u32,
    },
    SolveTenure {
        annual_rate_pct: Percent,
        installment: Money,
    },
    SolveRate {
        tenure_months: u32,
        installment: Money,
    },
    InterestOnly {
        annual_rate_pct: Percent,
        tenure_months: u32,
    },
}

impl LoanTerms {
    pub fn loan_kind(&self) -> LoanKind {
        match self {
            LoanTerms::InterestOnly { .. } => LoanKind::InterestOnly,
            _ => LoanKind::Amortizing,
        }
    }

    /// Whether a solver must run before the schedule can be built.
    pub fn needs_solving(&self) -> bool {
        !matches!(self, LoanTerms::InterestOnly { .. })
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Fully determined loan parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLoan {
    pub principal: Money,
    pub annual_rate_pct: Percent,
    pub tenure_months: u32,
    /// Level installment for amortizing loans, periodic interest for
    /// interest-only loans.
    pub installment: Money,
    pub loan_kind: LoanKind,
}

/// One row of the payment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub month: u32,
    pub payment: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanResult {
    pub resolved: ResolvedLoan,
    pub schedule: Vec<ScheduleEntry>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl LoanResult {
    /// Remaining balance after the last scheduled payment.
    pub fn final_balance(&self) -> Money {
        self.schedule
            .last()
            .map(|e| e.remaining_balance)
            .unwrap_or(self.resolved.principal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_installment_terms() {
        let req = LoanRequest::amortizing(dec!(100000), dec!(12), 24);
        assert_eq!(
            req.validate().unwrap(),
            LoanTerms::SolveInstallment {
                annual_rate_pct: dec!(12),
                tenure_months: 24,
            }
        );
    }

    #[test]
    fn test_solved_field_is_ignored() {
        let mut req = LoanRequest::for_tenure(dec!(100000), dec!(12), dec!(5000));
        req.tenure_months = Some(0);
        assert!(matches!(
            req.validate().unwrap(),
            LoanTerms::SolveTenure { .. }
        ));
    }

    #[test]
    fn test_missing_installment_rejected() {
        let mut req = LoanRequest::for_rate(dec!(100000), 24, dec!(5000));
        req.installment = None;
        match req.validate().unwrap_err() {
            LoanEngineError::InvalidInput { field, .. } => assert_eq!(field, "installment"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_rate_rejected() {
        let req = LoanRequest::amortizing(dec!(100000), dec!(-1), 24);
        assert!(matches!(
            req.validate(),
            Err(LoanEngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_zero_principal_rejected() {
        let req = LoanRequest::interest_only(Decimal::ZERO, dec!(10), 12);
        match req.validate().unwrap_err() {
            LoanEngineError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_interest_only_ignores_solve_for() {
        let mut req = LoanRequest::interest_only(dec!(1000000), dec!(10), 12);
        req.solve_for = SolveFor::Rate;
        let terms = req.validate().unwrap();
        assert_eq!(terms.loan_kind(), LoanKind::InterestOnly);
        assert!(!terms.needs_solving());
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let req: LoanRequest = serde_json::from_str(
            r#"{"principal": "100000", "annual_rate_pct": 12, "tenure_months": 24}"#,
        )
        .unwrap();
        assert_eq!(req.loan_kind, LoanKind::Amortizing);
        assert_eq!(req.solve_for, SolveFor::Installment);
        assert_eq!(req.solver, SolverConfig::default());
    }
}
