//! Aggregate position across several loans: amounts borrowed, outstanding
//! and due each month.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::amortization::engine::compute;
use crate::amortization::model::{LoanKind, LoanRequest};
use crate::error::LoanEngineError;
use crate::portfolio::progress::{loan_progress, LoanProgress};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::LoanEngineResult;

// ---------------------------------------------------------------------------
// Input / Output Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioLoan {
    pub name: String,
    pub request: LoanRequest,
    /// Installments already paid.
    #[serde(default)]
    pub paid_months: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioLine {
    pub name: String,
    pub loan_kind: LoanKind,
    pub principal: Money,
    pub annual_rate_pct: Percent,
    pub tenure_months: u32,
    pub installment: Money,
    pub total_interest: Money,
    pub progress: LoanProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub loan_count: usize,
    pub active_loans: usize,
    pub total_principal: Money,
    pub total_outstanding: Money,
    /// Sum of the level installments of loans with months remaining.
    pub total_monthly_installment: Money,
    /// Scheduled interest not yet paid.
    pub total_interest_remaining: Money,
    pub loans: Vec<PortfolioLine>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute every loan and roll the results up. Fails on the first loan
/// that fails, naming it in the error.
pub fn summarize_portfolio(
    loans: &[PortfolioLoan],
) -> LoanEngineResult<ComputationOutput<PortfolioSummary>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if loans.is_empty() {
        return Err(LoanEngineError::InvalidInput {
            field: "loans".into(),
            reason: "At least one loan is required".into(),
        });
    }

    let mut lines: Vec<PortfolioLine> = Vec::with_capacity(loans.len());
    for loan in loans {
        let line = summarize_loan(loan).map_err(|e| label_error(&loan.name, e))?;
        if line.progress.is_closed() {
            warnings.push(format!("{} is fully repaid", line.name));
        }
        lines.push(line);
    }

    let active_loans = lines.iter().filter(|l| !l.progress.is_closed()).count();
    let total_principal: Money = lines.iter().map(|l| l.principal).sum();
    let total_outstanding: Money = lines.iter().map(|l| l.progress.outstanding_balance).sum();
    let total_monthly_installment: Money = lines
        .iter()
        .filter(|l| !l.progress.is_closed())
        .map(|l| l.installment)
        .sum();
    let total_interest_remaining: Money = lines
        .iter()
        .map(|l| (l.total_interest - l.progress.interest_paid).max(Decimal::ZERO))
        .sum();

    debug!(
        loans = lines.len(),
        active = active_loans,
        %total_outstanding,
        "portfolio summarized"
    );

    let summary = PortfolioSummary {
        loan_count: lines.len(),
        active_loans,
        total_principal,
        total_outstanding,
        total_monthly_installment,
        total_interest_remaining,
        loans: lines,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio roll-up of computed loan schedules",
        &serde_json::json!({
            "loan_count": summary.loan_count,
            "names": loans.iter().map(|l| l.name.as_str()).collect::<Vec<_>>(),
        }),
        warnings,
        elapsed,
        summary,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn summarize_loan(loan: &PortfolioLoan) -> LoanEngineResult<PortfolioLine> {
    let result = compute(&loan.request)?;
    let progress = loan_progress(&result, loan.paid_months)?;
    Ok(PortfolioLine {
        name: loan.name.clone(),
        loan_kind: result.resolved.loan_kind,
        principal: result.resolved.principal,
        annual_rate_pct: result.resolved.annual_rate_pct,
        tenure_months: result.resolved.tenure_months,
        installment: result.resolved.installment,
        total_interest: result.total_interest,
        progress,
    })
}

/// Prefix input errors with the loan name so the caller can find the
/// offending entry; numeric failures pass through unchanged.
fn label_error(name: &str, err: LoanEngineError) -> LoanEngineError {
    match err {
        LoanEngineError::InvalidInput { field, reason } => LoanEngineError::InvalidInput {
            field: format!("{name}.{field}"),
            reason,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book() -> Vec<PortfolioLoan> {
        vec![
            PortfolioLoan {
                name: "Home Loan".into(),
                request: LoanRequest::amortizing(dec!(5000000), dec!(8.5), 240),
                paid_months: 23,
            },
            PortfolioLoan {
                name: "Personal Loan".into(),
                request: LoanRequest::amortizing(dec!(300000), dec!(12), 36),
                paid_months: 18,
            },
            PortfolioLoan {
                name: "Business Loan".into(),
                request: LoanRequest::interest_only(dec!(1000000), dec!(10), 12),
                paid_months: 6,
            },
        ]
    }

    #[test]
    fn test_summary_totals() {
        let out = summarize_portfolio(&book()).unwrap();
        let s = &out.result;
        assert_eq!(s.loan_count, 3);
        assert_eq!(s.active_loans, 3);
        assert_eq!(s.total_principal, dec!(6300000));

        let outstanding: Money = s.loans.iter().map(|l| l.progress.outstanding_balance).sum();
        assert_eq!(s.total_outstanding, outstanding);

        // Home ≈ 43391, personal ≈ 9964, business interest ≈ 8333
        assert!(
            (s.total_monthly_installment - dec!(61688)).abs() < dec!(2),
            "Expected ~61688 monthly, got {}",
            s.total_monthly_installment
        );
        // Interest-only principal is untouched before the balloon
        assert_eq!(s.loans[2].progress.outstanding_balance, dec!(1000000));
    }

    #[test]
    fn test_closed_loan_excluded_from_monthly_total() {
        let mut loans = book();
        loans[1].paid_months = 36;
        let out = summarize_portfolio(&loans).unwrap();
        assert_eq!(out.result.active_loans, 2);
        assert!(out.warnings.iter().any(|w| w.contains("Personal Loan")));
        assert!(out.result.total_monthly_installment < dec!(52000));
    }

    #[test]
    fn test_empty_portfolio_rejected() {
        assert!(matches!(
            summarize_portfolio(&[]),
            Err(LoanEngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_failing_loan_is_named() {
        let mut loans = book();
        loans[0].paid_months = 500;
        match summarize_portfolio(&loans).unwrap_err() {
            LoanEngineError::InvalidInput { field, .. } => {
                assert_eq!(field, "Home Loan.paid_months")
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_portfolio_loan_deserializes_without_paid_months() {
        let loan: PortfolioLoan = serde_json::from_str(
            r#"{"name": "Car", "request": {"principal": 800000, "annual_rate_pct": 9, "tenure_months": 60}}"#,
        )
        .unwrap();
        assert_eq!(loan.paid_months, 0);
    }
}
