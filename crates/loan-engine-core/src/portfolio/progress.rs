//! Repayment progress of a single loan after a number of paid installments.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::engine::compute;
use crate::amortization::model::{LoanRequest, LoanResult};
use crate::error::LoanEngineError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::LoanEngineResult;

/// Snapshot of a loan once `paid_months` scheduled payments are made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProgress {
    pub paid_months: u32,
    pub remaining_months: u32,
    /// Reduction in outstanding principal so far.
    pub principal_repaid: Money,
    pub interest_paid: Money,
    pub amount_paid: Money,
    pub outstanding_balance: Money,
    /// Payment due next month; `None` once the loan is fully paid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_payment: Option<Money>,
    /// Share of the tenure elapsed, 0–100.
    pub progress_pct: Decimal,
}

impl LoanProgress {
    pub fn is_closed(&self) -> bool {
        self.remaining_months == 0
    }
}

/// Read the repayment position after `paid_months` payments from a
/// computed schedule.
pub fn loan_progress(result: &LoanResult, paid_months: u32) -> LoanEngineResult<LoanProgress> {
    let tenure = result.resolved.tenure_months;
    if paid_months > tenure {
        return Err(LoanEngineError::InvalidInput {
            field: "paid_months".into(),
            reason: format!("Paid months {paid_months} exceed the {tenure}-month tenure"),
        });
    }

    let paid = result
        .schedule
        .get(..paid_months as usize)
        .ok_or_else(|| LoanEngineError::InvalidInput {
            field: "schedule".into(),
            reason: format!(
                "Schedule has {} rows, fewer than the {paid_months} paid months",
                result.schedule.len()
            ),
        })?;
    let interest_paid: Money = paid.iter().map(|e| e.interest_component).sum();
    let amount_paid: Money = paid.iter().map(|e| e.payment).sum();
    let outstanding_balance = paid
        .last()
        .map(|e| e.remaining_balance)
        .unwrap_or(result.resolved.principal);

    // Schedules always have at least one month
    let progress_pct = Decimal::from(paid_months) / Decimal::from(tenure.max(1)) * dec!(100);

    Ok(LoanProgress {
        paid_months,
        remaining_months: tenure - paid_months,
        principal_repaid: result.resolved.principal - outstanding_balance,
        interest_paid,
        amount_paid,
        outstanding_balance,
        next_payment: result.schedule.get(paid_months as usize).map(|e| e.payment),
        progress_pct,
    })
}

/// Compute a loan and report its progress in the standard envelope.
pub fn track_loan(
    request: &LoanRequest,
    paid_months: u32,
) -> LoanEngineResult<ComputationOutput<LoanProgress>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = compute(request)?;
    let progress = loan_progress(&result, paid_months)?;
    if progress.is_closed() {
        warnings.push("Loan is fully repaid".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Loan progress read from the generated payment schedule",
        &serde_json::json!({
            "principal": request.principal.to_string(),
            "tenure_months": result.resolved.tenure_months,
            "installment": result.resolved.installment.to_string(),
            "paid_months": paid_months,
        }),
        warnings,
        elapsed,
        progress,
    ))
}
