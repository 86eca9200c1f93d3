//! Request orchestration: validate, solve the missing parameter, build the
//! schedule, check it and total it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Instant;
use tracing::{debug, debug_span, warn};

use crate::amortization::model::{
    LoanKind, LoanRequest, LoanResult, LoanTerms, ResolvedLoan, ScheduleEntry, SolveFor,
};
use crate::amortization::schedule::generate_schedule;
use crate::amortization::solver::{solve_installment, solve_rate, solve_tenure};
use crate::config::SolverConfig;
use crate::error::LoanEngineError;
use crate::time_value::{annuity_accumulation, annuity_payment, monthly_rate};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::LoanEngineResult;

/// Lifecycle of a single request. Terminal stages are `Completed`,
/// `Rejected` and `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Validated,
    Solving,
    SolvedAlready,
    ScheduleBuilt,
    Completed,
    Rejected,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Completed | Stage::Rejected | Stage::Failed)
    }
}

fn transition(stage: Stage) {
    debug!(?stage, terminal = stage.is_terminal(), "loan request stage");
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Resolve the missing parameter and build the payment schedule.
///
/// Deterministic: identical requests produce identical results.
pub fn compute(request: &LoanRequest) -> LoanEngineResult<LoanResult> {
    let span = debug_span!(
        "compute",
        loan_kind = ?request.loan_kind,
        solve_for = ?request.solve_for
    );
    let _guard = span.enter();
    transition(Stage::Received);

    let terms = match request.validate() {
        Ok(terms) => terms,
        Err(e) => {
            transition(Stage::Rejected);
            return Err(e);
        }
    };
    transition(Stage::Validated);

    transition(if terms.needs_solving() {
        Stage::Solving
    } else {
        Stage::SolvedAlready
    });
    let resolved = match resolve(request.principal, &terms, &request.solver) {
        Ok(resolved) => resolved,
        Err(e) => {
            transition(Stage::Failed);
            return Err(e);
        }
    };

    let schedule = match build_checked_schedule(&resolved, &terms, &request.solver) {
        Ok(schedule) => schedule,
        Err(e) => {
            transition(Stage::Failed);
            return Err(e);
        }
    };
    transition(Stage::ScheduleBuilt);

    let totals = checked_total(schedule.iter().map(|e| e.interest_component)).and_then(
        |interest| checked_total(schedule.iter().map(|e| e.payment)).map(|paid| (interest, paid)),
    );
    let (total_interest, total_payment) = match totals {
        Some(totals) => totals,
        None => {
            transition(Stage::Failed);
            return Err(LoanEngineError::invalid(
                "principal",
                "Schedule totals exceed the representable range",
            ));
        }
    };

    transition(Stage::Completed);
    Ok(LoanResult {
        resolved,
        schedule,
        total_interest,
        total_payment,
    })
}

/// Evaluate independent requests, one result per request in input order.
pub fn compute_batch(requests: &[LoanRequest]) -> Vec<LoanEngineResult<LoanResult>> {
    requests.iter().map(compute).collect()
}

/// `compute` wrapped in the standard output envelope, with warnings for
/// rounding effects the caller may want to surface.
pub fn run_loan(request: &LoanRequest) -> LoanEngineResult<ComputationOutput<LoanResult>> {
    let start = Instant::now();
    let result = compute(request)?;
    let warnings = collect_warnings(request, &result);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        methodology(&result),
        &serde_json::json!({
            "loan_kind": request.loan_kind,
            "solve_for": request.solve_for,
            "principal": request.principal.to_string(),
            "monthly_rate": monthly_rate(result.resolved.annual_rate_pct).to_string(),
            "installment_tolerance": request.solver.installment_tolerance.to_string(),
            "max_iterations": request.solver.max_iterations,
            "balance_tolerance": request.solver.balance_tolerance.to_string(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve(principal: Money, terms: &LoanTerms, config: &SolverConfig) -> LoanEngineResult<ResolvedLoan> {
    let loan_kind = terms.loan_kind();
    let resolved = match *terms {
        LoanTerms::SolveInstallment {
            annual_rate_pct,
            tenure_months,
        } => ResolvedLoan {
            principal,
            annual_rate_pct,
            tenure_months,
            installment: solve_installment(principal, annual_rate_pct, tenure_months)?,
            loan_kind,
        },
        LoanTerms::SolveTenure {
            annual_rate_pct,
            installment,
        } => ResolvedLoan {
            principal,
            annual_rate_pct,
            tenure_months: solve_tenure(principal, annual_rate_pct, installment, config)?,
            installment,
            loan_kind,
        },
        LoanTerms::SolveRate {
            tenure_months,
            installment,
        } => ResolvedLoan {
            principal,
            annual_rate_pct: solve_rate(principal, tenure_months, installment, config)?,
            tenure_months,
            installment,
            loan_kind,
        },
        LoanTerms::InterestOnly {
            annual_rate_pct,
            tenure_months,
        } => ResolvedLoan {
            principal,
            annual_rate_pct,
            tenure_months,
            installment: principal
                .checked_mul(monthly_rate(annual_rate_pct))
                .ok_or_else(|| {
                    LoanEngineError::invalid(
                        "principal",
                        "Periodic interest exceeds the representable range",
                    )
                })?,
            loan_kind,
        },
    };
    debug!(
        rate = %resolved.annual_rate_pct,
        tenure = resolved.tenure_months,
        installment = %resolved.installment,
        "loan resolved"
    );
    Ok(resolved)
}

fn build_checked_schedule(
    resolved: &ResolvedLoan,
    terms: &LoanTerms,
    config: &SolverConfig,
) -> LoanEngineResult<Vec<ScheduleEntry>> {
    let schedule = generate_schedule(resolved)?;

    let residual = schedule
        .last()
        .map(|e| e.remaining_balance)
        .unwrap_or(resolved.principal);
    let allowed = residual_allowance(resolved, terms, config)?;

    if residual > allowed {
        return Err(LoanEngineError::ScheduleInconsistent {
            residual_balance: residual,
            tolerance: allowed,
        });
    }
    if residual > config.balance_tolerance {
        warn!(%residual, %allowed, "final balance carries rate search drift");
    }
    Ok(schedule)
}

fn checked_total(mut amounts: impl Iterator<Item = Money>) -> Option<Money> {
    amounts.try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
}

/// Largest final balance consistent with how the loan was resolved.
///
/// Closed-form cases must land within `balance_tolerance`. A solved rate
/// only reproduces the installment to within the search tolerance (and
/// two-decimal rounding), and that per-period gap compounds into the final
/// balance; the allowance adds exactly that compounded gap.
fn residual_allowance(
    resolved: &ResolvedLoan,
    terms: &LoanTerms,
    config: &SolverConfig,
) -> LoanEngineResult<Money> {
    if !matches!(terms, LoanTerms::SolveRate { .. }) {
        return Ok(config.balance_tolerance);
    }

    let r = monthly_rate(resolved.annual_rate_pct);
    let implied = annuity_payment(resolved.principal, r, resolved.tenure_months)?;
    let gap = (implied - resolved.installment).abs();
    let drift = annuity_accumulation(r, resolved.tenure_months)
        .and_then(|acc| gap.checked_mul(acc))
        .unwrap_or(Decimal::MAX);

    Ok(config
        .balance_tolerance
        .checked_add(drift)
        .unwrap_or(Decimal::MAX))
}

fn collect_warnings(request: &LoanRequest, result: &LoanResult) -> Vec<String> {
    let mut warnings = Vec::new();
    let resolved = &result.resolved;

    match (resolved.loan_kind, request.solve_for) {
        (LoanKind::Amortizing, SolveFor::Tenure) => {
            let repaid: Money = result.schedule.iter().map(|e| e.principal_component).sum();
            let overpayment = repaid - resolved.principal;
            if overpayment > dec!(0.005) {
                warnings.push(format!(
                    "Tenure rounded up to {} months; final installment overpays principal by {}",
                    resolved.tenure_months,
                    overpayment.round_dp(2)
                ));
            }
        }
        (LoanKind::Amortizing, SolveFor::Rate) => {
            if resolved.annual_rate_pct.is_zero() {
                warnings.push("Installment implies a 0% rate; schedule is interest-free".into());
            }
            let residual = result.final_balance();
            if residual > request.solver.balance_tolerance {
                warnings.push(format!(
                    "Solved rate {}% leaves a final balance of {} from rate search tolerance",
                    resolved.annual_rate_pct,
                    residual.round_dp(2)
                ));
            }
        }
        (LoanKind::InterestOnly, _) if resolved.annual_rate_pct.is_zero() => {
            warnings.push("Zero rate: only the balloon repayment is due".into());
        }
        _ => {}
    }

    warnings
}

fn methodology(result: &LoanResult) -> &'static str {
    match result.resolved.loan_kind {
        LoanKind::Amortizing => {
            "Level-installment amortization (annuity formula, bisection rate search)"
        }
        LoanKind::InterestOnly => {
            "Interest-only loan with balloon principal repayment"
        }
    }
}
