//! Solvers for the unknown parameter of an amortizing loan.
//!
//! Installment and tenure have closed forms. The rate has none, so it is
//! found by bisection over the annual rate: the annuity payment is strictly
//! increasing in the rate, which keeps the bracket valid at every step
//! without needing a derivative near r = 0.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;
use tracing::debug;

use crate::config::SolverConfig;
use crate::error::LoanEngineError;
use crate::time_value::{annuity_payment, monthly_rate};
use crate::types::{Money, Percent};
use crate::LoanEngineResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// A fractional tenure this close to a whole month is treated as that month.
const TENURE_SNAP_EPSILON: Decimal = dec!(0.000000001);

/// Solved rates are quoted to two decimal places.
const RATE_DECIMAL_PLACES: u32 = 2;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level monthly installment for `principal` over `tenure_months` at
/// `annual_rate_pct` percent per year.
pub fn solve_installment(
    principal: Money,
    annual_rate_pct: Percent,
    tenure_months: u32,
) -> LoanEngineResult<Money> {
    require_positive_principal(principal)?;
    require_non_negative_rate(annual_rate_pct)?;
    if tenure_months == 0 {
        return Err(LoanEngineError::invalid(
            "tenure_months",
            "Tenure must be at least 1 month",
        ));
    }

    annuity_payment(principal, monthly_rate(annual_rate_pct), tenure_months)
}

/// Number of whole months needed to repay `principal` with a fixed
/// `installment`, rounded up.
pub fn solve_tenure(
    principal: Money,
    annual_rate_pct: Percent,
    installment: Money,
    config: &SolverConfig,
) -> LoanEngineResult<u32> {
    require_positive_principal(principal)?;
    require_non_negative_rate(annual_rate_pct)?;
    if installment <= Decimal::ZERO {
        return Err(LoanEngineError::invalid(
            "installment",
            "Installment must be positive",
        ));
    }

    let r = monthly_rate(annual_rate_pct);

    let fractional = if r.is_zero() {
        principal / installment
    } else {
        let first_period_interest = principal.checked_mul(r).ok_or_else(|| {
            LoanEngineError::invalid(
                "principal",
                "Periodic interest exceeds the representable range",
            )
        })?;
        if installment <= first_period_interest {
            return Err(LoanEngineError::EmiTooSmall {
                installment,
                first_period_interest,
            });
        }
        // n = ln(E / (E - P*r)) / ln(1 + r)
        let ratio = installment
            .checked_div(installment - first_period_interest)
            .ok_or_else(|| {
                LoanEngineError::invalid(
                    "installment",
                    format!(
                        "Implied tenure exceeds the maximum of {} months",
                        config.max_tenure_months
                    ),
                )
            })?;
        let numerator = ratio.checked_ln().ok_or_else(|| {
            LoanEngineError::invalid("installment", "Tenure logarithm is undefined")
        })?;
        let denominator = (Decimal::ONE + r).checked_ln().ok_or_else(|| {
            LoanEngineError::invalid("annual_rate_pct", "Rate logarithm is undefined")
        })?;
        if denominator.is_zero() {
            return Err(LoanEngineError::invalid(
                "annual_rate_pct",
                "Rate too small to distinguish from zero",
            ));
        }
        numerator / denominator
    };

    let nearest = fractional.round();
    let snapped = if (fractional - nearest).abs() < TENURE_SNAP_EPSILON {
        nearest
    } else {
        fractional.ceil()
    };

    let tenure = snapped
        .to_u32()
        .filter(|n| *n <= config.max_tenure_months)
        .ok_or_else(|| {
            LoanEngineError::invalid(
                "installment",
                format!(
                    "Implied tenure of {} months exceeds the maximum of {}",
                    snapped, config.max_tenure_months
                ),
            )
        })?;

    debug!(%fractional, tenure, "tenure solved");
    Ok(tenure.max(1))
}

/// Annual rate (percent, two decimal places) at which `installment` repays
/// `principal` over `tenure_months`.
pub fn solve_rate(
    principal: Money,
    tenure_months: u32,
    installment: Money,
    config: &SolverConfig,
) -> LoanEngineResult<Percent> {
    require_positive_principal(principal)?;
    if tenure_months == 0 {
        return Err(LoanEngineError::invalid(
            "tenure_months",
            "Tenure must be at least 1 month",
        ));
    }
    if installment <= Decimal::ZERO {
        return Err(LoanEngineError::invalid(
            "installment",
            "Installment must be positive",
        ));
    }

    let tolerance = config.installment_tolerance;
    let mut lo = Decimal::ZERO;
    let mut hi = config.rate_ceiling_pct;

    // Check that the target is bracketed.
    let floor_installment = installment_at(principal, lo, tenure_months)?;
    let ceiling_installment = installment_at(principal, hi, tenure_months)?;
    if installment < floor_installment - tolerance {
        return Err(LoanEngineError::ConvergenceFailure {
            function: "solve_rate".into(),
            iterations: 0,
            last_delta: floor_installment - installment,
        });
    }
    if installment > ceiling_installment + tolerance {
        return Err(LoanEngineError::ConvergenceFailure {
            function: "solve_rate".into(),
            iterations: 0,
            last_delta: installment - ceiling_installment,
        });
    }

    let mut last_delta = Decimal::MAX;
    for iter in 0..config.max_iterations {
        let mid = (lo + hi) / dec!(2);
        let computed = installment_at(principal, mid, tenure_months)?;
        last_delta = computed - installment;

        if last_delta.abs() < tolerance {
            let rate = mid.round_dp_with_strategy(
                RATE_DECIMAL_PLACES,
                RoundingStrategy::MidpointAwayFromZero,
            );
            debug!(iterations = iter + 1, %mid, %rate, "rate search converged");
            return Ok(rate);
        }

        if computed < installment {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Err(LoanEngineError::ConvergenceFailure {
        function: "solve_rate".into(),
        iterations: config.max_iterations,
        last_delta: last_delta.abs(),
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn installment_at(principal: Money, annual_rate_pct: Percent, tenure_months: u32) -> LoanEngineResult<Money> {
    annuity_payment(principal, monthly_rate(annual_rate_pct), tenure_months)
}

fn require_positive_principal(principal: Money) -> LoanEngineResult<()> {
    if principal <= Decimal::ZERO {
        return Err(LoanEngineError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    Ok(())
}

fn require_non_negative_rate(annual_rate_pct: Percent) -> LoanEngineResult<()> {
    if annual_rate_pct < Decimal::ZERO {
        return Err(LoanEngineError::invalid(
            "annual_rate_pct",
            "Annual rate cannot be negative",
        ));
    }
    Ok(())
}
