use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::LoanEngineError;
use crate::types::{Money, Percent, Rate};
use crate::LoanEngineResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);
const PERCENT: Decimal = dec!(100);

/// Convert an annual percentage rate to the monthly decimal rate.
pub fn monthly_rate(annual_rate_pct: Percent) -> Rate {
    annual_rate_pct / MONTHS_PER_YEAR / PERCENT
}

/// Growth factor (1 + r)^n. `None` when the power overflows Decimal range.
pub fn growth_factor(rate: Rate, nper: u32) -> Option<Decimal> {
    (Decimal::ONE + rate).checked_powu(u64::from(nper))
}

/// Level payment that amortizes `principal` over `nper` periods at `rate`.
///
/// Evaluated as `P * r / (1 - (1 + r)^-n)` so that large growth factors never
/// multiply the principal. Zero rate splits the principal evenly. When
/// (1 + r)^n overflows, the annuity has converged to the pure interest charge
/// and `principal * r` is returned.
pub fn annuity_payment(principal: Money, rate: Rate, nper: u32) -> LoanEngineResult<Money> {
    if nper == 0 {
        return Err(LoanEngineError::InvalidInput {
            field: "tenure_months".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(nper));
    }

    let interest = principal.checked_mul(rate).ok_or_else(|| {
        LoanEngineError::invalid("principal", "Periodic interest exceeds the representable range")
    })?;

    let discount = match growth_factor(rate, nper) {
        Some(factor) => Decimal::ONE.checked_div(factor).unwrap_or(Decimal::ZERO),
        None => return Ok(interest),
    };

    let denominator = Decimal::ONE - discount;
    if denominator.is_zero() {
        return Err(LoanEngineError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Rate too small to distinguish from zero over this tenure".into(),
        });
    }

    interest
        .checked_div(denominator)
        .ok_or_else(|| LoanEngineError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Installment exceeds the representable range".into(),
        })
}

/// Future value of one currency unit paid at the end of each of `nper` periods.
pub fn annuity_accumulation(rate: Rate, nper: u32) -> Option<Decimal> {
    if rate.is_zero() {
        return Some(Decimal::from(nper));
    }
    let factor = growth_factor(rate, nper)?;
    (factor - Decimal::ONE).checked_div(rate)
}
