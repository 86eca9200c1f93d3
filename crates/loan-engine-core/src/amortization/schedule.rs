//! Month-by-month payment schedules.
//!
//! Amortizing rows carry the level installment unchanged to the end; any
//! drift in the final balance is left visible for the engine to check
//! rather than folded into the last row.

use rust_decimal::Decimal;

use crate::amortization::model::{LoanKind, ResolvedLoan, ScheduleEntry};
use crate::error::LoanEngineError;
use crate::time_value::monthly_rate;
use crate::LoanEngineResult;

/// Build the full schedule for a resolved loan. Either every row is
/// produced or an error is returned.
pub fn generate_schedule(loan: &ResolvedLoan) -> LoanEngineResult<Vec<ScheduleEntry>> {
    if loan.principal <= Decimal::ZERO {
        return Err(LoanEngineError::invalid(
            "principal",
            "Principal must be positive",
        ));
    }
    if loan.tenure_months == 0 {
        return Err(LoanEngineError::invalid(
            "tenure_months",
            "Tenure must be at least 1 month",
        ));
    }

    let r = monthly_rate(loan.annual_rate_pct);
    let rows = match loan.loan_kind {
        LoanKind::Amortizing => amortizing_rows(loan, r),
        LoanKind::InterestOnly => interest_only_rows(loan, r)?,
    };
    Ok(rows)
}

fn amortizing_rows(loan: &ResolvedLoan, r: Decimal) -> Vec<ScheduleEntry> {
    let mut schedule = Vec::with_capacity(loan.tenure_months as usize);
    let mut balance = loan.principal;

    for month in 1..=loan.tenure_months {
        let interest = balance * r;
        let principal_component = loan.installment - interest;
        balance = (balance - principal_component).max(Decimal::ZERO);

        schedule.push(ScheduleEntry {
            month,
            payment: loan.installment,
            principal_component,
            interest_component: interest,
            remaining_balance: balance,
        });
    }

    schedule
}

fn interest_only_rows(loan: &ResolvedLoan, r: Decimal) -> LoanEngineResult<Vec<ScheduleEntry>> {
    let mut schedule = Vec::with_capacity(loan.tenure_months as usize);
    let mut balance = loan.principal;

    for month in 1..=loan.tenure_months {
        let interest = balance * r;
        // Balloon: the whole outstanding principal falls due in the last month
        let principal_component = if month == loan.tenure_months {
            balance
        } else {
            Decimal::ZERO
        };
        balance = (balance - principal_component).max(Decimal::ZERO);

        schedule.push(ScheduleEntry {
            month,
            payment: interest.checked_add(principal_component).ok_or_else(|| {
                LoanEngineError::invalid(
                    "principal",
                    "Balloon payment exceeds the representable range",
                )
            })?,
            principal_component,
            interest_component: interest,
            remaining_balance: balance,
        });
    }

    Ok(schedule)
}
