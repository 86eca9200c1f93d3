use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoanEngineError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("EMI too small: installment {installment} does not exceed first period interest {first_period_interest}")]
    EmiTooSmall {
        installment: Decimal,
        first_period_interest: Decimal,
    },

    #[error("Convergence failure: {function} did not converge after {iterations} iterations (delta: {last_delta})")]
    ConvergenceFailure {
        function: String,
        iterations: u32,
        last_delta: Decimal,
    },

    #[error("Schedule inconsistent: final balance {residual_balance} exceeds tolerance {tolerance}")]
    ScheduleInconsistent {
        residual_balance: Decimal,
        tolerance: Decimal,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanEngineError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanEngineError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for LoanEngineError {
    fn from(e: serde_json::Error) -> Self {
        LoanEngineError::SerializationError(e.to_string())
    }
}
