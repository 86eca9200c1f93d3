pub mod config;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use config::SolverConfig;
pub use error::LoanEngineError;
pub use types::*;

#[cfg(feature = "amortization")]
pub use amortization::engine::{compute, compute_batch, run_loan};

/// Standard result type for all loan engine operations
pub type LoanEngineResult<T> = Result<T, LoanEngineError>;
