pub mod engine;
pub mod model;
pub mod schedule;
pub mod solver;

pub use model::{LoanKind, LoanRequest, LoanResult, LoanTerms, ResolvedLoan, ScheduleEntry, SolveFor};
