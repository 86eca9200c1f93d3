pub mod progress;
pub mod summary;

pub use progress::{loan_progress, track_loan, LoanProgress};
pub use summary::{summarize_portfolio, PortfolioLine, PortfolioLoan, PortfolioSummary};
