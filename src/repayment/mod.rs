//! Repayment priority strategies and paydown simulation

mod plan;
mod state;
mod engine;

pub use plan::{avalanche_strategy, snowball_strategy, total_interest, RepaymentPlan, Strategy};
pub use state::LoanState;
pub use engine::{simulate_paydown, PaydownConfig, PaydownEngine, PaydownLoanResult, PaydownMonth, PaydownSchedule};
