//! Installment formula and aggregate figures over a profile

mod emi;
mod aggregates;
mod implied_rate;

pub use emi::{calculate_emi, monthly_rate};
pub use aggregates::{
    total_income, total_expenses, total_emi, total_outstanding,
    debt_to_income_ratio, emi_burden_percent, monthly_surplus,
    emergency_fund_months, liquidity_ratio,
    MetricsSummary, CashflowBreakdown, UNBOUNDED_RUNWAY,
};
pub use implied_rate::{implied_annual_rate, solve_periodic_rate, emi_drift, EmiDrift};
