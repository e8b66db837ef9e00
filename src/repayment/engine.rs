//! Month-by-month accelerated paydown
//!
//! The whole monthly budget (every scheduled EMI plus any extra payment) keeps
//! being paid after a loan closes. Freed installments roll into the next loan
//! in strategy order. This runs alongside the informational plans in
//! [`super::plan`] and never changes them.

use log::debug;
use serde::{Deserialize, Serialize};

use super::plan::Strategy;
use super::state::LoanState;
use crate::profile::Loan;

/// Configuration for a paydown simulation
#[derive(Debug, Clone)]
pub struct PaydownConfig {
    /// Paid every month on top of the scheduled EMIs
    pub extra_monthly_payment: f64,

    /// Simulation horizon
    pub max_months: u32,

    /// Whether to record a row per month
    pub detailed_output: bool,
}

impl Default for PaydownConfig {
    fn default() -> Self {
        Self {
            extra_monthly_payment: 0.0,
            max_months: 600, // 50 years
            detailed_output: false,
        }
    }
}

/// Totals for one simulated month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaydownMonth {
    pub month: u32,
    pub interest: f64,
    pub paid: f64,
    pub eom_balance: f64,
    pub active_loans: usize,
}

/// Outcome for one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaydownLoanResult {
    pub loan_id: String,
    pub loan_name: String,
    pub order: u32,
    /// `None` when the loan is still open at the horizon
    pub months_to_payoff: Option<u32>,
    pub interest_paid: f64,
    pub total_paid: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaydownSchedule {
    pub strategy: Strategy,
    pub monthly_budget: f64,
    /// Priority order
    pub loans: Vec<PaydownLoanResult>,
    pub total_months: u32,
    pub total_interest: f64,
    pub total_paid: f64,
    /// All loans closed within the horizon
    pub converged: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub months: Vec<PaydownMonth>,
}

/// Paydown simulator
pub struct PaydownEngine {
    config: PaydownConfig,
}

impl PaydownEngine {
    pub fn new(config: PaydownConfig) -> Self {
        Self { config }
    }

    pub fn simulate(&self, loans: &[Loan], strategy: Strategy) -> PaydownSchedule {
        let mut states: Vec<LoanState> = strategy
            .order(loans)
            .into_iter()
            .enumerate()
            .map(|(i, loan)| LoanState::from_loan(loan, i as u32 + 1))
            .collect();

        let scheduled: f64 = states.iter().map(|s| s.emi).sum();
        let budget = scheduled + self.config.extra_monthly_payment.max(0.0);
        let mut months = Vec::new();
        let mut elapsed = 0;

        for month in 1..=self.config.max_months {
            if states.iter().all(|s| !s.is_active()) {
                break;
            }
            elapsed = month;

            let interest: f64 = states
                .iter_mut()
                .filter(|s| s.is_active())
                .map(|s| s.accrue_interest())
                .sum();

            let mut remaining = budget;

            // Scheduled installments first
            for state in states.iter_mut().filter(|s| s.is_active()) {
                let due = state.emi.min(remaining);
                remaining -= state.pay(due, month);
            }

            // Whatever is left goes to the highest-priority open loan
            for state in states.iter_mut().filter(|s| s.is_active()) {
                if remaining <= 0.0 {
                    break;
                }
                remaining -= state.pay(remaining, month);
            }

            if self.config.detailed_output {
                months.push(PaydownMonth {
                    month,
                    interest,
                    paid: budget - remaining,
                    eom_balance: states.iter().map(|s| s.balance).sum(),
                    active_loans: states.iter().filter(|s| s.is_active()).count(),
                });
            }
        }

        let converged = states.iter().all(|s| !s.is_active());
        if !converged {
            debug!(
                "{} paydown did not close all loans within {} months",
                strategy, self.config.max_months
            );
        }

        let results: Vec<PaydownLoanResult> = states
            .into_iter()
            .map(|s| PaydownLoanResult {
                loan_id: s.loan_id,
                loan_name: s.loan_name,
                order: s.order,
                months_to_payoff: s.paid_off_month,
                interest_paid: s.interest_paid,
                total_paid: s.total_paid,
            })
            .collect();

        PaydownSchedule {
            strategy,
            monthly_budget: budget,
            total_months: elapsed,
            total_interest: results.iter().map(|r| r.interest_paid).sum(),
            total_paid: results.iter().map(|r| r.total_paid).sum(),
            loans: results,
            converged,
            months,
        }
    }
}

/// Simulate with the given configuration
pub fn simulate_paydown(loans: &[Loan], strategy: Strategy, config: &PaydownConfig) -> PaydownSchedule {
    PaydownEngine::new(config.clone()).simulate(loans, strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{FinancialProfile, LoanCategory};
    use approx::assert_relative_eq;

    #[test]
    fn test_single_loan_matches_tenure() {
        let loan = Loan::new("1", "L", LoanCategory::Personal, 12_000.0, 12_000.0, 12.0, 12, "B");
        let schedule = simulate_paydown(&[loan.clone()], Strategy::Avalanche, &PaydownConfig::default());

        assert!(schedule.converged);
        assert_eq!(schedule.total_months, 12);
        assert_eq!(schedule.loans[0].months_to_payoff, Some(12));
        assert_relative_eq!(schedule.total_paid, loan.emi * 12.0, epsilon = 1e-6);
        assert_relative_eq!(schedule.total_interest, loan.emi * 12.0 - 12_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_extra_payment_never_slower() {
        let loans: Vec<Loan> = FinancialProfile::sample().loans.iter().map(|l| l.with_recomputed_emi()).collect();

        for strategy in [Strategy::Avalanche, Strategy::Snowball] {
            let base = simulate_paydown(&loans, strategy, &PaydownConfig::default());
            let boosted = simulate_paydown(
                &loans,
                strategy,
                &PaydownConfig { extra_monthly_payment: 20_000.0, ..Default::default() },
            );
            assert!(base.converged && boosted.converged);
            assert!(boosted.total_months <= base.total_months);
            assert!(boosted.total_interest < base.total_interest);
        }
    }

    #[test]
    fn test_freed_emi_rolls_forward() {
        let loans: Vec<Loan> = FinancialProfile::sample().loans.iter().map(|l| l.with_recomputed_emi()).collect();
        let schedule = simulate_paydown(&loans, Strategy::Avalanche, &PaydownConfig::default());

        // Credit card is first and closes on schedule; the home loan finishes
        // well ahead of its 240 month tenure once the others roll into it
        assert_eq!(schedule.loans[0].loan_id, "3");
        assert_eq!(schedule.loans[0].months_to_payoff, Some(12));
        let home = schedule.loans.iter().find(|l| l.loan_id == "1").unwrap();
        assert!(home.months_to_payoff.unwrap() < 240);
    }

    #[test]
    fn test_underwater_loan_does_not_converge() {
        // EMI below monthly interest
        let loan = Loan::new("1", "L", LoanCategory::CreditCard, 100_000.0, 100_000.0, 36.0, 12, "B").with_emi(1_000.0);
        let config = PaydownConfig { max_months: 24, detailed_output: true, ..Default::default() };
        let schedule = simulate_paydown(&[loan], Strategy::Snowball, &config);

        assert!(!schedule.converged);
        assert_eq!(schedule.total_months, 24);
        assert_eq!(schedule.loans[0].months_to_payoff, None);
        assert_eq!(schedule.months.len(), 24);
        assert!(schedule.months[23].eom_balance > 100_000.0);
    }

    #[test]
    fn test_no_loans() {
        let schedule = simulate_paydown(&[], Strategy::Avalanche, &PaydownConfig::default());
        assert!(schedule.converged);
        assert_eq!(schedule.total_months, 0);
    }
}
