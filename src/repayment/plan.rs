//! Avalanche and snowball priority ordering
//!
//! Plans are informational: each loan keeps its own stated tenure and EMI,
//! only the priority order differs between strategies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;
use crate::profile::Loan;

/// Repayment priority rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Highest interest rate first
    Avalanche,
    /// Smallest outstanding balance first
    Snowball,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Avalanche => "avalanche",
            Strategy::Snowball => "snowball",
        }
    }

    /// Loans in priority order. Stable: ties keep their input order.
    /// Positive NaN sorts as the largest value.
    pub fn order<'a>(&self, loans: &'a [Loan]) -> Vec<&'a Loan> {
        let mut sorted: Vec<&Loan> = loans.iter().collect();
        match self {
            Strategy::Avalanche => sorted.sort_by(|a, b| b.interest_rate.total_cmp(&a.interest_rate)),
            Strategy::Snowball => sorted.sort_by(|a, b| a.outstanding.total_cmp(&b.outstanding)),
        }
        sorted
    }

    pub fn plan(&self, loans: &[Loan]) -> Vec<RepaymentPlan> {
        self.order(loans)
            .into_iter()
            .enumerate()
            .map(|(i, loan)| RepaymentPlan::for_loan(loan, i as u32 + 1))
            .collect()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avalanche" => Ok(Strategy::Avalanche),
            "snowball" => Ok(Strategy::Snowball),
            other => Err(EngineError::invalid("strategy", format!("unknown strategy: {}", other))),
        }
    }
}

/// Priority metadata for one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentPlan {
    pub loan_id: String,
    pub loan_name: String,
    /// 1-based priority
    pub order: u32,
    /// The loan's stated tenure
    pub months_to_payoff: u32,
    pub total_interest: f64,
    pub total_paid: f64,
}

impl RepaymentPlan {
    fn for_loan(loan: &Loan, order: u32) -> Self {
        let total_paid = loan.emi * loan.tenure_months as f64;
        Self {
            loan_id: loan.id.clone(),
            loan_name: loan.name.clone(),
            order,
            months_to_payoff: loan.tenure_months,
            total_interest: total_paid - loan.outstanding,
            total_paid,
        }
    }
}

pub fn avalanche_strategy(loans: &[Loan]) -> Vec<RepaymentPlan> {
    Strategy::Avalanche.plan(loans)
}

pub fn snowball_strategy(loans: &[Loan]) -> Vec<RepaymentPlan> {
    Strategy::Snowball.plan(loans)
}

/// Interest across a plan, as shown under the comparison table
pub fn total_interest(plans: &[RepaymentPlan]) -> f64 {
    plans.iter().map(|p| p.total_interest).sum()
}
