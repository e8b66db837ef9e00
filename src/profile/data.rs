//! Loan and profile data structures matching the stored snapshot format

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;
use crate::metrics::calculate_emi;

/// Loan category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanCategory {
    Home,
    Car,
    Education,
    Personal,
    CreditCard,
    Other,
}

impl LoanCategory {
    pub const ALL: [LoanCategory; 6] = [
        LoanCategory::Home,
        LoanCategory::Car,
        LoanCategory::Education,
        LoanCategory::Personal,
        LoanCategory::CreditCard,
        LoanCategory::Other,
    ];

    /// Stored representation (`credit_card`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanCategory::Home => "home",
            LoanCategory::Car => "car",
            LoanCategory::Education => "education",
            LoanCategory::Personal => "personal",
            LoanCategory::CreditCard => "credit_card",
            LoanCategory::Other => "other",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            LoanCategory::Home => "Home Loan",
            LoanCategory::Car => "Car Loan",
            LoanCategory::Education => "Education Loan",
            LoanCategory::Personal => "Personal Loan",
            LoanCategory::CreditCard => "Credit Card",
            LoanCategory::Other => "Other",
        }
    }
}

impl fmt::Display for LoanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoanCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| EngineError::invalid("type", format!("unknown loan category: {}", s)))
    }
}

/// A single loan held by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    /// Unique, stable identifier
    pub id: String,

    /// Display name
    pub name: String,

    #[serde(rename = "type")]
    pub category: LoanCategory,

    /// Original amount borrowed
    pub principal: f64,

    /// Current outstanding balance (expected <= principal, not enforced)
    pub outstanding: f64,

    /// Annual interest rate in percent (8.5 = 8.5%)
    pub interest_rate: f64,

    /// Remaining tenure in months
    pub tenure_months: u32,

    /// Stored monthly installment. Authoritative for every aggregate.
    pub emi: f64,

    pub lender: String,
}

impl Loan {
    /// Create a loan whose EMI is computed from outstanding, rate and tenure
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: LoanCategory,
        principal: f64,
        outstanding: f64,
        interest_rate: f64,
        tenure_months: u32,
        lender: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            principal,
            outstanding,
            interest_rate,
            tenure_months,
            emi: calculate_emi(outstanding, interest_rate, tenure_months),
            lender: lender.into(),
        }
    }

    /// Override the stored EMI (e.g. the figure printed on a bank statement)
    pub fn with_emi(mut self, emi: f64) -> Self {
        self.emi = emi;
        self
    }

    /// Copy of this loan with the EMI recomputed from its current terms
    pub fn with_recomputed_emi(&self) -> Self {
        Self {
            emi: calculate_emi(self.outstanding, self.interest_rate, self.tenure_months),
            ..self.clone()
        }
    }

    pub fn is_high_interest(&self, threshold_pct: f64) -> bool {
        self.interest_rate > threshold_pct
    }
}

/// The single unit of input to every engine operation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProfile {
    /// Primary monthly income
    pub monthly_income: f64,
    pub other_income: f64,
    pub fixed_expenses: f64,
    pub variable_expenses: f64,
    pub liquid_savings: f64,
    pub investments: f64,
    #[serde(default)]
    pub loans: Vec<Loan>,
}

impl FinancialProfile {
    /// Sample profile shown when a user has no stored data
    pub fn sample() -> Self {
        Self {
            monthly_income: 80_000.0,
            other_income: 5_000.0,
            fixed_expenses: 25_000.0,
            variable_expenses: 15_000.0,
            liquid_savings: 200_000.0,
            investments: 300_000.0,
            loans: vec![
                Loan::new("1", "Home Loan", LoanCategory::Home, 3_000_000.0, 2_500_000.0, 8.5, 240, "SBI")
                    .with_emi(26_036.0),
                Loan::new("2", "Car Loan", LoanCategory::Car, 600_000.0, 350_000.0, 9.5, 48, "HDFC")
                    .with_emi(15_066.0),
                Loan::new("3", "Credit Card", LoanCategory::CreditCard, 80_000.0, 80_000.0, 36.0, 12, "ICICI")
                    .with_emi(8_133.0),
            ],
        }
    }

    /// New profile with the given loans replacing the current set
    pub fn with_loans(&self, loans: Vec<Loan>) -> Self {
        Self { loans, ..self.clone() }
    }

    pub fn find_loan(&self, id: &str) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == id)
    }
}
