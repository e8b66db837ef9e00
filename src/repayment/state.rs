//! Per-loan state tracked while simulating a paydown

use crate::metrics::monthly_rate;
use crate::profile::Loan;

/// State of a single loan at a point in the simulation
#[derive(Debug, Clone)]
pub struct LoanState {
    pub loan_id: String,
    pub loan_name: String,

    /// Priority in the chosen strategy (1-based)
    pub order: u32,

    /// Monthly rate as a decimal
    pub monthly_rate: f64,

    /// Scheduled installment
    pub emi: f64,

    /// Beginning of month balance
    pub balance: f64,

    /// Cumulative interest charged
    pub interest_paid: f64,

    /// Cumulative amount paid
    pub total_paid: f64,

    /// Month in which the balance reached zero
    pub paid_off_month: Option<u32>,
}

impl LoanState {
    pub fn from_loan(loan: &Loan, order: u32) -> Self {
        Self {
            loan_id: loan.id.clone(),
            loan_name: loan.name.clone(),
            order,
            monthly_rate: monthly_rate(loan.interest_rate),
            emi: loan.emi,
            balance: loan.outstanding.max(0.0),
            interest_paid: 0.0,
            total_paid: 0.0,
            paid_off_month: if loan.outstanding <= 0.0 { Some(0) } else { None },
        }
    }

    pub fn is_active(&self) -> bool {
        self.paid_off_month.is_none()
    }

    /// Charge one month of interest. Returns the interest amount.
    pub fn accrue_interest(&mut self) -> f64 {
        let interest = self.balance * self.monthly_rate;
        self.balance += interest;
        self.interest_paid += interest;
        interest
    }

    /// Pay up to `amount` against the balance. Returns the amount applied.
    pub fn pay(&mut self, amount: f64, month: u32) -> f64 {
        let applied = amount.min(self.balance).max(0.0);
        self.balance -= applied;
        self.total_paid += applied;
        if self.balance <= 1e-6 {
            self.balance = 0.0;
            self.paid_off_month = Some(month);
        }
        applied
    }
}
