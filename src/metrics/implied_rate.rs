//! Rate implied by a loan's stored installment
//!
//! The stored EMI is authoritative for every aggregate, so a loan edited
//! without recomputing its EMI silently skews the dashboard. Solving for the
//! rate the EMI actually amortizes at exposes that drift.

use serde::{Deserialize, Serialize};

use crate::profile::{FinancialProfile, Loan};

const TOLERANCE: f64 = 1e-10;
const MAX_ITERATIONS: usize = 1000;

/// Solve for the periodic rate at which a cash flow series has zero NPV
/// using Newton-Raphson, falling back to bisection.
///
/// `cashflows[0]` is at time 0. Returns `None` when there is no sign change
/// or no root in the search interval.
pub fn solve_periodic_rate(cashflows: &[f64]) -> Option<f64> {
    if cashflows.is_empty() {
        return None;
    }

    let has_positive = cashflows.iter().any(|&cf| cf > TOLERANCE);
    let has_negative = cashflows.iter().any(|&cf| cf < -TOLERANCE);
    if !has_positive || !has_negative {
        return None;
    }

    // Initial guess: 1% per month
    let mut rate = 0.01;

    for _ in 0..MAX_ITERATIONS {
        let (npv, dnpv) = npv_and_derivative(cashflows, rate);

        if dnpv.abs() < 1e-20 {
            return solve_by_bisection(cashflows);
        }

        let new_rate = (rate - npv / dnpv).max(-0.99).min(10.0);

        if (new_rate - rate).abs() < TOLERANCE {
            return Some(new_rate);
        }

        rate = new_rate;
    }

    solve_by_bisection(cashflows)
}

fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf / (1.0 + rate).powi(t as i32);
        if t > 0 {
            dnpv -= (t as f64) * cf / (1.0 + rate).powi(t as i32 + 1);
        }
    }

    (npv, dnpv)
}

fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

fn solve_by_bisection(cashflows: &[f64]) -> Option<f64> {
    let mut low = -0.99_f64;
    let mut high = 10.0_f64;

    if npv_at_rate(cashflows, low) * npv_at_rate(cashflows, high) > 0.0 {
        return None;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let npv_mid = npv_at_rate(cashflows, mid);

        if npv_mid.abs() < TOLERANCE || (high - low) / 2.0 < TOLERANCE {
            return Some(mid);
        }

        if npv_mid * npv_at_rate(cashflows, low) < 0.0 {
            high = mid;
        } else {
            low = mid;
        }
    }

    None
}

/// Nominal annual rate (percent) at which `emi` over `tenure_months`
/// repays `outstanding`
pub fn implied_annual_rate(loan: &Loan) -> Option<f64> {
    if loan.tenure_months == 0 || !loan.emi.is_finite() || !loan.outstanding.is_finite() {
        return None;
    }

    let mut cashflows = Vec::with_capacity(loan.tenure_months as usize + 1);
    cashflows.push(loan.outstanding);
    cashflows.extend(std::iter::repeat(-loan.emi).take(loan.tenure_months as usize));

    solve_periodic_rate(&cashflows).map(|monthly| monthly * 12.0 * 100.0)
}

/// Stated versus implied rate for one loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiDrift {
    pub loan_id: String,
    pub stated_rate: f64,
    pub implied_rate: Option<f64>,
    /// implied - stated, in percentage points
    pub drift: Option<f64>,
}

/// Drift for every loan in the profile, in profile order
pub fn emi_drift(profile: &FinancialProfile) -> Vec<EmiDrift> {
    profile
        .loans
        .iter()
        .map(|loan| {
            let implied = implied_annual_rate(loan);
            EmiDrift {
                loan_id: loan.id.clone(),
                stated_rate: loan.interest_rate,
                implied_rate: implied,
                drift: implied.map(|r| r - loan.interest_rate),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::LoanCategory;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_recomputed_emi_implies_stated_rate() {
        for rate in [6.0, 8.5, 9.5, 36.0] {
            let loan = Loan::new("1", "L", LoanCategory::Personal, 500_000.0, 400_000.0, rate, 60, "B");
            let implied = implied_annual_rate(&loan).unwrap();
            assert_abs_diff_eq!(implied, rate, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_zero_rate_loan() {
        let loan = Loan::new("1", "L", LoanCategory::Other, 1_200.0, 1_200.0, 0.0, 12, "B");
        assert_abs_diff_eq!(implied_annual_rate(&loan).unwrap(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_solution_cases() {
        let zero_emi = Loan::new("1", "L", LoanCategory::Other, 1_000.0, 1_000.0, 5.0, 12, "B").with_emi(0.0);
        assert!(implied_annual_rate(&zero_emi).is_none());

        let zero_tenure = Loan { tenure_months: 0, ..zero_emi.with_emi(10.0) };
        assert!(implied_annual_rate(&zero_tenure).is_none());
    }

    #[test]
    fn test_stale_emi_shows_drift() {
        // Balance halved without recomputing the installment
        let loan = Loan::new("1", "Car", LoanCategory::Car, 600_000.0, 350_000.0, 9.5, 48, "HDFC");
        let stale = Loan { outstanding: 175_000.0, ..loan };
        let profile = FinancialProfile { loans: vec![stale], ..Default::default() };

        let drift = emi_drift(&profile);
        assert_eq!(drift.len(), 1);
        assert!(drift[0].drift.unwrap() > 20.0);
    }
}
