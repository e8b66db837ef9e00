//! Sums and ratios over a profile

use serde::{Deserialize, Serialize};

use crate::profile::FinancialProfile;

/// Returned when monthly need is zero: effectively infinite runway
pub const UNBOUNDED_RUNWAY: f64 = 99.0;

pub fn total_income(profile: &FinancialProfile) -> f64 {
    profile.monthly_income + profile.other_income
}

pub fn total_expenses(profile: &FinancialProfile) -> f64 {
    profile.fixed_expenses + profile.variable_expenses
}

/// Sum of the stored EMIs. Never recomputed from loan terms.
pub fn total_emi(profile: &FinancialProfile) -> f64 {
    profile.loans.iter().map(|l| l.emi).sum()
}

pub fn total_outstanding(profile: &FinancialProfile) -> f64 {
    profile.loans.iter().map(|l| l.outstanding).sum()
}

/// EMI as a percentage of income, 0 when there is no income
pub fn debt_to_income_ratio(profile: &FinancialProfile) -> f64 {
    let income = total_income(profile);
    if income == 0.0 {
        return 0.0;
    }
    total_emi(profile) / income * 100.0
}

/// Currently the same formula as [`debt_to_income_ratio`]; kept as a separate name
pub fn emi_burden_percent(profile: &FinancialProfile) -> f64 {
    let income = total_income(profile);
    if income == 0.0 {
        return 0.0;
    }
    total_emi(profile) / income * 100.0
}

/// Income left after expenses and EMIs. Negative means a structural deficit.
pub fn monthly_surplus(profile: &FinancialProfile) -> f64 {
    total_income(profile) - total_expenses(profile) - total_emi(profile)
}

fn monthly_need(profile: &FinancialProfile) -> f64 {
    total_expenses(profile) + total_emi(profile)
}

/// Months of expenses plus EMIs covered by liquid savings
pub fn emergency_fund_months(profile: &FinancialProfile) -> f64 {
    let need = monthly_need(profile);
    if need == 0.0 {
        return UNBOUNDED_RUNWAY;
    }
    profile.liquid_savings / need
}

/// Savings plus investments against six months of need
pub fn liquidity_ratio(profile: &FinancialProfile) -> f64 {
    let need = monthly_need(profile);
    if need == 0.0 {
        return UNBOUNDED_RUNWAY;
    }
    (profile.liquid_savings + profile.investments) / (need * 6.0)
}

/// All aggregate figures for one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_emi: f64,
    pub total_outstanding: f64,
    pub debt_to_income: f64,
    pub emi_burden: f64,
    pub monthly_surplus: f64,
    pub emergency_fund_months: f64,
    pub liquidity_ratio: f64,
}

impl MetricsSummary {
    pub fn from_profile(profile: &FinancialProfile) -> Self {
        Self {
            total_income: total_income(profile),
            total_expenses: total_expenses(profile),
            total_emi: total_emi(profile),
            total_outstanding: total_outstanding(profile),
            debt_to_income: debt_to_income_ratio(profile),
            emi_burden: emi_burden_percent(profile),
            monthly_surplus: monthly_surplus(profile),
            emergency_fund_months: emergency_fund_months(profile),
            liquidity_ratio: liquidity_ratio(profile),
        }
    }
}

/// Where monthly income goes, for the dashboard split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowBreakdown {
    pub expenses: f64,
    pub emi: f64,
    /// Floored at zero; a deficit shows as no surplus slice
    pub surplus: f64,
}

impl CashflowBreakdown {
    pub fn from_profile(profile: &FinancialProfile) -> Self {
        Self {
            expenses: total_expenses(profile),
            emi: total_emi(profile),
            surplus: monthly_surplus(profile).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Loan, LoanCategory};
    use approx::assert_relative_eq;

    fn profile_85k() -> FinancialProfile {
        FinancialProfile {
            monthly_income: 80_000.0,
            other_income: 5_000.0,
            fixed_expenses: 25_000.0,
            variable_expenses: 15_000.0,
            liquid_savings: 200_000.0,
            investments: 300_000.0,
            loans: vec![Loan::new("1", "Home", LoanCategory::Home, 3_000_000.0, 2_500_000.0, 8.5, 240, "SBI")
                .with_emi(26_036.0)],
        }
    }

    #[test]
    fn test_end_to_end_figures() {
        let p = profile_85k();
        assert_relative_eq!(total_income(&p), 85_000.0);
        assert_relative_eq!(total_expenses(&p), 40_000.0);
        assert_relative_eq!(monthly_surplus(&p), 18_964.0);
        assert_relative_eq!(debt_to_income_ratio(&p), 26_036.0 / 85_000.0 * 100.0);
        assert_relative_eq!(debt_to_income_ratio(&p), 30.63, epsilon = 0.01);
        assert_relative_eq!(emi_burden_percent(&p), debt_to_income_ratio(&p));
        assert_relative_eq!(emergency_fund_months(&p), 200_000.0 / 66_036.0);
        assert_relative_eq!(liquidity_ratio(&p), 500_000.0 / (66_036.0 * 6.0));
    }

    #[test]
    fn test_totals_are_additive() {
        let base = profile_85k();
        let extra = Loan::new("2", "Car", LoanCategory::Car, 600_000.0, 350_000.0, 9.5, 48, "HDFC")
            .with_emi(15_066.0);
        let mut loans = base.loans.clone();
        loans.push(extra.clone());
        let grown = base.with_loans(loans);

        assert_relative_eq!(total_emi(&grown) - total_emi(&base), extra.emi);
        assert_relative_eq!(total_outstanding(&grown) - total_outstanding(&base), extra.outstanding);
        assert_relative_eq!(total_income(&grown), total_income(&base));
        assert_relative_eq!(total_expenses(&grown), total_expenses(&base));
    }

    #[test]
    fn test_stored_emi_is_authoritative() {
        let loan = Loan::new("1", "Odd", LoanCategory::Other, 1_000.0, 1_000.0, 10.0, 12, "X").with_emi(5.0);
        let p = FinancialProfile { loans: vec![loan], ..Default::default() };
        assert_relative_eq!(total_emi(&p), 5.0);
    }

    #[test]
    fn test_zero_income_has_no_burden() {
        let p = FinancialProfile { monthly_income: 0.0, other_income: 0.0, ..profile_85k() };
        assert_eq!(debt_to_income_ratio(&p), 0.0);
        assert_eq!(emi_burden_percent(&p), 0.0);
    }

    #[test]
    fn test_zero_need_sentinel() {
        let p = FinancialProfile { liquid_savings: 10.0, ..Default::default() };
        assert_eq!(emergency_fund_months(&p), UNBOUNDED_RUNWAY);
        assert_eq!(liquidity_ratio(&p), 99.0);
    }

    #[test]
    fn test_breakdown_floors_deficit() {
        let p = FinancialProfile { monthly_income: 10_000.0, fixed_expenses: 20_000.0, ..Default::default() };
        let split = CashflowBreakdown::from_profile(&p);
        assert_eq!(split.surplus, 0.0);
        assert_eq!(split.expenses, 20_000.0);

        let summary = MetricsSummary::from_profile(&p);
        assert_relative_eq!(summary.monthly_surplus, -10_000.0);
    }
}
