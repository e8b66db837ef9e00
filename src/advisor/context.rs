//! Financial context snapshot sent alongside chat and insights requests

use serde::{Deserialize, Serialize};

use crate::health::one_decimal;
use crate::metrics::{
    debt_to_income_ratio, emergency_fund_months, emi_burden_percent, monthly_surplus, total_emi, total_income,
    total_outstanding,
};
use crate::profile::{FinancialProfile, LoanCategory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub category: LoanCategory,
    pub outstanding: f64,
    pub rate: f64,
    pub emi: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenure: Option<u32>,
}

/// Deterministic projection of a profile for the gateway.
///
/// Ratios are pre-formatted strings (`"30.6%"`) because that is what the
/// prompt templates embed verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialContext {
    /// Primary plus other income
    pub monthly_income: f64,
    #[serde(rename = "totalEMI")]
    pub total_emi: f64,
    pub total_outstanding: f64,
    pub debt_to_income: String,
    pub emi_burden: String,
    pub emergency_fund_months: String,
    pub monthly_surplus: f64,
    pub loans: Vec<LoanSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_savings: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investments: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_expenses: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_expenses: Option<f64>,
}

impl FinancialContext {
    fn base(profile: &FinancialProfile, with_tenure: bool) -> Self {
        Self {
            monthly_income: total_income(profile),
            total_emi: total_emi(profile),
            total_outstanding: total_outstanding(profile),
            debt_to_income: format!("{}%", one_decimal(debt_to_income_ratio(profile))),
            emi_burden: format!("{}%", one_decimal(emi_burden_percent(profile))),
            emergency_fund_months: one_decimal(emergency_fund_months(profile)),
            monthly_surplus: monthly_surplus(profile),
            loans: profile
                .loans
                .iter()
                .map(|l| LoanSummary {
                    name: l.name.clone(),
                    category: l.category,
                    outstanding: l.outstanding,
                    rate: l.interest_rate,
                    emi: l.emi,
                    tenure: with_tenure.then_some(l.tenure_months),
                })
                .collect(),
            liquid_savings: None,
            investments: None,
            fixed_expenses: None,
            variable_expenses: None,
        }
    }

    /// Snapshot attached to every chat turn
    pub fn for_chat(profile: &FinancialProfile) -> Self {
        Self::base(profile, false)
    }

    /// Wider snapshot for the structured insights request
    pub fn for_insights(profile: &FinancialProfile) -> Self {
        Self {
            liquid_savings: Some(profile.liquid_savings),
            investments: Some(profile.investments),
            fixed_expenses: Some(profile.fixed_expenses),
            variable_expenses: Some(profile.variable_expenses),
            ..Self::base(profile, true)
        }
    }
}

/// Body of the insights request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    pub financial_context: FinancialContext,
}
