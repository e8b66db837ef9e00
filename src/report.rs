//! Everything the dashboard shows for one profile, computed in one pass

use serde::{Deserialize, Serialize};

use crate::health::{calculate_health_score, generate_risk_alerts, HealthScore, RiskAlert};
use crate::metrics::{emi_drift, CashflowBreakdown, EmiDrift, MetricsSummary};
use crate::profile::FinancialProfile;
use crate::repayment::{avalanche_strategy, snowball_strategy, total_interest, RepaymentPlan};
use crate::scenario::{simulate_all, ScenarioResult};

/// Complete dashboard result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub summary: MetricsSummary,
    pub breakdown: CashflowBreakdown,
    pub health: HealthScore,
    pub alerts: Vec<RiskAlert>,

    /// Highest rate first
    pub avalanche: Vec<RepaymentPlan>,
    /// Smallest balance first
    pub snowball: Vec<RepaymentPlan>,
    pub avalanche_total_interest: f64,
    pub snowball_total_interest: f64,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ScenarioResult>,

    /// Stored EMI versus the rate it implies
    pub emi_drift: Vec<EmiDrift>,
}

impl DashboardReport {
    /// Build the full report, scenarios included
    pub fn build(profile: &FinancialProfile) -> Self {
        Self {
            scenarios: simulate_all(profile),
            ..Self::build_core(profile)
        }
    }

    /// Build without the what-if scenarios
    pub fn build_core(profile: &FinancialProfile) -> Self {
        let avalanche = avalanche_strategy(&profile.loans);
        let snowball = snowball_strategy(&profile.loans);

        Self {
            summary: MetricsSummary::from_profile(profile),
            breakdown: CashflowBreakdown::from_profile(profile),
            health: calculate_health_score(profile),
            alerts: generate_risk_alerts(profile),
            avalanche_total_interest: total_interest(&avalanche),
            snowball_total_interest: total_interest(&snowball),
            avalanche,
            snowball,
            scenarios: Vec::new(),
            emi_drift: emi_drift(profile),
        }
    }

    /// Interest the avalanche order saves over snowball. Not clamped.
    pub fn avalanche_savings(&self) -> f64 {
        self.snowball_total_interest - self.avalanche_total_interest
    }
}
