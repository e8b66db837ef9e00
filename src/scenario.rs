//! What-if scenarios over a profile
//!
//! Each scenario builds a modified copy of the caller's profile, derives
//! results from the copy, and drops it. The caller's value is never touched.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;
use crate::health::{calculate_health_score, HealthScore};
use crate::metrics::{calculate_emi, debt_to_income_ratio, monthly_surplus};
use crate::profile::{FinancialProfile, Loan};

/// Share of the largest balance prepaid in `prepay_largest`
const PREPAY_FRACTION: f64 = 0.2;

/// Rate shock in percentage points for `rate_increase_2`
const RATE_SHOCK: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    #[serde(rename = "income_drop_20")]
    IncomeDrop20,
    #[serde(rename = "income_drop_50")]
    IncomeDrop50,
    #[serde(rename = "rate_increase_2")]
    RateIncrease2,
    #[serde(rename = "prepay_largest")]
    PrepayLargest,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 4] = [
        ScenarioKind::IncomeDrop20,
        ScenarioKind::IncomeDrop50,
        ScenarioKind::RateIncrease2,
        ScenarioKind::PrepayLargest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::IncomeDrop20 => "income_drop_20",
            ScenarioKind::IncomeDrop50 => "income_drop_50",
            ScenarioKind::RateIncrease2 => "rate_increase_2",
            ScenarioKind::PrepayLargest => "prepay_largest",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::IncomeDrop20 => "20% Income Drop",
            ScenarioKind::IncomeDrop50 => "50% Income Drop (Job Loss)",
            ScenarioKind::RateIncrease2 => "+2% Interest Rate Hike",
            ScenarioKind::PrepayLargest => "20% Prepayment on Largest Loan",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScenarioKind::IncomeDrop20 => "Simulates a 20% salary cut or income reduction.",
            ScenarioKind::IncomeDrop50 => "Simulates losing half your income.",
            ScenarioKind::RateIncrease2 => "Simulates a 2% increase across all loan rates.",
            ScenarioKind::PrepayLargest => "Uses 20% of savings to prepay the largest loan.",
        }
    }

    /// Build the modified profile for this scenario
    pub fn apply(&self, profile: &FinancialProfile) -> FinancialProfile {
        match self {
            ScenarioKind::IncomeDrop20 => FinancialProfile {
                monthly_income: profile.monthly_income * 0.8,
                ..profile.clone()
            },
            ScenarioKind::IncomeDrop50 => FinancialProfile {
                monthly_income: profile.monthly_income * 0.5,
                ..profile.clone()
            },
            ScenarioKind::RateIncrease2 => {
                let loans = profile
                    .loans
                    .iter()
                    .map(|l| {
                        let interest_rate = l.interest_rate + RATE_SHOCK;
                        Loan {
                            interest_rate,
                            emi: calculate_emi(l.outstanding, interest_rate, l.tenure_months),
                            ..l.clone()
                        }
                    })
                    .collect();
                profile.with_loans(loans)
            }
            ScenarioKind::PrepayLargest => prepay_largest(profile),
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScenarioKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| EngineError::invalid("scenario", format!("unknown scenario: {}", s)))
    }
}

/// Index of the first loan holding the largest outstanding balance
fn largest_loan_index(loans: &[Loan]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, loan) in loans.iter().enumerate() {
        match best {
            Some(b) if loans[b].outstanding >= loan.outstanding => {}
            _ => best = Some(i),
        }
    }
    best
}

/// Prepay 20% of the largest balance out of liquid savings.
/// A no-op copy when savings cannot cover it.
fn prepay_largest(profile: &FinancialProfile) -> FinancialProfile {
    let mut modified = profile.clone();

    let Some(idx) = largest_loan_index(&modified.loans) else {
        return modified;
    };

    let prepay_amount = modified.loans[idx].outstanding * PREPAY_FRACTION;
    if modified.liquid_savings < prepay_amount {
        debug!(
            "prepay skipped: savings {:.2} below required {:.2}",
            modified.liquid_savings, prepay_amount
        );
        return modified;
    }

    let loan = &mut modified.loans[idx];
    loan.outstanding -= prepay_amount;
    loan.emi = calculate_emi(loan.outstanding, loan.interest_rate, loan.tenure_months);
    modified.liquid_savings -= prepay_amount;
    modified
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub kind: ScenarioKind,
    pub label: String,
    pub new_surplus: f64,
    #[serde(rename = "newDTI")]
    pub new_dti: f64,
    pub new_health_score: HealthScore,
    pub impact_description: String,
}

pub fn simulate_scenario(profile: &FinancialProfile, kind: ScenarioKind) -> ScenarioResult {
    let modified = kind.apply(profile);

    ScenarioResult {
        kind,
        label: kind.label().to_string(),
        new_surplus: monthly_surplus(&modified),
        new_dti: debt_to_income_ratio(&modified),
        new_health_score: calculate_health_score(&modified),
        impact_description: kind.description().to_string(),
    }
}

/// Every scenario, in declaration order
pub fn simulate_all(profile: &FinancialProfile) -> Vec<ScenarioResult> {
    ScenarioKind::ALL
        .iter()
        .map(|&kind| simulate_scenario(profile, kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{total_emi, total_outstanding};
    use crate::profile::LoanCategory;
    use approx::assert_relative_eq;

    #[test]
    fn test_income_drops() {
        let profile = FinancialProfile::sample();

        let r20 = simulate_scenario(&profile, ScenarioKind::IncomeDrop20);
        assert_eq!(r20.label, "20% Income Drop");
        // 64000 + 5000 - 40000 - 49235
        assert_relative_eq!(r20.new_surplus, 64_000.0 + 5_000.0 - 40_000.0 - 49_235.0);
        assert_relative_eq!(r20.new_dti, 49_235.0 / 69_000.0 * 100.0);

        let r50 = simulate_scenario(&profile, ScenarioKind::IncomeDrop50);
        assert_relative_eq!(r50.new_dti, 49_235.0 / 45_000.0 * 100.0);
        assert!(r50.new_surplus < r20.new_surplus);
        assert!(r50.new_health_score.score <= r20.new_health_score.score);
    }

    #[test]
    fn test_rate_increase_recomputes_emi() {
        let profile = FinancialProfile::sample();
        let modified = ScenarioKind::RateIncrease2.apply(&profile);

        for (before, after) in profile.loans.iter().zip(&modified.loans) {
            assert_relative_eq!(after.interest_rate, before.interest_rate + 2.0);
            assert_relative_eq!(
                after.emi,
                calculate_emi(before.outstanding, before.interest_rate + 2.0, before.tenure_months)
            );
        }

        let result = simulate_scenario(&profile, ScenarioKind::RateIncrease2);
        assert_relative_eq!(result.new_surplus, 85_000.0 - 40_000.0 - total_emi(&modified));
    }

    #[test]
    fn test_prepay_largest_applies() {
        let profile = FinancialProfile {
            liquid_savings: 600_000.0,
            ..FinancialProfile::sample()
        };
        let modified = ScenarioKind::PrepayLargest.apply(&profile);

        assert_relative_eq!(modified.loans[0].outstanding, 2_000_000.0);
        assert_relative_eq!(modified.loans[0].emi, calculate_emi(2_000_000.0, 8.5, 240));
        assert_relative_eq!(modified.liquid_savings, 100_000.0);
        assert_eq!(modified.loans[1], profile.loans[1]);
        assert_relative_eq!(total_outstanding(&modified), total_outstanding(&profile) - 500_000.0);
    }

    #[test]
    fn test_prepay_insufficient_savings_is_noop() {
        // Sample savings 200000 < 20% of 2.5M
        let profile = FinancialProfile::sample();
        assert_eq!(ScenarioKind::PrepayLargest.apply(&profile), profile);

        let result = simulate_scenario(&profile, ScenarioKind::PrepayLargest);
        assert_relative_eq!(result.new_surplus, monthly_surplus(&profile));
        assert_eq!(result.new_health_score, calculate_health_score(&profile));
    }

    #[test]
    fn test_prepay_does_not_mutate_caller() {
        let profile = FinancialProfile {
            liquid_savings: 10_000_000.0,
            ..FinancialProfile::sample()
        };
        let before = serde_json::to_vec(&profile).unwrap();

        let _ = simulate_scenario(&profile, ScenarioKind::PrepayLargest);
        let _ = simulate_all(&profile);

        assert_eq!(serde_json::to_vec(&profile).unwrap(), before);
    }

    #[test]
    fn test_largest_prefers_first_on_tie() {
        let mk = |id: &str| Loan::new(id, id, LoanCategory::Personal, 1_000.0, 1_000.0, 10.0, 12, "B");
        let loans = vec![mk("a"), mk("b")];
        assert_eq!(largest_loan_index(&loans), Some(0));
        assert_eq!(largest_loan_index(&[]), None);

        let profile = FinancialProfile { liquid_savings: 1_000.0, loans, ..Default::default() };
        let modified = ScenarioKind::PrepayLargest.apply(&profile);
        assert_relative_eq!(modified.loans[0].outstanding, 800.0);
        assert_relative_eq!(modified.loans[1].outstanding, 1_000.0);
    }

    #[test]
    fn test_simulate_all_order_and_parse() {
        let results = simulate_all(&FinancialProfile::sample());
        let kinds: Vec<_> = results.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, ScenarioKind::ALL.to_vec());

        for kind in ScenarioKind::ALL {
            assert_eq!(kind.as_str().parse::<ScenarioKind>().unwrap(), kind);
        }
        assert!("crash".parse::<ScenarioKind>().is_err());

        let json = serde_json::to_value(&results[0]).unwrap();
        assert_eq!(json["kind"], "income_drop_20");
        assert!(json.get("newDTI").is_some());
    }
}
