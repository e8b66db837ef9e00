//! Threshold-based risk alerts
//!
//! Rules are independent and evaluated in a fixed order; the order is what
//! the dashboard displays.

use serde::{Deserialize, Serialize};

use crate::metrics::{debt_to_income_ratio, emergency_fund_months, monthly_surplus};
use crate::profile::FinancialProfile;

/// Loans above this annual rate are flagged
pub const HIGH_INTEREST_THRESHOLD: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAlert {
    #[serde(rename = "type")]
    pub severity: AlertSeverity,
    pub title: String,
    pub message: String,
}

impl RiskAlert {
    fn new(severity: AlertSeverity, title: &str, message: String) -> Self {
        Self {
            severity,
            title: title.to_string(),
            message,
        }
    }
}

/// Whole-number percent, rounding halves away from zero
fn whole_percent(value: f64) -> String {
    format!("{:.0}", value.round())
}

/// One decimal place, rounding halves away from zero
pub fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

/// Rupee amount with thousands separators and at most three decimals
pub fn format_amount(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let negative = rounded < 0.0;
    let text = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if negative { "-" } else { "" };
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}

pub fn generate_risk_alerts(profile: &FinancialProfile) -> Vec<RiskAlert> {
    let mut alerts = Vec::new();
    let dti = debt_to_income_ratio(profile);
    let ef = emergency_fund_months(profile);
    let surplus = monthly_surplus(profile);

    if dti > 50.0 {
        alerts.push(RiskAlert::new(
            AlertSeverity::Critical,
            "Extreme Debt Load",
            format!("Your EMIs consume {}% of income. Immediate action needed.", whole_percent(dti)),
        ));
    } else if dti > 35.0 {
        alerts.push(RiskAlert::new(
            AlertSeverity::Warning,
            "High Debt-to-Income",
            format!("DTI at {}%. Consider reducing debt load.", whole_percent(dti)),
        ));
    }

    if ef < 1.0 {
        alerts.push(RiskAlert::new(
            AlertSeverity::Critical,
            "No Emergency Fund",
            "Less than 1 month of expenses saved. Build emergency reserves urgently.".to_string(),
        ));
    } else if ef < 3.0 {
        alerts.push(RiskAlert::new(
            AlertSeverity::Warning,
            "Low Emergency Fund",
            format!("Only {} months of buffer. Target 6 months.", one_decimal(ef)),
        ));
    }

    if surplus < 0.0 {
        alerts.push(RiskAlert::new(
            AlertSeverity::Critical,
            "Negative Cash Flow",
            format!("You're spending ₹{} more than you earn monthly.", format_amount(surplus.abs())),
        ));
    }

    let high_rate_count = profile
        .loans
        .iter()
        .filter(|l| l.is_high_interest(HIGH_INTEREST_THRESHOLD))
        .count();
    if high_rate_count > 0 {
        alerts.push(RiskAlert::new(
            AlertSeverity::Warning,
            "High Interest Loans",
            format!("{} loan(s) above 15% interest. Prioritize repayment.", high_rate_count),
        ));
    }

    if alerts.is_empty() {
        alerts.push(RiskAlert::new(
            AlertSeverity::Info,
            "Looking Good",
            "No critical financial risks detected. Keep it up!".to_string(),
        ));
    }

    alerts
}
