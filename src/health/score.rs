//! Composite financial health score
//!
//! Additive, hand-tuned heuristic. Band edges and deltas are fixed; changing
//! them changes every stored comparison.

use serde::{Deserialize, Serialize};

use crate::metrics::{debt_to_income_ratio, emergency_fund_months, monthly_surplus, total_income};
use crate::profile::FinancialProfile;

const BASE_SCORE: i32 = 50;

/// Grade bands, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthGrade {
    Excellent,
    Good,
    Fair,
    Poor,
    Critical,
}

impl HealthGrade {
    /// Band for a clamped score
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            HealthGrade::Excellent
        } else if score >= 60 {
            HealthGrade::Good
        } else if score >= 40 {
            HealthGrade::Fair
        } else if score >= 20 {
            HealthGrade::Poor
        } else {
            HealthGrade::Critical
        }
    }

    /// Display color token
    pub fn color(&self) -> &'static str {
        match self {
            HealthGrade::Excellent => "hsl(152 60% 45%)",
            HealthGrade::Good => "hsl(174 72% 46%)",
            HealthGrade::Fair => "hsl(45 90% 55%)",
            HealthGrade::Poor => "hsl(25 80% 50%)",
            HealthGrade::Critical => "hsl(0 72% 55%)",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthGrade::Excellent => "Excellent",
            HealthGrade::Good => "Good",
            HealthGrade::Fair => "Fair",
            HealthGrade::Poor => "Poor",
            HealthGrade::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    /// 0-100
    pub score: u8,
    pub grade: HealthGrade,
    pub color: String,
}

impl HealthScore {
    /// Clamp a raw score to 0-100 and attach its grade
    pub fn from_raw(raw: i32) -> Self {
        let score = raw.clamp(0, 100) as u8;
        let grade = HealthGrade::from_score(score);
        Self {
            score,
            grade,
            color: grade.color().to_string(),
        }
    }
}

/// DTI contribution (-30 to +20)
fn dti_delta(dti: f64) -> i32 {
    if dti < 20.0 {
        20
    } else if dti < 35.0 {
        10
    } else if dti < 50.0 {
        -10
    } else {
        -30
    }
}

/// Emergency fund contribution (-20 to +15)
fn emergency_fund_delta(months: f64) -> i32 {
    if months >= 6.0 {
        15
    } else if months >= 3.0 {
        5
    } else if months >= 1.0 {
        -5
    } else {
        -20
    }
}

/// Savings rate contribution (-15 to +15)
fn savings_rate_delta(savings_rate: f64) -> i32 {
    if savings_rate >= 20.0 {
        15
    } else if savings_rate >= 10.0 {
        5
    } else if savings_rate >= 0.0 {
        -5
    } else {
        -15
    }
}

pub fn calculate_health_score(profile: &FinancialProfile) -> HealthScore {
    let mut score = BASE_SCORE;

    score += dti_delta(debt_to_income_ratio(profile));
    score += emergency_fund_delta(emergency_fund_months(profile));

    // Savings rate only counts when there is income to save from
    let income = total_income(profile);
    if income > 0.0 {
        let savings_rate = monthly_surplus(profile) / income * 100.0;
        score += savings_rate_delta(savings_rate);
    }

    HealthScore::from_raw(score)
}
