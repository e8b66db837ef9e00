//! Health score heuristic and risk alert rules

mod score;
mod alerts;

pub use score::{calculate_health_score, HealthGrade, HealthScore};
pub use alerts::{generate_risk_alerts, format_amount, one_decimal, AlertSeverity, RiskAlert, HIGH_INTEREST_THRESHOLD};
