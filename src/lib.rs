//! Finance Engine - personal debt and cash-flow analytics
//!
//! This library provides:
//! - EMI computation and income/expense/debt aggregates
//! - A composite health score and threshold risk alerts
//! - Avalanche and snowball repayment ordering, plus a month-by-month paydown simulator
//! - What-if scenarios evaluated on copies of the profile
//! - Context snapshots and stream decoding for the advisor gateway
//! - Profile storage and CSV loan import

pub mod error;
pub mod profile;
pub mod metrics;
pub mod health;
pub mod repayment;
pub mod scenario;
pub mod report;
pub mod advisor;

// Re-export commonly used types
pub use error::{EngineError, EngineResult, GatewayError};
pub use profile::{FinancialProfile, Loan, LoanCategory, ProfileStore, JsonFileStore, MemoryStore};
pub use metrics::{calculate_emi, MetricsSummary};
pub use health::{calculate_health_score, generate_risk_alerts, HealthScore, RiskAlert};
pub use repayment::{avalanche_strategy, snowball_strategy, Strategy, PaydownConfig};
pub use scenario::{simulate_scenario, ScenarioKind, ScenarioResult};
pub use report::DashboardReport;
