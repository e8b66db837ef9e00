//! Support for the conversational advisor and the insights panel
//!
//! The engine never talks to the gateway itself. It builds the context
//! snapshot and request bodies, and decodes what comes back.

mod context;
mod chat;
mod stream;
mod insights;

pub use context::{FinancialContext, InsightsRequest, LoanSummary};
pub use chat::{ChatMessage, ChatRequest, Role, Transcript};
pub use stream::{decode_all, SseDecoder, StreamEvent};
pub use insights::{
    Allocation, Anomaly, AnomalyKind, AnomalySeverity, CreditCategory, CreditFactor, CreditScoreEstimate,
    DefaultRisk, FactorStatus, Impact, KeyFactor, MlPredictions, RepaymentOptimizer, RiskLevel, ScoreRange,
    SuggestedStrategy,
};
