//! Structured predictions returned by the insights gateway

use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, GatewayError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFactor {
    pub factor: String,
    pub impact: Impact,
    /// Contribution, 0-1
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultRisk {
    /// Percent, 0-100
    pub probability: f64,
    pub risk_level: RiskLevel,
    pub key_factors: Vec<KeyFactor>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditCategory {
    Poor,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorStatus {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRange {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditFactor {
    pub name: String,
    pub score: f64,
    pub status: FactorStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditScoreEstimate {
    /// Bureau-style score, 300-900
    pub estimated: f64,
    pub range: ScoreRange,
    pub category: CreditCategory,
    pub factors: Vec<CreditFactor>,
    pub improvement_tips: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestedStrategy {
    Avalanche,
    Snowball,
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub loan_name: String,
    #[serde(rename = "currentEMI")]
    pub current_emi: f64,
    #[serde(rename = "suggestedEMI")]
    pub suggested_emi: f64,
    /// 1 = highest
    pub priority: f64,
    pub interest_saved: f64,
    pub months_saved: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentOptimizer {
    pub strategy: SuggestedStrategy,
    pub reason: String,
    pub allocations: Vec<Allocation>,
    pub total_interest_saved: f64,
    pub total_months_saved: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyKind {
    Spending,
    Debt,
    Savings,
    Income,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub severity: AnomalySeverity,
    pub title: String,
    pub description: String,
    pub metric: String,
    pub value: String,
    pub benchmark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MlPredictions {
    pub default_risk: DefaultRisk,
    pub credit_score: CreditScoreEstimate,
    pub repayment_optimizer: RepaymentOptimizer,
    pub anomalies: Vec<Anomaly>,
}

// Completion envelope, only the path we read
#[derive(Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Deserialize)]
struct ToolCall {
    function: ToolFunction,
}

#[derive(Deserialize)]
struct ToolFunction {
    /// JSON-encoded string
    arguments: String,
}

impl MlPredictions {
    /// Pull the tool-call arguments out of a chat completion document
    pub fn from_completion(body: &str) -> EngineResult<Self> {
        let completion: Completion = serde_json::from_str(body)?;
        let arguments = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.tool_calls.into_iter().next())
            .map(|t| t.function.arguments)
            .ok_or(GatewayError::EmptyCompletion)?;

        Ok(serde_json::from_str(&arguments)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    fn predictions_json() -> serde_json::Value {
        serde_json::json!({
            "defaultRisk": {
                "probability": 22.5,
                "riskLevel": "moderate",
                "keyFactors": [{ "factor": "High EMI burden", "impact": "negative", "weight": 0.6 }],
                "recommendation": "Reduce unsecured debt"
            },
            "creditScore": {
                "estimated": 712,
                "range": { "low": 690, "high": 740 },
                "category": "very_good",
                "factors": [{ "name": "Utilization", "score": 55, "status": "fair" }],
                "improvementTips": ["Pay the card in full"]
            },
            "repaymentOptimizer": {
                "strategy": "hybrid",
                "reason": "Card rate dominates",
                "allocations": [{
                    "loanName": "Credit Card", "currentEMI": 8133, "suggestedEMI": 12000,
                    "priority": 1, "interestSaved": 4200, "monthsSaved": 4
                }],
                "totalInterestSaved": 4200,
                "totalMonthsSaved": 4
            },
            "anomalies": [{
                "type": "debt", "severity": "warning", "title": "High DTI",
                "description": "EMIs exceed half of income", "metric": "DTI",
                "value": "57.9%", "benchmark": "40%"
            }]
        })
    }

    fn completion(arguments: &str) -> String {
        serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "tool_calls": [{
                        "type": "function",
                        "function": { "name": "return_ml_predictions", "arguments": arguments }
                    }]
                }
            }]
        })
        .to_string()
    }

    #[test]
    fn test_from_completion() {
        let body = completion(&predictions_json().to_string());
        let predictions = MlPredictions::from_completion(&body).unwrap();

        assert_eq!(predictions.default_risk.risk_level, RiskLevel::Moderate);
        assert_eq!(predictions.credit_score.category, CreditCategory::VeryGood);
        assert_eq!(predictions.repayment_optimizer.strategy, SuggestedStrategy::Hybrid);
        assert_eq!(predictions.repayment_optimizer.allocations[0].suggested_emi, 12_000.0);
        assert_eq!(predictions.anomalies[0].kind, AnomalyKind::Debt);
    }

    #[test]
    fn test_missing_tool_call() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"no tools"}}]}"#;
        let err = MlPredictions::from_completion(body).unwrap_err();
        assert!(matches!(err, EngineError::Gateway(GatewayError::EmptyCompletion)));

        let err = MlPredictions::from_completion(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, EngineError::Gateway(GatewayError::EmptyCompletion)));
    }

    #[test]
    fn test_out_of_schema_enum_rejected() {
        let mut value = predictions_json();
        value["defaultRisk"]["riskLevel"] = "extreme".into();
        let err = MlPredictions::from_completion(&completion(&value.to_string())).unwrap_err();
        assert!(matches!(err, EngineError::Json(_)));
    }
}
