//! AWS Lambda handler for dashboard reports
//!
//! Accepts a profile (or a user id seen earlier by this instance) via JSON and
//! returns the full dashboard report, optionally with an accelerated paydown.
//!
//! Supports Lambda Function URLs for direct HTTP access.

use finance_engine::profile::{load_or_sample, MemoryStore, ProfileStore};
use finance_engine::repayment::{simulate_paydown, PaydownConfig, PaydownSchedule, Strategy};
use finance_engine::{DashboardReport, FinancialProfile};
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Input for one report
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// Profile to evaluate; falls back to the cached profile for `user_id`, then the sample
    #[serde(default)]
    pub profile: Option<FinancialProfile>,

    /// Cache key for warm invocations
    #[serde(default)]
    pub user_id: Option<String>,

    /// Include what-if scenarios (default: true)
    #[serde(default = "default_true")]
    pub include_scenarios: bool,

    /// When present, also simulate an accelerated paydown with this extra payment
    #[serde(default)]
    pub extra_monthly_payment: Option<f64>,

    /// Strategy for the paydown (default: avalanche)
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
}

fn default_true() -> bool { true }
fn default_strategy() -> Strategy { Strategy::Avalanche }

/// Output from the handler
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    /// False when the sample profile was substituted
    pub has_data: bool,
    pub report: DashboardReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paydown: Option<PaydownSchedule>,
    pub execution_time_ms: u64,
}

/// Profiles seen by this instance, keyed by user id
fn warm_cache() -> &'static MemoryStore {
    static CACHE: OnceLock<MemoryStore> = OnceLock::new();
    CACHE.get_or_init(MemoryStore::new)
}

fn error_response(status: u16, message: &str) -> Result<Response<Body>, Error> {
    let body = serde_json::json!({ "error": message });
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(Body::Text(body.to_string()))?)
}

fn json_response(body: &ReportResponse) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .body(Body::Text(serde_json::to_string(body)?))?)
}

/// Pick the profile to evaluate. The flag is false when the sample was substituted.
fn resolve_profile<S: ProfileStore + ?Sized>(
    request: &mut ReportRequest,
    cache: &S,
) -> Result<(FinancialProfile, bool), String> {
    match (request.profile.take(), request.user_id.as_deref()) {
        (Some(profile), Some(user_id)) => {
            cache.save(user_id, &profile).map_err(|e| e.to_string())?;
            Ok((profile, true))
        }
        (Some(profile), None) => Ok((profile, true)),
        (None, Some(user_id)) => load_or_sample(cache, user_id).map_err(|e| e.to_string()),
        (None, None) => Ok((FinancialProfile::sample(), false)),
    }
}

/// Lambda handler function
async fn handler(event: Request) -> Result<Response<Body>, Error> {
    let start = std::time::Instant::now();

    // Handle CORS preflight
    if event.method().as_str() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(Body::Empty)?);
    }

    // Parse request body
    let body_str = match event.body() {
        Body::Text(s) => s.clone(),
        Body::Binary(b) => String::from_utf8_lossy(b).to_string(),
        Body::Empty => "{}".to_string(),
    };

    let mut request: ReportRequest = match serde_json::from_str(&body_str) {
        Ok(r) => r,
        Err(e) => {
            warn!("rejecting request: {}", e);
            return error_response(400, &format!("Invalid JSON: {}", e));
        }
    };

    let (profile, has_data) = match resolve_profile(&mut request, warm_cache()) {
        Ok(resolved) => resolved,
        Err(e) => return error_response(400, &e),
    };

    let report = if request.include_scenarios {
        DashboardReport::build(&profile)
    } else {
        DashboardReport::build_core(&profile)
    };

    let paydown = request.extra_monthly_payment.map(|extra| {
        let config = PaydownConfig {
            extra_monthly_payment: extra,
            ..Default::default()
        };
        simulate_paydown(&profile.loans, request.strategy, &config)
    });

    let execution_time_ms = start.elapsed().as_millis() as u64;
    info!(
        "report for {} loans (scenarios: {}) in {} ms",
        profile.loans.len(),
        request.include_scenarios,
        execution_time_ms
    );

    json_response(&ReportResponse {
        has_data,
        report,
        paydown,
        execution_time_ms,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
