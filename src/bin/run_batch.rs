//! Evaluate a batch of profiles from a JSON array
//!
//! Usage: run_batch <profiles.json> [output.csv]
//!
//! Writes one summary row per profile, in input order.

use anyhow::{Context, Result};
use finance_engine::profile::load_profiles;
use finance_engine::DashboardReport;
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;

/// One output row
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct BatchRow {
    index: usize,
    loan_count: usize,
    total_income: f64,
    total_emi: f64,
    total_outstanding: f64,
    monthly_surplus: f64,
    #[serde(rename = "DTI")]
    dti: f64,
    emergency_fund_months: f64,
    health_score: u8,
    health_grade: &'static str,
    alert_count: usize,
    avalanche_interest: f64,
    snowball_interest: f64,
    worst_scenario_score: Option<u8>,
}

impl BatchRow {
    fn from_report(index: usize, loan_count: usize, report: &DashboardReport) -> Self {
        Self {
            index,
            loan_count,
            total_income: report.summary.total_income,
            total_emi: report.summary.total_emi,
            total_outstanding: report.summary.total_outstanding,
            monthly_surplus: report.summary.monthly_surplus,
            dti: report.summary.debt_to_income,
            emergency_fund_months: report.summary.emergency_fund_months,
            health_score: report.health.score,
            health_grade: report.health.grade.as_str(),
            alert_count: report.alerts.len(),
            avalanche_interest: report.avalanche_total_interest,
            snowball_interest: report.snowball_total_interest,
            worst_scenario_score: report.scenarios.iter().map(|s| s.new_health_score.score).min(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let input = args
        .get(1)
        .context("usage: run_batch <profiles.json> [output.csv]")?;
    let output_path = args.get(2).map(String::as_str).unwrap_or("batch_summary.csv");

    let start = Instant::now();
    println!("Loading profiles from {}...", input);
    let profiles = load_profiles(input).with_context(|| format!("loading {}", input))?;
    println!("Loaded {} profiles in {:?}", profiles.len(), start.elapsed());

    println!("Evaluating...");
    let eval_start = Instant::now();

    // Evaluate in parallel; collect keeps input order
    let rows: Vec<BatchRow> = profiles
        .par_iter()
        .enumerate()
        .map(|(i, profile)| {
            let report = DashboardReport::build(profile);
            BatchRow::from_report(i, profile.loans.len(), &report)
        })
        .collect();

    println!("Evaluation complete in {:?}", eval_start.elapsed());

    let mut writer = csv::Writer::from_path(output_path).with_context(|| format!("creating {}", output_path))?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    let critical = rows.iter().filter(|r| r.health_score < 20).count();
    let deficit = rows.iter().filter(|r| r.monthly_surplus < 0.0).count();

    println!("\nSummary:");
    println!("  Profiles:          {}", rows.len());
    println!("  Critical health:   {}", critical);
    println!("  Monthly deficit:   {}", deficit);
    println!("\nResults written to: {}", output_path);
    println!("Total time: {:?}", start.elapsed());

    Ok(())
}
