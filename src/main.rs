//! Finance Engine CLI
//!
//! Command-line interface for evaluating a financial profile

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use finance_engine::advisor::FinancialContext;
use finance_engine::health::format_amount;
use finance_engine::metrics::UNBOUNDED_RUNWAY;
use finance_engine::profile::{load_loans, load_or_sample, load_profile};
use finance_engine::repayment::{simulate_paydown, total_interest, PaydownConfig, Strategy};
use finance_engine::scenario::{simulate_all, simulate_scenario, ScenarioKind, ScenarioResult};
use finance_engine::{
    calculate_health_score, generate_risk_alerts, DashboardReport, FinancialProfile, JsonFileStore, MetricsSummary,
    ProfileStore,
};
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "finance_engine", version)]
#[command(about = "Debt, cash-flow and repayment analytics for a personal profile")]
struct Cli {
    /// Profile JSON file
    #[arg(long, global = true, conflicts_with = "user")]
    profile: Option<PathBuf>,

    /// Stored user id
    #[arg(long, global = true)]
    user: Option<String>,

    /// Store directory (defaults to $FINANCE_STORE_DIR)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Replace the profile's loans with a CSV import
    #[arg(long, global = true)]
    loans: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Aggregates and health score
    Summary,
    /// Risk alerts in display order
    Alerts,
    /// Repayment priority and accelerated paydown
    Plan {
        #[arg(long, default_value = "avalanche")]
        strategy: Strategy,
        /// Extra payment per month on top of the EMIs
        #[arg(long, default_value_t = 0.0)]
        extra: f64,
        /// Write the month-by-month schedule here
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// One scenario, or all of them
    Scenario { kind: Option<ScenarioKind> },
    /// Print the advisor context snapshot
    Context {
        #[arg(long)]
        insights: bool,
    },
    /// Full dashboard report as JSON
    Report,
    /// Save the resolved profile for --user
    Save,
}

fn open_store(cli: &Cli) -> JsonFileStore {
    match &cli.store {
        Some(dir) => JsonFileStore::new(dir),
        None => JsonFileStore::from_env(),
    }
}

fn resolve_profile(cli: &Cli) -> Result<FinancialProfile> {
    let mut profile = if let Some(path) = &cli.profile {
        load_profile(path).with_context(|| format!("loading profile {}", path.display()))?
    } else if let Some(user) = &cli.user {
        let (profile, has_data) = load_or_sample(&open_store(cli), user)?;
        if !has_data {
            println!("No stored profile for {}; showing sample data.\n", user);
        }
        profile
    } else {
        FinancialProfile::sample()
    };

    if let Some(path) = &cli.loans {
        let loans = load_loans(path).with_context(|| format!("importing loans from {}", path.display()))?;
        info!("imported {} loans from {}", loans.len(), path.display());
        profile = profile.with_loans(loans);
    }

    Ok(profile)
}

fn print_summary(profile: &FinancialProfile) {
    let m = MetricsSummary::from_profile(profile);
    let health = calculate_health_score(profile);

    println!("Financial Summary");
    println!("=================\n");
    println!("  Total Income:       ₹{}", format_amount(m.total_income));
    println!("  Total Expenses:     ₹{}", format_amount(m.total_expenses));
    println!("  Total EMI:          ₹{}", format_amount(m.total_emi));
    println!("  Total Outstanding:  ₹{}", format_amount(m.total_outstanding));
    println!("  Monthly Surplus:    ₹{}", format_amount(m.monthly_surplus));
    println!("  Debt-to-Income:     {:.1}%", m.debt_to_income);
    println!("  EMI Burden:         {:.1}%", m.emi_burden);
    if m.emergency_fund_months >= UNBOUNDED_RUNWAY {
        println!("  Emergency Fund:     unbounded");
    } else {
        println!("  Emergency Fund:     {:.1} months", m.emergency_fund_months);
    }
    println!("  Liquidity Ratio:    {:.2}", m.liquidity_ratio);
    println!();
    println!("Health Score: {} ({})", health.score, health.grade.as_str());

    if !profile.loans.is_empty() {
        println!("\n{:<4} {:<20} {:<12} {:>14} {:>7} {:>12} {:>6}", "ID", "Name", "Type", "Outstanding", "Rate", "EMI", "Tenure");
        println!("{}", "-".repeat(81));
        for loan in &profile.loans {
            println!(
                "{:<4} {:<20} {:<12} {:>14.2} {:>6.2}% {:>12.2} {:>6}",
                loan.id, loan.name, loan.category.as_str(), loan.outstanding, loan.interest_rate, loan.emi, loan.tenure_months
            );
        }
    }
}

fn print_alerts(profile: &FinancialProfile) {
    let alerts = generate_risk_alerts(profile);
    if alerts.is_empty() {
        println!("No risk alerts.");
        return;
    }
    for alert in alerts {
        println!("[{:?}] {}", alert.severity, alert.title);
        println!("    {}", alert.message);
    }
}

fn run_plan(profile: &FinancialProfile, strategy: Strategy, extra: f64, csv: Option<&PathBuf>) -> Result<()> {
    let plans = strategy.plan(&profile.loans);

    println!("{} order", strategy);
    println!("{:>5} {:<20} {:>8} {:>14} {:>14}", "Order", "Loan", "Months", "Interest", "Total Paid");
    println!("{}", "-".repeat(65));
    for p in &plans {
        println!(
            "{:>5} {:<20} {:>8} {:>14.2} {:>14.2}",
            p.order, p.loan_name, p.months_to_payoff, p.total_interest, p.total_paid
        );
    }
    println!("Total interest at scheduled EMIs: ₹{}\n", format_amount(total_interest(&plans)));

    let config = PaydownConfig {
        extra_monthly_payment: extra,
        detailed_output: csv.is_some(),
        ..Default::default()
    };
    let schedule = simulate_paydown(&profile.loans, strategy, &config);

    println!("Accelerated paydown (budget ₹{}/month)", format_amount(schedule.monthly_budget));
    for loan in &schedule.loans {
        let closes = match loan.months_to_payoff {
            Some(m) => format!("month {}", m),
            None => "not within horizon".to_string(),
        };
        println!("  {:>2}. {:<20} closes {:<20} interest ₹{}", loan.order, loan.loan_name, closes, format_amount(loan.interest_paid));
    }
    println!("  Debt-free in {} months, total interest ₹{}", schedule.total_months, format_amount(schedule.total_interest));
    if !schedule.converged {
        println!("  Warning: loans remain open after {} months", config.max_months);
    }

    if let Some(path) = csv {
        let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
        for row in &schedule.months {
            writer.serialize(row)?;
        }
        writer.flush()?;
        println!("\nSchedule written to: {}", path.display());
    }

    Ok(())
}

fn print_scenario(result: &ScenarioResult) {
    println!("{}", result.label);
    println!("  {}", result.impact_description);
    println!(
        "  Surplus ₹{}  DTI {:.1}%  Health {} ({})",
        format_amount(result.new_surplus),
        result.new_dti,
        result.new_health_score.score,
        result.new_health_score.grade.as_str()
    );
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let profile = resolve_profile(&cli)?;

    match &cli.command {
        Command::Summary => print_summary(&profile),
        Command::Alerts => print_alerts(&profile),
        Command::Plan { strategy, extra, csv } => run_plan(&profile, *strategy, *extra, csv.as_ref())?,
        Command::Scenario { kind } => {
            let results = match kind {
                Some(kind) => vec![simulate_scenario(&profile, *kind)],
                None => simulate_all(&profile),
            };
            for result in &results {
                print_scenario(result);
                println!();
            }
        }
        Command::Context { insights } => {
            let context = if *insights {
                FinancialContext::for_insights(&profile)
            } else {
                FinancialContext::for_chat(&profile)
            };
            println!("{}", serde_json::to_string_pretty(&context)?);
        }
        Command::Report => {
            let report = DashboardReport::build(&profile);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Save => {
            let Some(user) = &cli.user else {
                bail!("save requires --user");
            };
            open_store(&cli).save(user, &profile)?;
            println!("Saved profile for {}", user);
        }
    }

    Ok(())
}
