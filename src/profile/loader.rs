//! Load profiles from JSON snapshots and loans from CSV exports

use super::{FinancialProfile, Loan, LoanCategory};
use crate::error::{EngineError, EngineResult};
use csv::Reader;
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Raw CSV row matching the loan export columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "LoanID")]
    loan_id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Type")]
    category: String,
    #[serde(rename = "Principal")]
    principal: f64,
    #[serde(rename = "Outstanding")]
    outstanding: f64,
    #[serde(rename = "InterestRate")]
    interest_rate: f64,
    #[serde(rename = "TenureMonths")]
    tenure_months: u32,
    /// Blank when the export has no installment figure
    #[serde(rename = "EMI", default)]
    emi: Option<f64>,
    #[serde(rename = "Lender", default)]
    lender: String,
}

impl CsvRow {
    fn into_loan(self) -> EngineResult<Loan> {
        let category: LoanCategory = self.category.trim().parse()?;

        if self.loan_id.trim().is_empty() {
            return Err(EngineError::invalid("LoanID", "loan id must not be empty"));
        }

        let loan = Loan::new(
            self.loan_id,
            self.name,
            category,
            self.principal,
            self.outstanding,
            self.interest_rate,
            self.tenure_months,
            self.lender,
        );

        Ok(match self.emi {
            Some(emi) => loan.with_emi(emi),
            None => loan,
        })
    }
}

/// Load all loans from a CSV file
pub fn load_loans<P: AsRef<Path>>(path: P) -> EngineResult<Vec<Loan>> {
    let file = File::open(path.as_ref())?;
    debug!("loading loans from {}", path.as_ref().display());
    load_loans_from_reader(file)
}

/// Load loans from any reader (e.g., string buffer, upload body)
pub fn load_loans_from_reader<R: std::io::Read>(reader: R) -> EngineResult<Vec<Loan>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut loans = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        loans.push(row.into_loan()?);
    }

    let mut seen = std::collections::HashSet::new();
    for loan in &loans {
        if !seen.insert(loan.id.as_str()) {
            return Err(EngineError::invalid("LoanID", format!("duplicate loan id: {}", loan.id)));
        }
    }

    Ok(loans)
}

/// Load a profile snapshot from a JSON file
pub fn load_profile<P: AsRef<Path>>(path: P) -> EngineResult<FinancialProfile> {
    let file = File::open(path.as_ref())?;
    let profile: FinancialProfile = serde_json::from_reader(BufReader::new(file))?;
    debug!(
        "loaded profile from {} ({} loans)",
        path.as_ref().display(),
        profile.loans.len()
    );
    Ok(profile)
}

/// Load an array of profile snapshots from a JSON file
pub fn load_profiles<P: AsRef<Path>>(path: P) -> EngineResult<Vec<FinancialProfile>> {
    let file = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
