//! Profile data structures, loaders and persistence

mod data;
pub mod loader;
pub mod store;

pub use data::{FinancialProfile, Loan, LoanCategory};
pub use loader::{load_loans, load_loans_from_reader, load_profile, load_profiles};
pub use store::{load_or_sample, JsonFileStore, MemoryStore, ProfileStore, StoredProfile};
