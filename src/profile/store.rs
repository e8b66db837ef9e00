//! Profile persistence
//!
//! One writer per user is assumed; the last save wins.

use super::FinancialProfile;
use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Environment variable naming the default store directory
pub const STORE_DIR_ENV: &str = "FINANCE_STORE_DIR";

/// Fallback store directory when the environment does not name one
pub const DEFAULT_STORE_DIR: &str = "data/profiles";

/// Load/save of whole profiles keyed by user
pub trait ProfileStore {
    fn load(&self, user_id: &str) -> EngineResult<Option<FinancialProfile>>;
    fn save(&self, user_id: &str, profile: &FinancialProfile) -> EngineResult<()>;
}

/// Load the user's profile, substituting the sample when nothing is stored.
///
/// The flag is `true` when the profile came from the store.
pub fn load_or_sample<S: ProfileStore + ?Sized>(
    store: &S,
    user_id: &str,
) -> EngineResult<(FinancialProfile, bool)> {
    Ok(match store.load(user_id)? {
        Some(profile) => (profile, true),
        None => {
            debug!("no stored profile for {}, using sample", user_id);
            (FinancialProfile::sample(), false)
        }
    })
}

fn validate_user_id(user_id: &str) -> EngineResult<()> {
    let valid = !user_id.is_empty()
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(EngineError::invalid("user_id", format!("invalid user id: {:?}", user_id)))
    }
}

/// On-disk snapshot envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    pub user_id: String,
    pub updated_at: DateTime<Utc>,
    pub profile: FinancialProfile,
}

/// Stores each user's profile as `<dir>/<user_id>.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `$FINANCE_STORE_DIR`, or `data/profiles`
    pub fn from_env() -> Self {
        let dir = std::env::var(STORE_DIR_ENV).unwrap_or_else(|_| DEFAULT_STORE_DIR.to_string());
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, user_id: &str) -> EngineResult<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.dir.join(format!("{}.json", user_id)))
    }

    /// Full snapshot including the save timestamp
    pub fn load_snapshot(&self, user_id: &str) -> EngineResult<Option<StoredProfile>> {
        let path = self.path_for(user_id)?;
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }
}

impl ProfileStore for JsonFileStore {
    fn load(&self, user_id: &str) -> EngineResult<Option<FinancialProfile>> {
        Ok(self.load_snapshot(user_id)?.map(|s| s.profile))
    }

    fn save(&self, user_id: &str, profile: &FinancialProfile) -> EngineResult<()> {
        let path = self.path_for(user_id)?;
        fs::create_dir_all(&self.dir)?;

        let snapshot = StoredProfile {
            user_id: user_id.to_string(),
            updated_at: Utc::now(),
            profile: profile.clone(),
        };

        // Write then rename so a reader never sees a half-written file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&snapshot)?)?;
        fs::rename(&tmp, &path)?;

        info!("saved profile for {} ({} loans)", user_id, profile.loans.len());
        Ok(())
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    profiles: Mutex<HashMap<String, FinancialProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.profiles.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProfileStore for MemoryStore {
    fn load(&self, user_id: &str) -> EngineResult<Option<FinancialProfile>> {
        validate_user_id(user_id)?;
        let profiles = self
            .profiles
            .lock()
            .map_err(|_| EngineError::invalid("store", "profile store lock poisoned"))?;
        Ok(profiles.get(user_id).cloned())
    }

    fn save(&self, user_id: &str, profile: &FinancialProfile) -> EngineResult<()> {
        validate_user_id(user_id)?;
        let mut profiles = self
            .profiles
            .lock()
            .map_err(|_| EngineError::invalid("store", "profile store lock poisoned"))?;
        profiles.insert(user_id.to_string(), profile.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("finance_engine_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = temp_dir("round_trip");
        let store = JsonFileStore::new(&dir);

        assert!(store.load("alice").unwrap().is_none());

        let mut profile = FinancialProfile::sample();
        profile.monthly_income = 123_456.0;
        store.save("alice", &profile).unwrap();

        let loaded = store.load("alice").unwrap().expect("profile should exist");
        assert_eq!(loaded, profile);

        let snapshot = store.load_snapshot("alice").unwrap().unwrap();
        assert_eq!(snapshot.user_id, "alice");

        // Last writer wins
        profile.monthly_income = 1.0;
        store.save("alice", &profile).unwrap();
        assert_eq!(store.load("alice").unwrap().unwrap().monthly_income, 1.0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_user_id() {
        let store = JsonFileStore::new(temp_dir("invalid"));
        assert!(store.load("../etc/passwd").is_err());
        assert!(store.load("").is_err());
    }

    #[test]
    fn test_load_or_sample() {
        let store = MemoryStore::new();
        let (profile, has_data) = load_or_sample(&store, "bob").unwrap();
        assert!(!has_data);
        assert_eq!(profile, FinancialProfile::sample());

        let custom = FinancialProfile { monthly_income: 10.0, ..Default::default() };
        store.save("bob", &custom).unwrap();
        let (profile, has_data) = load_or_sample(&store, "bob").unwrap();
        assert!(has_data);
        assert_eq!(profile, custom);
        assert_eq!(store.len(), 1);
    }
}
