use std::path::{Path, PathBuf};

use log::debug;

use crate::progression::challenge::ChallengeCatalog;
use crate::progression::errors::ProgressionError;
use crate::progression::state::ProgressionState;

const TREE_PRIMARY: &str = "codexp";
const STATE_PREFIX: &str = "state:";

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct ProgressionStoreBuilder {
    path: PathBuf,
    catalog: ChallengeCatalog,
}

impl ProgressionStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            catalog: ChallengeCatalog::standard(),
        }
    }

    /// Catalog used to initialize states as they are loaded.
    pub fn with_catalog(mut self, catalog: ChallengeCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn open(self) -> Result<ProgressionStore, ProgressionError> {
        ProgressionStore::open_with_catalog(self.path, self.catalog)
    }
}

/// Sled-backed persistence for per-profile progression state. Each profile is
/// one JSON document, so events and challenges are stored under their string
/// keys and survive catalog changes between releases.
pub struct ProgressionStore {
    _db: sled::Db,
    primary: sled::Tree,
    catalog: ChallengeCatalog,
}

impl ProgressionStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ProgressionError> {
        Self::open_with_catalog(path, ChallengeCatalog::standard())
    }

    fn open_with_catalog<P: AsRef<Path>>(
        path: P,
        catalog: ChallengeCatalog,
    ) -> Result<Self, ProgressionError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let primary = db.open_tree(TREE_PRIMARY)?;
        Ok(Self {
            _db: db,
            primary,
            catalog,
        })
    }

    fn state_key(profile: &str) -> Vec<u8> {
        format!("{}{}", STATE_PREFIX, profile.to_ascii_lowercase()).into_bytes()
    }

    /// Fetch and initialize the state for `profile`, if one was saved.
    pub fn load_state(&self, profile: &str) -> Result<Option<ProgressionState>, ProgressionError> {
        let Some(bytes) = self.primary.get(Self::state_key(profile))? else {
            return Ok(None);
        };
        let mut state = ProgressionState::from_json_slice(&bytes)?;
        let report = state.initialize(&self.catalog);
        debug!(
            "Loaded profile '{}' ({} XP, repaired {})",
            profile, state.total_xp, report.challenges_repaired
        );
        Ok(Some(state))
    }

    /// Like [`ProgressionStore::load_state`], falling back to a fresh state.
    pub fn load_or_default(&self, profile: &str) -> Result<ProgressionState, ProgressionError> {
        match self.load_state(profile)? {
            Some(state) => Ok(state),
            None => {
                let mut state = ProgressionState::new();
                state.initialize(&self.catalog);
                Ok(state)
            }
        }
    }

    /// Fetch a state that must exist.
    pub fn get_state(&self, profile: &str) -> Result<ProgressionState, ProgressionError> {
        self.load_state(profile)?
            .ok_or_else(|| ProgressionError::NotFound(format!("profile: {}", profile)))
    }

    /// Insert or replace the state for `profile`.
    pub fn save_state(&self, profile: &str, state: &ProgressionState) -> Result<(), ProgressionError> {
        let bytes = state.to_json_vec()?;
        self.primary.insert(Self::state_key(profile), bytes)?;
        self.primary.flush()?;
        Ok(())
    }

    /// Returns whether a state was present.
    pub fn delete_state(&self, profile: &str) -> Result<bool, ProgressionError> {
        let removed = self.primary.remove(Self::state_key(profile))?.is_some();
        self.primary.flush()?;
        Ok(removed)
    }

    /// List all stored profile names.
    pub fn list_profiles(&self) -> Result<Vec<String>, ProgressionError> {
        let mut ids = Vec::new();
        for entry in self.primary.scan_prefix(STATE_PREFIX.as_bytes()) {
            let (key, _) = entry?;
            let text = String::from_utf8_lossy(&key);
            if let Some(profile) = text.strip_prefix(STATE_PREFIX) {
                ids.push(profile.to_string());
            }
        }
        Ok(ids)
    }

    /// Pretty-printed JSON document for backups.
    pub fn export_json(&self, profile: &str) -> Result<String, ProgressionError> {
        let state = self.get_state(profile)?;
        Ok(serde_json::to_string_pretty(&state)?)
    }

    /// Replace `profile` with a previously exported document.
    pub fn import_json(&self, profile: &str, json: &str) -> Result<ProgressionState, ProgressionError> {
        let mut state = ProgressionState::from_json_slice(json.as_bytes())?;
        state.initialize(&self.catalog);
        self.save_state(profile, &state)?;
        Ok(state)
    }
}
