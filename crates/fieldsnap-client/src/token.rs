//! Session-token persistence.
//!
//! The token lives under a fixed key in a small JSON file in the
//! platform data directory. It survives reloads of the shell, unlike
//! the in-memory session it authenticates.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::info;

use fieldsnap_shared::constants::SESSION_TOKEN_KEY;
use fieldsnap_shared::error::StoreError;

pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store in the platform-appropriate data directory:
    /// - Linux:   `~/.local/share/fieldsnap/session.json`
    /// - macOS:   `~/Library/Application Support/com.fieldsnap.fieldsnap/session.json`
    /// - Windows: `{FOLDERID_RoamingAppData}\fieldsnap\fieldsnap\data\session.json`
    pub fn open() -> Result<Self, StoreError> {
        let project_dirs =
            ProjectDirs::from("com", "fieldsnap", "fieldsnap").ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        fs::create_dir_all(data_dir)?;

        Ok(Self {
            path: data_dir.join("session.json"),
        })
    }

    /// Explicit location, for tests and custom layouts.
    pub fn open_at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Persist the access token under the fixed key.
    pub fn save(&self, token: &str) -> Result<(), StoreError> {
        let mut map = self.read_map()?;
        map.insert(SESSION_TOKEN_KEY.to_string(), token.to_string());
        self.write_map(&map)?;
        info!("Session token saved");
        Ok(())
    }

    pub fn load(&self) -> Result<Option<String>, StoreError> {
        let mut map = self.read_map()?;
        Ok(map.remove(SESSION_TOKEN_KEY))
    }

    /// Remove the token (logout).
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut map = self.read_map()?;
        if map.remove(SESSION_TOKEN_KEY).is_some() {
            self.write_map(&map)?;
            info!("Session token cleared");
        }
        Ok(())
    }

    fn read_map(&self) -> Result<HashMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), StoreError> {
        fs::write(&self.path, serde_json::to_string(map)?)?;
        Ok(())
    }
}
