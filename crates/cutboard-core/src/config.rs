//! Tracker configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! storage_key = "mhm-tracker-data-v3"
//! autosave_interval_secs = 30
//! seed_sample_data = true
//! data_dir = "./cutboard-data"
//! ```

use crate::error::TrackerError;
use cutboard_access::builtin_roles;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Storage key of the board state
    pub storage_key: String,
    /// Storage key of the custom roles
    pub custom_roles_key: String,
    /// Master password that always resolves to the administrator
    pub legacy_password: String,
    /// Seconds between autosave ticks
    pub autosave_interval_secs: u64,
    /// Create sample projects when nothing is stored
    pub seed_sample_data: bool,
    /// Accept `client-<name>` passwords
    pub pattern_logins: bool,
    /// Directory for the file backend
    pub data_dir: Option<PathBuf>,
}

impl TrackerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML
    ///
    /// # Errors
    /// `TrackerError::Config` for malformed TOML or values rejected by
    /// [`TrackerConfig::validate`].
    pub fn from_toml_str(raw: &str) -> Result<Self, TrackerError> {
        let config: Self = toml::from_str(raw).map_err(|e| TrackerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// `TrackerError::Config` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| TrackerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    /// Check field values
    ///
    /// # Errors
    /// `TrackerError::Config` for a zero autosave interval, empty storage keys,
    /// or a master password that is also a built-in role's password.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.autosave_interval_secs == 0 {
            return Err(TrackerError::Config(
                "autosave_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.storage_key.is_empty() || self.custom_roles_key.is_empty() {
            return Err(TrackerError::Config("storage keys must not be empty".to_string()));
        }
        if let Some(role) = builtin_roles()
            .into_iter()
            .find(|role| role.password == self.legacy_password)
        {
            return Err(TrackerError::Config(format!(
                "legacy_password is already the password of the '{}' role",
                role.key
            )));
        }
        Ok(())
    }

    /// Autosave period
    #[inline]
    #[must_use]
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_secs)
    }

    /// With data directory
    #[inline]
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// With sample seeding on or off
    #[inline]
    #[must_use]
    pub fn with_seed_sample_data(mut self, seed: bool) -> Self {
        self.seed_sample_data = seed;
        self
    }

    /// With pattern-coded logins on or off
    #[inline]
    #[must_use]
    pub fn with_pattern_logins(mut self, enabled: bool) -> Self {
        self.pattern_logins = enabled;
        self
    }

    /// With autosave period in seconds
    #[inline]
    #[must_use]
    pub fn with_autosave_interval_secs(mut self, secs: u64) -> Self {
        self.autosave_interval_secs = secs;
        self
    }

    /// With master password
    #[inline]
    #[must_use]
    pub fn with_legacy_password(mut self, password: impl Into<String>) -> Self {
        self.legacy_password = password.into();
        self
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage_key: "mhm-tracker-data-v3".to_string(),
            custom_roles_key: "mhm-custom-roles-v1".to_string(),
            legacy_password: "mhm2024".to_string(),
            autosave_interval_secs: 30,
            seed_sample_data: true,
            pattern_logins: true,
            data_dir: None,
        }
    }
}
