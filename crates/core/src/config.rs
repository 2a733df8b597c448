use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackerError};

/// Tracker settings shared by every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// ISO 4217 code stamped on every envelope.
    pub currency: String,
    /// Value of `google_business_vertical` on every item.
    pub business_vertical: String,
    /// Product attribute read as `item_brand`.
    pub brand_attribute: String,
    /// Lifetime of side-channel data in the in-memory session store.
    pub session_ttl_secs: u64,
    /// Prefix of the client-held dedup tokens.
    pub dedup_key_prefix: String,
    /// Name of the client-side queue global.
    pub data_layer_name: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            currency: "UAH".to_string(),
            business_vertical: "retail".to_string(),
            brand_attribute: "pa_brand".to_string(),
            session_ttl_secs: 48 * 60 * 60,
            dedup_key_prefix: "cartbeacon_".to_string(),
            data_layer_name: "dataLayer".to_string(),
        }
    }
}

impl TrackerConfig {
    /// `<config dir>/cartbeacon/config.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/etc"))
            .join("cartbeacon")
            .join("config.json")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| TrackerError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: TrackerConfig =
            serde_json::from_str(&raw).map_err(|e| TrackerError::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn validate(&self) -> Result<()> {
        let currency_ok =
            self.currency.len() == 3 && self.currency.chars().all(|c| c.is_ascii_uppercase());
        if !currency_ok {
            return Err(TrackerError::InvalidConfig(format!(
                "currency must be a 3-letter ISO code, got {:?}",
                self.currency
            )));
        }
        if self.business_vertical.trim().is_empty() {
            return Err(TrackerError::InvalidConfig(
                "business_vertical must not be empty".to_string(),
            ));
        }
        if self.session_ttl_secs == 0 {
            return Err(TrackerError::InvalidConfig(
                "session_ttl_secs must be positive".to_string(),
            ));
        }
        let queue_ok = !self.data_layer_name.is_empty()
            && self
                .data_layer_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !queue_ok {
            return Err(TrackerError::InvalidConfig(format!(
                "data_layer_name must be a plain identifier, got {:?}",
                self.data_layer_name
            )));
        }
        let prefix_ok = self
            .dedup_key_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !prefix_ok {
            return Err(TrackerError::InvalidConfig(format!(
                "dedup_key_prefix may only hold letters, digits, '_' and '-', got {:?}",
                self.dedup_key_prefix
            )));
        }
        Ok(())
    }
}
