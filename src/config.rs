use crate::binding::LargeLiteralPolicy;
use crate::result::LoaderError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for one load run, loaded from JSON configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Number of statements executed per transaction
    pub batch_size: usize,
    /// Remove the `pk_name` column and its value from every INSERT
    pub ignore_pk: bool,
    /// Column removed when `ignore_pk` is set, matched case-insensitively
    pub pk_name: String,
    /// Count failures and keep going instead of aborting the run
    pub continue_on_error: bool,
    /// Bytes read and scanned per chunk
    pub chunk_size: usize,
    pub large_literal: LargeLiteralPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig {
            batch_size: 500,
            ignore_pk: false,
            pk_name: "WCSID".to_string(),
            continue_on_error: false,
            chunk_size: 1 << 15,
            large_literal: LargeLiteralPolicy::default(),
        }
    }
}

impl LoaderConfig {
    /// Load the configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&content)?;
        Self::from_json(json)
    }

    /// Load the configuration from a serde_json::Value object; missing fields take defaults
    pub fn from_json(json: serde_json::Value) -> anyhow::Result<Self> {
        if !json.is_object() {
            let err = LoaderError::new_invalid_config("object", json.to_string());
            return Err(err.into());
        }
        let config: LoaderConfig = serde_json::from_value(json).map_err(LoaderError::Json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoaderError> {
        if self.batch_size == 0 {
            return Err(LoaderError::new_invalid_config("batch_size > 0", "0"));
        }
        if self.chunk_size == 0 {
            return Err(LoaderError::new_invalid_config("chunk_size > 0", "0"));
        }
        if self.ignore_pk && self.pk_name.trim().is_empty() {
            return Err(LoaderError::new_invalid_config(
                "non-empty pk_name when ignore_pk is set",
                format!("'{}'", self.pk_name),
            ));
        }
        Ok(())
    }
}
