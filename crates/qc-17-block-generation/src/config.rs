//! Configuration types for block generation
//!
//! Loaded from the `[generation]` table of a TOML file:
//!
//! ```toml
//! [generation]
//! epoch_length = 10
//! skip_if_no_key = true
//! max_block_size = 2097152
//! max_payload_txs = 64
//! notify_observers = true
//! payload_seed = 42
//! ```
//!
//! Missing keys fall back to [`GenerationConfig::default`].

use serde::Deserialize;
use shared_types::SlotCount;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Runtime configuration for chain generation
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Slots per epoch
    pub epoch_length: SlotCount,

    /// Skip slots whose producer has no local key instead of failing
    pub skip_if_no_key: bool,

    /// Maximum serialized payload size in bytes
    pub max_block_size: u64,

    /// Maximum transactions a payload provider puts in one block
    pub max_payload_txs: usize,

    /// Notify block-applied observers on every application
    pub notify_observers: bool,

    /// Seed for the transfer payload generator
    pub payload_seed: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            epoch_length: crate::DEFAULT_EPOCH_LENGTH,
            skip_if_no_key: false,
            max_block_size: crate::DEFAULT_MAX_BLOCK_SIZE,
            max_payload_txs: crate::DEFAULT_MAX_PAYLOAD_TXS,
            notify_observers: true,
            payload_seed: 0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    generation: GenerationConfig,
}

impl GenerationConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        file.generation.validate()?;
        Ok(file.generation)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.epoch_length == 0 {
            return Err(ConfigError::Invalid(
                "epoch_length must be at least 1".into(),
            ));
        }
        if self.max_block_size == 0 {
            return Err(ConfigError::Invalid(
                "max_block_size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Errors that can occur during config loading
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read {path}: {error}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying error
        error: String,
    },
    /// TOML parsing error
    #[error("Failed to parse config: {0}")]
    Parse(String),
    /// Value out of range
    #[error("Invalid config: {0}")]
    Invalid(String),
}
