//! Codec configuration
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (codec.toml)
//! - Environment variables (CODEC__*)
//!
//! ## Example config file (codec.toml):
//! ```toml
//! [limits]
//! max_block_count = 1048576
//! max_block_size = 67108864
//! max_bytes_len = 16777216
//! max_depth = 64
//! ```
//!
//! The loaded [`CodecConfig`] is handed to
//! [`Codec::with_config`](crate::Codec::with_config); nothing here is global.

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for compiled codecs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Decode limits
    #[serde(default)]
    pub limits: DecodeLimits,
}

/// Upper bounds checked before decode allocates from a declared size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeLimits {
    /// Most items allowed in a single array or map block
    #[serde(default = "default_limit")]
    pub max_block_count: u64,

    /// Largest byte size a block may declare
    #[serde(default = "default_limit")]
    pub max_block_size: u64,

    /// Longest bytes or string value
    #[serde(default = "default_limit")]
    pub max_bytes_len: u64,

    /// Deepest nesting of arrays, maps, records, and unions
    #[serde(default = "default_max_depth")]
    pub max_depth: u64,
}

fn default_limit() -> u64 {
    i32::MAX as u64
}

fn default_max_depth() -> u64 {
    256
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_block_count: default_limit(),
            max_block_size: default_limit(),
            max_bytes_len: default_limit(),
            max_depth: default_max_depth(),
        }
    }
}

impl CodecConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["codec.toml", ".codec.toml", "config/codec.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "schema-codec") {
            let xdg_config = config_dir.config_dir().join("codec.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("CODEC")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
