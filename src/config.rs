use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::bencode::{DecodeOptions, DEFAULT_MAX_DEPTH};

/// File looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "bitmeta.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_depth: usize,
    pub reject_duplicate_keys: bool,
    pub json_indent: Option<usize>,
    pub ensure_ascii: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            reject_duplicate_keys: false,
            json_indent: None,
            ensure_ascii: true,
        }
    }
}

impl Config {
    /// Reads `path`, or `bitmeta.toml` when it exists, falling back to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(Path::new(DEFAULT_CONFIG_FILE)),
            None => {
                debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            max_depth: self.max_depth,
            reject_duplicate_keys: self.reject_duplicate_keys,
        }
    }
}
