//! Tool configuration
//!
//! Reads settings from `~/.shelfmark/config.toml` (or `$SHELFMARK_HOME`).
//! Every key is optional:
//!
//! ```toml
//! history_len = 100
//! weighted_random = true
//! whitespace_match = true
//! default_model = "/path/to/model.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::{CatalogOptions, GuessOptions, Result, ShelfError, DEFAULT_HISTORY_LEN};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfConfig {
    /// Number of recently executed IDs skipped by random selection
    #[serde(default = "default_history_len")]
    pub history_len: usize,

    /// Prefer rarely opened records when picking at random
    #[serde(default = "default_true")]
    pub weighted_random: bool,

    /// Let the path guesser match values with spaces written as separators
    #[serde(default = "default_true")]
    pub whitespace_match: bool,

    /// Schema used by `init` when none is given
    #[serde(default)]
    pub default_model: Option<PathBuf>,
}

fn default_history_len() -> usize {
    DEFAULT_HISTORY_LEN
}

fn default_true() -> bool {
    true
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            history_len: default_history_len(),
            weighted_random: true,
            whitespace_match: true,
            default_model: None,
        }
    }
}

impl ShelfConfig {
    /// Load from `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ShelfError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from the default location.
    pub fn load_default() -> Result<Self> {
        Self::load(&default_config_path())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ShelfError::Config(format!("failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            history_len: self.history_len,
            ..CatalogOptions::default()
        }
    }

    pub fn guess_options(&self, fast: bool) -> GuessOptions {
        GuessOptions {
            fast,
            whitespace_match: self.whitespace_match,
        }
    }
}

/// `~/.shelfmark/config.toml`
pub fn default_config_path() -> PathBuf {
    shelfmark_logging::shelfmark_home().join(CONFIG_FILE)
}
