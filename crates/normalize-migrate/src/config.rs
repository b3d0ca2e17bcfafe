//! Conversion options.
//!
//! Loads options from:
//! 1. Global: ~/.config/normalize/migrate.toml
//! 2. Per-project: .normalize/migrate.toml (overrides global, key by key)
//!
//! Example migrate.toml:
//! ```toml
//! module_name = "Billing"
//! entry_point = "run"
//! decompose_chains = true
//! expand_types = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid migrate config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Knobs for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionOptions {
    /// Module name; defaults to the first namespace, else `Program`.
    pub module_name: Option<String>,
    /// Name of the function wrapping top-level statements.
    pub entry_point: String,
    /// Split `a.B().C().D()` statements into one binding per step.
    pub decompose_chains: bool,
    /// Bind call receivers that are themselves calls to temporaries.
    pub hoist_nested_calls: bool,
    /// Replace string/char/regex/StringBuilder calls with native operations.
    pub native_operations: bool,
    /// Attach effect annotations to converted callables.
    pub infer_effects: bool,
    /// Emit expanded type spellings (`INT[bits=32][signed=true]`).
    pub expand_types: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            module_name: None,
            entry_point: "main".to_string(),
            decompose_chains: true,
            hoist_nested_calls: true,
            native_operations: true,
            infer_effects: true,
            expand_types: false,
        }
    }
}

impl ConversionOptions {
    /// Load options for a project.
    ///
    /// Missing, unreadable or invalid files are skipped.
    pub fn load(root: &Path) -> Self {
        let mut merged = toml::Table::new();
        let paths = Self::global_config_path()
            .into_iter()
            .chain(std::iter::once(Self::project_config_path(root)));
        for path in paths {
            match Self::load_table(&path) {
                Ok(Some(table)) => merged.extend(table),
                Ok(None) => {}
                Err(err) => tracing::warn!(path = %path.display(), "ignoring config: {err}"),
            }
        }
        match toml::Value::Table(merged).try_into() {
            Ok(options) => options,
            Err(err) => {
                tracing::warn!("ignoring config: {err}");
                Self::default()
            }
        }
    }

    /// Load options from a single file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }

    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("normalize").join("migrate.toml"))
    }

    fn project_config_path(root: &Path) -> PathBuf {
        root.join(".normalize").join("migrate.toml")
    }

    fn load_table(path: &Path) -> Result<Option<toml::Table>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(toml::from_str(&content)?))
    }
}
