//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cart_catalog::CatalogConfig;
use cart_store::StoreConfig;
use serde::{Deserialize, Serialize};

/// Overrides the catalog base URL.
pub const ENV_CATALOG_URL: &str = "CART_CATALOG_URL";
/// Overrides the storage directory.
pub const ENV_STORAGE_DIR: &str = "CART_STORAGE_DIR";

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Catalog service.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Local persistence.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cart store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Log output.
    #[serde(default)]
    pub log: LogConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Apply `CART_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_CATALOG_URL).filter(|v| !v.is_empty()) {
            self.catalog.base_url = url;
        }
        if let Some(dir) = lookup(ENV_STORAGE_DIR).filter(|v| !v.is_empty()) {
            self.storage.dir = PathBuf::from(dir);
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Where the cart is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one file per key.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".cart")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

/// Generate a default configuration file.
pub fn generate_default_config() -> String {
    r#"# Cart configuration

[catalog]
# Base URL of the catalog service (override with CART_CATALOG_URL)
base_url = "http://localhost:3333"
# Request timeout in seconds
timeout_secs = 10
# Serve products and stock from a JSON file instead of HTTP
# fixture = "catalog.json"

[storage]
# Directory the cart is saved in (override with CART_STORAGE_DIR)
dir = ".cart"

[store]
# Key the cart is saved under
storage_key = "@RocketShoes:cart"

[log]
# Default filter when RUST_LOG is unset
level = "warn"
# "human" or "json"
format = "human"
"#
    .to_string()
}
