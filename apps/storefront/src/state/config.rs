//! # Application Configuration
//!
//! Settings loaded once at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BOUTIQUE_DB_PATH=/tmp/storefront.db                                │
//! │     BOUTIQUE_FIRESTORE_PROJECT_ID=boutique-shop                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or storefront.toml in the platform config dir     │
//! │     ~/.config/storefront/storefront.toml (Linux)                       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [storage]
//! database_path = "/var/lib/boutique/storefront.db"
//! save_debounce_ms = 250
//! state_key = "categoryProductStore"
//!
//! [checkout]
//! default_delivery_fee_cents = 495
//!
//! [firestore]
//! project_id = "boutique-shop"
//! api_key = "AIza..."
//! ```
//!
//! Read-only after startup.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use boutique_catalog::FirestoreConfig;
use boutique_core::{Money, STATE_KEY};

use crate::error::{AppError, AppResult};

const CONFIG_FILE: &str = "storefront.toml";
const DATABASE_FILE: &str = "storefront.db";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub checkout: CheckoutConfig,

    #[serde(default)]
    pub firestore: FirestoreConfig,
}

/// Where and how the state container is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite file; defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Quiet window before a burst of mutations is written.
    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,

    /// Key the snapshot is stored under.
    #[serde(default = "default_state_key")]
    pub state_key: String,
}

fn default_save_debounce_ms() -> u64 {
    250
}

fn default_state_key() -> String {
    STATE_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            database_path: None,
            save_debounce_ms: default_save_debounce_ms(),
            state_key: default_state_key(),
        }
    }
}

/// Checkout settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Fee applied when the delivery details don't carry one.
    #[serde(default)]
    pub default_delivery_fee_cents: i64,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (explicit path, else `storefront.toml` if present)
    /// 3. Environment variables
    ///
    /// An explicit path that doesn't exist is an error; a missing default
    /// file is not.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        match config_path {
            Some(path) => {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path).map_err(|e| {
                    AppError::config(format!("Cannot read {}: {}", path.display(), e))
                })?;
                config = toml::from_str(&contents)?;
            }
            None => {
                if let Some(path) = Self::default_config_path().filter(|p| p.exists()) {
                    info!(?path, "Loading config from file");
                    let contents = std::fs::read_to_string(&path)?;
                    config = toml::from_str(&contents)?;
                } else {
                    debug!("No config file, using defaults");
                }
            }
        }

        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;

        Ok(config)
    }

    /// Applies `BOUTIQUE_*` overrides using `lookup` to read variables.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("BOUTIQUE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(ms) = lookup("BOUTIQUE_SAVE_DEBOUNCE_MS").and_then(|v| v.parse().ok()) {
            self.storage.save_debounce_ms = ms;
        }

        if let Some(fee) = lookup("BOUTIQUE_DELIVERY_FEE_CENTS").and_then(|v| v.parse().ok()) {
            self.checkout.default_delivery_fee_cents = fee;
        }

        if let Some(project) = lookup("BOUTIQUE_FIRESTORE_PROJECT_ID") {
            debug!(project = %project, "Overriding Firestore project from environment");
            self.firestore.project_id = project;
        }

        if let Some(key) = lookup("BOUTIQUE_FIRESTORE_API_KEY") {
            self.firestore.api_key = Some(key);
        }

        if let Some(url) = lookup("BOUTIQUE_FIRESTORE_BASE_URL") {
            self.firestore.base_url = url;
        }
    }

    /// Validates the configuration.
    ///
    /// Firestore settings are only checked once a project id is set; without
    /// one the CLI needs `--catalog-file`.
    pub fn validate(&self) -> AppResult<()> {
        if self.storage.state_key.trim().is_empty() {
            return Err(AppError::config("storage.state_key must not be empty"));
        }

        if self.checkout.default_delivery_fee_cents < 0 {
            return Err(AppError::config(
                "checkout.default_delivery_fee_cents must not be negative",
            ));
        }

        if self.firestore.is_configured() {
            self.firestore.validate()?;
        }

        Ok(())
    }

    /// Resolves the SQLite file path.
    ///
    /// ## Platform-Specific Defaults
    /// - **macOS**: `~/Library/Application Support/com.boutique.storefront/storefront.db`
    /// - **Windows**: `%APPDATA%\boutique\storefront\data\storefront.db`
    /// - **Linux**: `~/.local/share/storefront/storefront.db`
    pub fn database_path(&self) -> AppResult<PathBuf> {
        if let Some(path) = &self.storage.database_path {
            return Ok(path.clone());
        }

        let dirs = Self::project_dirs()
            .ok_or_else(|| AppError::config("Could not determine app data directory"))?;
        Ok(dirs.data_dir().join(DATABASE_FILE))
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.storage.save_debounce_ms)
    }

    pub fn default_delivery_fee(&self) -> Money {
        Money::from_cents(self.checkout.default_delivery_fee_cents)
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "boutique", "storefront")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
