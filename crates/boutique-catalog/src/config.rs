//! # Firestore Configuration
//!
//! Connection settings for the remote catalog store.
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [firestore]
//! project_id = "boutique-shop"
//! api_key = "AIza..."          # optional for public-read rules
//! database = "(default)"
//! base_url = "https://firestore.googleapis.com"
//! page_size = 300
//! timeout_secs = 15
//! ```
//!
//! The table is embedded in the storefront's `AppConfig`; environment
//! overrides are applied there.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CatalogError, CatalogResult};

/// Firestore REST settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirestoreConfig {
    /// Google Cloud project id.
    #[serde(default)]
    pub project_id: String,

    /// Web API key, sent as the `key` query parameter when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Database id.
    #[serde(default = "default_database")]
    pub database: String,

    /// REST endpoint root (overridable for the emulator).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Documents requested per page when listing a collection.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_base_url() -> String {
    "https://firestore.googleapis.com".to_string()
}

fn default_page_size() -> u32 {
    300
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        FirestoreConfig {
            project_id: String::new(),
            api_key: None,
            database: default_database(),
            base_url: default_base_url(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FirestoreConfig {
    /// Creates a config for the given project with default settings.
    pub fn for_project(project_id: impl Into<String>) -> Self {
        FirestoreConfig {
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    /// Returns true if enough is set to reach a remote store.
    pub fn is_configured(&self) -> bool {
        !self.project_id.trim().is_empty()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CatalogResult<()> {
        if !self.is_configured() {
            return Err(CatalogError::InvalidConfig(
                "firestore.project_id must be set".into(),
            ));
        }

        if self.database.trim().is_empty() {
            return Err(CatalogError::InvalidConfig(
                "firestore.database must not be empty".into(),
            ));
        }

        let base = Url::parse(&self.base_url)?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(CatalogError::InvalidConfig(format!(
                "firestore.base_url must be http(s), got: {}",
                self.base_url
            )));
        }

        if self.page_size == 0 {
            return Err(CatalogError::InvalidConfig(
                "firestore.page_size must be greater than 0".into(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(CatalogError::InvalidConfig(
                "firestore.timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: FirestoreConfig = toml::from_str(r#"project_id = "shop""#).unwrap();
        assert_eq!(config.project_id, "shop");
        assert_eq!(config.database, "(default)");
        assert_eq!(config.base_url, "https://firestore.googleapis.com");
        assert_eq!(config.page_size, 300);
        assert!(config.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(FirestoreConfig::default().validate().is_err());

        let mut config = FirestoreConfig::for_project("shop");
        config.base_url = "ftp://example.com".into();
        assert!(matches!(config.validate(), Err(CatalogError::InvalidConfig(_))));

        let mut config = FirestoreConfig::for_project("shop");
        config.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(CatalogError::Url(_))));

        let mut config = FirestoreConfig::for_project("shop");
        config.page_size = 0;
        assert!(config.validate().is_err());
    }
}
