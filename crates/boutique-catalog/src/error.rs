//! # Catalog Error Types
//!
//! Error types for remote catalog operations.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Transport    │  │       Payload           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Http           │  │  Decode                 │ │
//! │  │  Url            │  │  Status         │  │  Json                   │ │
//! │  │                 │  │  Unavailable    │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  None of these reach the storefront user: the catalog cache logs them  │
//! │  and keeps its previous lists.                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Remote catalog failure.
#[derive(Debug, Error)]
pub enum CatalogError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid catalog configuration.
    #[error("Invalid catalog configuration: {0}")]
    InvalidConfig(String),

    /// Failed to build a request URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Failed to read a config or fixture file.
    #[error("Failed to load {path}: {reason}")]
    LoadFailed { path: String, reason: String },

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("Catalog store returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The store is not reachable (offline fixture, outage).
    #[error("Catalog store unavailable")]
    Unavailable,

    // =========================================================================
    // Payload Errors
    // =========================================================================
    /// A document did not have the expected shape.
    #[error("Failed to decode document: {0}")]
    Decode(String),

    /// The response body was not valid JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    /// Returns true for failures that a later refresh may not hit again.
    pub fn is_transient(&self) -> bool {
        match self {
            CatalogError::Http(_) | CatalogError::Unavailable => true,
            CatalogError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(err: toml::de::Error) -> Self {
        CatalogError::InvalidConfig(err.to_string())
    }
}
