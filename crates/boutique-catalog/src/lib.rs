//! # boutique-catalog: Remote Catalog Store
//!
//! Read-only access to the categories and products the storefront lists.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Remote Catalog Store                               │
//! │                                                                         │
//! │  StorefrontState::refresh_products(&source)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 CatalogSource (trait)                             │  │
//! │  │   list_categories() → Vec<Category>                              │  │
//! │  │   list_products()   → Vec<Product>                               │  │
//! │  │   get_product(id)   → Option<Product>     (None = not found)     │  │
//! │  └───────────────┬─────────────────────────────────┬────────────────┘  │
//! │                  ▼                                 ▼                    │
//! │  ┌────────────────────────────┐     ┌──────────────────────────────┐   │
//! │  │ FirestoreClient            │     │ InMemoryCatalog              │   │
//! │  │ REST + typed-value decode  │     │ fixture file / tests         │   │
//! │  └────────────────────────────┘     └──────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - Firestore connection settings
//! - [`error`] - Catalog error types
//! - [`firestore`] - REST client and typed-value decoding
//! - [`memory`] - In-memory source

use std::future::Future;

use boutique_core::{Category, Product};

pub mod config;
pub mod error;
pub mod firestore;
pub mod memory;

pub use config::FirestoreConfig;
pub use error::{CatalogError, CatalogResult};
pub use firestore::FirestoreClient;
pub use memory::InMemoryCatalog;

/// A remote store the catalog cache refreshes from.
///
/// All three operations are reads; the storefront never writes the catalog.
pub trait CatalogSource: Send + Sync {
    /// Fetches every category.
    fn list_categories(&self) -> impl Future<Output = CatalogResult<Vec<Category>>> + Send;

    /// Fetches every product.
    fn list_products(&self) -> impl Future<Output = CatalogResult<Vec<Product>>> + Send;

    /// Fetches one product; `Ok(None)` when no such document exists.
    fn get_product(
        &self,
        product_id: &str,
    ) -> impl Future<Output = CatalogResult<Option<Product>>> + Send;
}
