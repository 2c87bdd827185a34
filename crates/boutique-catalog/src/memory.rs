//! # In-Memory Catalog
//!
//! A [`CatalogSource`] backed by plain vectors. Used by tests and by the
//! CLI's `--catalog-file` option to run the storefront without a network.
//!
//! ## Fixture File Format
//! ```json
//! {
//!   "categories": [{ "id": "c1", "name": "Shirts", "imageUrls": "https://.." }],
//!   "products":   [{ "id": "p1", "category": "c1", "name": "Linen", "price": 49.99 }]
//! }
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use serde::Deserialize;
use tracing::{debug, info};

use boutique_core::{Category, Product};

use crate::error::{CatalogError, CatalogResult};
use crate::CatalogSource;

#[derive(Debug, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    products: Vec<Product>,
}

/// Catalog source holding its records in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    categories: RwLock<Vec<Category>>,
    products: RwLock<Vec<Product>>,
    unavailable: AtomicBool,
    requests: AtomicUsize,
}

impl InMemoryCatalog {
    /// Creates a source serving the given records.
    pub fn new(categories: Vec<Category>, products: Vec<Product>) -> Self {
        InMemoryCatalog {
            categories: RwLock::new(categories),
            products: RwLock::new(products),
            ..Default::default()
        }
    }

    /// Parses a fixture document.
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let fixture: Fixture = serde_json::from_str(json)?;
        Ok(Self::new(fixture.categories, fixture.products))
    }

    /// Loads a fixture file.
    pub fn from_file(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let catalog = Self::from_json_str(&contents)?;
        info!(path = %path.display(), "Loaded catalog fixture");
        Ok(catalog)
    }

    /// Simulates an outage: every request fails with `Unavailable` while set.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Replaces the served categories.
    pub fn set_categories(&self, categories: Vec<Category>) -> CatalogResult<()> {
        *self.categories.write().map_err(|_| CatalogError::Unavailable)? = categories;
        Ok(())
    }

    /// Replaces the served products.
    pub fn set_products(&self, products: Vec<Product>) -> CatalogResult<()> {
        *self.products.write().map_err(|_| CatalogError::Unavailable)? = products;
        Ok(())
    }

    /// Number of requests served or refused so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn begin_request(&self) -> CatalogResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable);
        }
        Ok(())
    }
}

impl CatalogSource for InMemoryCatalog {
    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.begin_request()?;
        let categories = self.categories.read().map_err(|_| CatalogError::Unavailable)?;
        Ok(categories.clone())
    }

    async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        self.begin_request()?;
        let products = self.products.read().map_err(|_| CatalogError::Unavailable)?;
        Ok(products.clone())
    }

    async fn get_product(&self, product_id: &str) -> CatalogResult<Option<Product>> {
        self.begin_request()?;
        let products = self.products.read().map_err(|_| CatalogError::Unavailable)?;
        let found = products.iter().find(|p| p.id == product_id).cloned();
        debug!(product_id, found = found.is_some(), "In-memory product lookup");
        Ok(found)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
