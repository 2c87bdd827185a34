//! # Boutique Storefront Library
//!
//! State container, persistence glue and commands behind the `boutique` CLI.
//!
//! ## Module Organization
//! ```text
//! boutique_storefront/
//! ├── lib.rs          ◄─── You are here (bootstrap & shutdown)
//! ├── state/
//! │   ├── mod.rs        ◄─── State type exports
//! │   ├── storefront.rs ◄─── Catalog cache + bag & order state
//! │   ├── events.rs     ◄─── Failure reporting (EventSink)
//! │   ├── persist.rs    ◄─── Snapshot format + debounced writer
//! │   └── config.rs     ◄─── TOML + environment configuration
//! ├── commands/
//! │   ├── mod.rs      ◄─── Command exports
//! │   ├── catalog.rs  ◄─── Refresh, browse, product lookup
//! │   ├── bag.rs      ◄─── Bag manipulation
//! │   └── checkout.rs ◄─── Delivery details, order placement, status
//! └── error.rs        ◄─── Error type for commands
//! ```
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Lifecycle                              │
//! │                                                                         │
//! │  Storefront::open(&config)                                             │
//! │    1. open SQLite (WAL, migrations)                                    │
//! │    2. load blob under storage.state_key                                │
//! │    3. StorefrontState::restore(blob)                                   │
//! │    4. spawn debounced writer, attach as SnapshotSink                   │
//! │                                                                         │
//! │  storefront.state_mut().add_item(..)  ──► writer (in background)       │
//! │                                                                         │
//! │  storefront.shutdown().await                                           │
//! │    5. drop the state (closes the queue)                                │
//! │    6. wait for the writer to flush                                     │
//! │    7. close the pool                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, Level};
use tracing_subscriber::EnvFilter;

use boutique_catalog::{CatalogResult, CatalogSource, FirestoreClient, InMemoryCatalog};
use boutique_core::{Category, Product};
use boutique_db::{Database, DbConfig};

use error::{AppError, AppResult};
use state::{spawn_writer, AppConfig, EventSink, StorefrontState, WriterTask};

// =============================================================================
// Logging
// =============================================================================

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=boutique=trace` - Show trace for boutique crates only
/// - Default: INFO, DEBUG for boutique crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,boutique=debug,sqlx=warn"));

    // try_init: a second call (e.g. from tests) is not an error
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .try_init();
}

// =============================================================================
// Catalog Backend
// =============================================================================

/// The catalog source picked at startup.
#[derive(Debug)]
pub enum CatalogBackend {
    /// Firestore REST API.
    Firestore(FirestoreClient),

    /// Records loaded from a local JSON file.
    Fixture(InMemoryCatalog),
}

impl CatalogBackend {
    /// Picks the backend: a fixture file wins over Firestore.
    pub fn from_config(config: &AppConfig, catalog_file: Option<&Path>) -> AppResult<Self> {
        if let Some(path) = catalog_file {
            return Ok(CatalogBackend::Fixture(InMemoryCatalog::from_file(path)?));
        }

        if !config.firestore.is_configured() {
            return Err(AppError::config(
                "No catalog source: set firestore.project_id or pass --catalog-file",
            ));
        }

        info!(project = %config.firestore.project_id, "Using Firestore catalog");
        Ok(CatalogBackend::Firestore(FirestoreClient::new(
            config.firestore.clone(),
        )?))
    }
}

impl CatalogSource for CatalogBackend {
    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        match self {
            CatalogBackend::Firestore(client) => client.list_categories().await,
            CatalogBackend::Fixture(catalog) => catalog.list_categories().await,
        }
    }

    async fn list_products(&self) -> CatalogResult<Vec<Product>> {
        match self {
            CatalogBackend::Firestore(client) => client.list_products().await,
            CatalogBackend::Fixture(catalog) => catalog.list_products().await,
        }
    }

    async fn get_product(&self, product_id: &str) -> CatalogResult<Option<Product>> {
        match self {
            CatalogBackend::Firestore(client) => client.get_product(product_id).await,
            CatalogBackend::Fixture(catalog) => catalog.get_product(product_id).await,
        }
    }
}

// =============================================================================
// Storefront
// =============================================================================

/// A restored state container wired to its database.
#[derive(Debug)]
pub struct Storefront {
    state: StorefrontState,
    writer: WriterTask,
    db: Database,
}

impl Storefront {
    /// Opens the database named by `config` and restores the saved state.
    pub async fn open(config: &AppConfig, events: Arc<dyn EventSink>) -> AppResult<Self> {
        let db_path = config.database_path()?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        Self::with_database(db, config, events).await
    }

    /// Restores the saved state from an already open database.
    pub async fn with_database(
        db: Database,
        config: &AppConfig,
        events: Arc<dyn EventSink>,
    ) -> AppResult<Self> {
        let key = config.storage.state_key.as_str();
        let blob = db.state_blobs().load(key).await?;
        debug!(key, found = blob.is_some(), "Loaded persisted state");

        let (queue, writer) = spawn_writer(
            db.state_blobs(),
            key,
            config.save_debounce(),
            Arc::clone(&events),
        );

        let state = StorefrontState::restore(blob.as_deref(), events)
            .with_persistence(Arc::new(queue));

        Ok(Storefront { state, writer, db })
    }

    pub fn state(&self) -> &StorefrontState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut StorefrontState {
        &mut self.state
    }

    /// Flushes pending saves and closes the database.
    ///
    /// Returns the number of snapshots written since [`Storefront::open`].
    pub async fn shutdown(self) -> AppResult<usize> {
        let Storefront { state, writer, db } = self;
        drop(state);

        let writes = writer.finish().await?;
        db.close().await;

        info!(writes, "Storefront shut down");
        Ok(writes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use boutique_core::Money;

    use super::*;
    use crate::state::{RecordingSink, StoreEvent};

    fn temp_config() -> (AppConfig, PathBuf) {
        let path = std::env::temp_dir().join(format!("boutique-{}.db", uuid::Uuid::new_v4()));
        let mut config = AppConfig::default();
        config.storage.database_path = Some(path.clone());
        config.storage.save_debounce_ms = 5;
        (config, path)
    }

    fn cleanup(path: &Path) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.as_os_str().to_owned();
            file.push(suffix);
            let _ = std::fs::remove_file(PathBuf::from(file));
        }
    }

    #[tokio::test]
    async fn test_state_survives_restart() {
        let (config, path) = temp_config();
        let events = Arc::new(RecordingSink::new());
        let fixture = InMemoryCatalog::new(
            vec![Category::new("c1", "Shirts")],
            vec![Product::new("p1", "c1").with_price(Money::from_cents(1500))],
        );

        let mut storefront = Storefront::open(&config, events.clone()).await.unwrap();
        let state = storefront.state_mut();
        assert!(state.refresh_categories(&fixture).await);
        assert!(state.refresh_products(&fixture).await);
        let product = state.find_product("p1");
        state.add_item(product.as_ref(), "red", "M", 2);
        state.set_order_email_status(false);
        assert!(storefront.shutdown().await.unwrap() >= 1);

        let reopened = Storefront::open(&config, events.clone()).await.unwrap();
        let state = reopened.state();
        assert_eq!(state.quantity_of("p1", "red", "M"), 2);
        assert_eq!(state.bag_subtotal().unwrap(), Money::from_cents(3000));
        assert!(state.category_group("c1").is_some());
        assert!(state.order_status().payment_confirmed);
        reopened.shutdown().await.unwrap();

        assert!(events.is_empty(), "{:?}", events.events());
        cleanup(&path);
    }

    #[tokio::test]
    async fn test_corrupt_blob_starts_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let config = AppConfig::default();
        db.state_blobs()
            .save(&config.storage.state_key, b"{broken")
            .await
            .unwrap();

        let events = Arc::new(RecordingSink::new());
        let storefront = Storefront::with_database(db, &config, events.clone())
            .await
            .unwrap();

        assert!(storefront.state().bag().is_empty());
        assert!(matches!(
            events.events().as_slice(),
            [StoreEvent::SnapshotRejected { .. }]
        ));
        assert_eq!(storefront.shutdown().await.unwrap(), 0);
    }

    #[test]
    fn test_backend_requires_a_source() {
        let err = CatalogBackend::from_config(&AppConfig::default(), None).unwrap_err();
        assert_eq!(err.code, error::ErrorCode::ConfigError);

        let mut config = AppConfig::default();
        config.firestore.project_id = "shop".into();
        assert!(matches!(
            CatalogBackend::from_config(&config, None).unwrap(),
            CatalogBackend::Firestore(_)
        ));
    }
}
