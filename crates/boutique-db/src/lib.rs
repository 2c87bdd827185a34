//! # boutique-db: Persistence Layer for the Boutique storefront
//!
//! Stores the serialized storefront state between runs. The whole state
//! container lives in one row, keyed by a fixed storage key; the blob format
//! belongs to the storefront app and is opaque here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Boutique Storefront Data Flow                      │
//! │                                                                         │
//! │  StorefrontState mutation                                              │
//! │       │  snapshot blob                                                  │
//! │       ▼                                                                 │
//! │  debounced writer task (storefront app)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   boutique-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌─────────────────────┐  ┌────────────┐ │   │
//! │  │   │   Database    │    │ StateBlobRepository │  │ Migrations │ │   │
//! │  │   │   (pool.rs)   │◄───│ load / save         │  │ (embedded) │ │   │
//! │  │   └───────────────┘    └─────────────────────┘  └────────────┘ │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file: <data dir>/storefront.db, table state_blobs             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use boutique_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//! let blob = db.state_blobs().load("categoryProductStore").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::state_blob::StateBlobRepository;
