//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.state_blobs()                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StateBlobRepository                                                   │
//! │  ├── load(&self, key)          → Option<Vec<u8>>                       │
//! │  ├── save(&self, key, blob)    → upsert                                │
//! │  └── delete(&self, key)        → bool                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  state_blobs table                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod state_blob;
