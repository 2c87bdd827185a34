//! # State Module
//!
//! The storefront's one state container and the hooks around it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     StorefrontState                             │   │
//! │  │   Catalog (categories, products, grouping)                      │   │
//! │  │   Bag · DeliveryDetails · OrderStatus                           │   │
//! │  └───────────────┬───────────────────────────────┬─────────────────┘   │
//! │                  │ record(StoreEvent)            │ submit(blob)         │
//! │                  ▼                               ▼                      │
//! │  ┌──────────────────────────┐   ┌────────────────────────────────┐     │
//! │  │  EventSink (events.rs)   │   │  SnapshotSink (persist.rs)     │     │
//! │  │  TracingSink             │   │  SnapshotQueue → writer task   │     │
//! │  │  RecordingSink (tests)   │   │  MemorySnapshotSink (tests)    │     │
//! │  └──────────────────────────┘   └────────────────────────────────┘     │
//! │                                                                         │
//! │  AppConfig (config.rs): read-only after startup                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod events;
mod persist;
mod storefront;

pub use config::{AppConfig, CheckoutConfig, StorageConfig};
pub use events::{BagOperation, CatalogResource, EventSink, RecordingSink, StoreEvent, TracingSink};
pub use persist::{
    spawn_writer, MemorySnapshotSink, Snapshot, SnapshotError, SnapshotQueue, SnapshotSink,
    WriterTask, SNAPSHOT_VERSION,
};
pub use storefront::StorefrontState;
