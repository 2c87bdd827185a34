//! # Store Events
//!
//! Observability hook for failures the state container swallows.
//!
//! The container never raises on a failed refresh, a lookup miss or bad bag
//! input. Each of those is reported here instead, so the binary can log
//! them and tests can assert on them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StorefrontState ──record(StoreEvent)──► Arc<dyn EventSink>            │
//! │                                              │                          │
//! │                          ┌───────────────────┴──────────────┐           │
//! │                          ▼                                  ▼           │
//! │                    TracingSink                        RecordingSink     │
//! │                    warn!/error!                       Vec<StoreEvent>   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{error, warn};

use boutique_catalog::CatalogError;

/// Which remote read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CatalogResource {
    Categories,
    Products,
    Product,
}

/// Which bag operation rejected its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BagOperation {
    Add,
    Remove,
}

/// A failure reported by the state container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StoreEvent {
    /// A refresh or remote lookup failed; cached state was kept.
    /// `transient` is set for outages, timeouts, 429 and 5xx answers; a
    /// later refresh may succeed without any configuration change.
    CatalogFetchFailed {
        resource: CatalogResource,
        message: String,
        transient: bool,
    },

    /// A product lookup found nothing.
    ProductNotFound { product_id: String },

    /// A bag operation was called with unusable input and did nothing.
    BagInputRejected {
        operation: BagOperation,
        reason: String,
    },

    /// The persisted snapshot could not be restored; state started empty.
    SnapshotRejected { reason: String },

    /// A snapshot could not be handed off or written.
    PersistFailed { reason: String },
}

impl StoreEvent {
    /// Builds a `CatalogFetchFailed` event from the source's error.
    pub fn catalog_fetch_failed(resource: CatalogResource, err: &CatalogError) -> Self {
        StoreEvent::CatalogFetchFailed {
            resource,
            message: err.to_string(),
            transient: err.is_transient(),
        }
    }
}

/// Receiver of [`StoreEvent`]s.
pub trait EventSink: Send + Sync {
    fn record(&self, event: StoreEvent);
}

// =============================================================================
// Tracing Sink
// =============================================================================

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: StoreEvent) {
        match event {
            StoreEvent::CatalogFetchFailed {
                resource,
                message,
                transient: true,
            } => {
                warn!(?resource, error = %message, "Catalog store unreachable, cache kept");
            }
            StoreEvent::CatalogFetchFailed {
                resource,
                message,
                transient: false,
            } => {
                error!(?resource, error = %message, "Error fetching catalog");
            }
            StoreEvent::ProductNotFound { product_id } => {
                warn!(product_id = %product_id, "Product not found");
            }
            StoreEvent::BagInputRejected { operation, reason } => {
                warn!(?operation, reason = %reason, "Bag input rejected");
            }
            StoreEvent::SnapshotRejected { reason } => {
                warn!(reason = %reason, "Discarding persisted state");
            }
            StoreEvent::PersistFailed { reason } => {
                warn!(reason = %reason, "Failed to persist state");
            }
        }
    }
}

// =============================================================================
// Recording Sink
// =============================================================================

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<StoreEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the events recorded so far.
    pub fn events(&self) -> Vec<StoreEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drains the recorded events.
    pub fn take(&self) -> Vec<StoreEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn is_empty(&self) -> bool {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: StoreEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
