//! # Snapshot Persistence
//!
//! Serializes the state container and hands the blob to a background writer.
//!
//! ## Save Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Debounced Snapshot Writer                          │
//! │                                                                         │
//! │  add_item() ─┐                                                          │
//! │  add_item() ─┼─► persist() ─► SnapshotQueue::submit(blob)  (sync)      │
//! │  set_..()  ──┘                        │                                 │
//! │                                       │ unbounded mpsc                   │
//! │                                       ▼                                 │
//! │                     ┌─────────────────────────────────┐                 │
//! │                     │ writer task (tokio::spawn)      │                 │
//! │                     │  recv blob                      │                 │
//! │                     │  keep newest until quiet for    │                 │
//! │                     │  `debounce`                     │                 │
//! │                     │  state_blobs().save(key, blob)  │                 │
//! │                     │  failure → PersistFailed (warn) │                 │
//! │                     └─────────────────────────────────┘                 │
//! │                                                                         │
//! │  Shutdown: drop the state (closes the channel), then                   │
//! │  WriterTask::finish().await flushes the last blob.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Blob Format
//! ```json
//! {
//!   "version": 1,
//!   "savedAt": "2024-05-01T10:00:00Z",
//!   "categories": [...],
//!   "products": [...],
//!   "productsByCategory": { "c1": { "categoryName": .., "categoryProducts": [..] } },
//!   "bag": [{ "product": {..}, "color": "red", "size": "M", "quantity": 2, "addedAt": .. }],
//!   "deliveryDetails": {...},
//!   "orderStatus": { "emailSent": false, "paymentConfirmed": false }
//! }
//! ```
//! `productsByCategory` is written for readers of the blob but ignored on
//! load; the grouping is always recomputed.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use boutique_core::{Bag, Category, CategoryGrouping, DeliveryDetails, OrderStatus, Product};
use boutique_db::StateBlobRepository;

use super::events::{EventSink, StoreEvent};
use crate::error::{AppError, AppResult};

/// Blob format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Why a snapshot could not be decoded or handed off.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found} (expected {})", SNAPSHOT_VERSION)]
    UnsupportedVersion { found: u32 },

    #[error("snapshot writer has shut down")]
    WriterClosed,
}

// =============================================================================
// Blob Format
// =============================================================================

/// Borrowed view of the container, written as the blob.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SnapshotRef<'a> {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub categories: &'a [Category],
    pub products: &'a [Arc<Product>],
    pub products_by_category: &'a CategoryGrouping,
    pub bag: &'a Bag,
    pub delivery_details: &'a DeliveryDetails,
    pub order_status: &'a OrderStatus,
}

impl SnapshotRef<'_> {
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Decoded blob, ready to rebuild the container from.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub bag: Bag,
    #[serde(default)]
    pub delivery_details: DeliveryDetails,
    #[serde(default)]
    pub order_status: OrderStatus,
}

impl Snapshot {
    /// Parses a blob, rejecting other format versions.
    pub fn decode(blob: &[u8]) -> Result<Snapshot, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_slice(blob)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
            });
        }
        Ok(snapshot)
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Receiver of serialized snapshots. Must not block.
pub trait SnapshotSink: Send + Sync {
    fn submit(&self, blob: Vec<u8>) -> Result<(), SnapshotError>;
}

/// Sending half of the background writer.
#[derive(Debug, Clone)]
pub struct SnapshotQueue {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl SnapshotSink for SnapshotQueue {
    fn submit(&self, blob: Vec<u8>) -> Result<(), SnapshotError> {
        self.tx.send(blob).map_err(|_| SnapshotError::WriterClosed)
    }
}

/// Keeps every submitted blob in memory.
#[derive(Debug, Default)]
pub struct MemorySnapshotSink {
    blobs: Mutex<Vec<Vec<u8>>>,
}

impl MemorySnapshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs submitted so far.
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recent blob, if any.
    pub fn latest(&self) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl SnapshotSink for MemorySnapshotSink {
    fn submit(&self, blob: Vec<u8>) -> Result<(), SnapshotError> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(blob);
        Ok(())
    }
}

// =============================================================================
// Writer Task
// =============================================================================

/// Handle on the background writer.
#[derive(Debug)]
pub struct WriterTask {
    handle: JoinHandle<usize>,
}

impl WriterTask {
    /// Waits for the writer to flush and exit.
    ///
    /// The writer only exits once every [`SnapshotQueue`] is dropped, so drop
    /// the state container first. Returns the number of blobs written.
    pub async fn finish(self) -> AppResult<usize> {
        self.handle
            .await
            .map_err(|e| AppError::internal(format!("snapshot writer panicked: {}", e)))
    }
}

/// Spawns the debounced writer for `key`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_writer(
    repo: StateBlobRepository,
    key: impl Into<String>,
    debounce: Duration,
    events: Arc<dyn EventSink>,
) -> (SnapshotQueue, WriterTask) {
    let (tx, rx) = mpsc::unbounded_channel();
    let key = key.into();

    info!(key = %key, debounce_ms = debounce.as_millis() as u64, "Starting snapshot writer");

    let handle = tokio::spawn(run_writer(rx, repo, key, debounce, events));
    (SnapshotQueue { tx }, WriterTask { handle })
}

async fn run_writer(
    mut rx: mpsc::UnboundedReceiver<Vec<u8>>,
    repo: StateBlobRepository,
    key: String,
    debounce: Duration,
    events: Arc<dyn EventSink>,
) -> usize {
    let mut writes = 0;

    while let Some(mut latest) = rx.recv().await {
        let mut coalesced = 0usize;

        // Keep replacing with newer blobs until the queue is quiet
        loop {
            match tokio::time::timeout(debounce, rx.recv()).await {
                Ok(Some(newer)) => {
                    latest = newer;
                    coalesced += 1;
                }
                Ok(None) | Err(_) => break,
            }
        }

        match repo.save(&key, &latest).await {
            Ok(()) => {
                writes += 1;
                debug!(key = %key, bytes = latest.len(), coalesced, "Snapshot written");
            }
            Err(e) => events.record(StoreEvent::PersistFailed {
                reason: e.to_string(),
            }),
        }
    }

    debug!(key = %key, writes, "Snapshot writer stopped");
    writes
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use boutique_db::{Database, DbConfig};

    use super::*;
    use crate::state::events::RecordingSink;

    #[test]
    fn test_decode_rejects_other_versions() {
        let err = Snapshot::decode(br#"{"version": 99}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::UnsupportedVersion { found: 99 }));

        assert!(matches!(
            Snapshot::decode(b"not json").unwrap_err(),
            SnapshotError::Json(_)
        ));
    }

    #[test]
    fn test_decode_minimal_blob() {
        let snapshot = Snapshot::decode(br#"{"version": 1}"#).unwrap();
        assert!(snapshot.categories.is_empty());
        assert!(snapshot.bag.is_empty());
        assert_eq!(snapshot.order_status, OrderStatus::default());
    }

    #[test]
    fn test_decode_ignores_persisted_grouping() {
        let blob = br#"{
            "version": 1,
            "categories": [{"id": "c1", "name": "Shirts"}],
            "products": [{"id": "p1", "category": "c1"}],
            "productsByCategory": {"bogus": {"categoryProducts": "not a list"}}
        }"#;
        let snapshot = Snapshot::decode(blob).unwrap();
        assert_eq!(snapshot.products[0].id, "p1");
    }

    #[tokio::test]
    async fn test_writer_coalesces_burst_and_flushes_on_close() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let events = Arc::new(RecordingSink::new());

        let (queue, writer) = spawn_writer(
            db.state_blobs(),
            "k",
            Duration::from_millis(50),
            events.clone(),
        );

        queue.submit(b"one".to_vec()).unwrap();
        queue.submit(b"two".to_vec()).unwrap();
        queue.submit(b"three".to_vec()).unwrap();
        drop(queue);

        let writes = writer.finish().await.unwrap();
        assert_eq!(writes, 1);
        assert_eq!(
            db.state_blobs().load("k").await.unwrap().unwrap(),
            b"three".to_vec()
        );
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_writer_reports_failed_saves() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let events = Arc::new(RecordingSink::new());
        let (queue, writer) = spawn_writer(
            db.state_blobs(),
            "k",
            Duration::from_millis(10),
            events.clone(),
        );

        db.close().await;
        queue.submit(b"lost".to_vec()).unwrap();
        drop(queue);

        assert_eq!(writer.finish().await.unwrap(), 0);
        assert!(matches!(
            events.events().as_slice(),
            [StoreEvent::PersistFailed { .. }]
        ));
    }

    #[tokio::test]
    async fn test_submit_after_writer_exit_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (queue, writer) = spawn_writer(
            db.state_blobs(),
            "k",
            Duration::from_millis(10),
            Arc::new(RecordingSink::new()),
        );

        writer.handle.abort();
        let _ = writer.handle.await;

        assert!(matches!(
            queue.submit(b"late".to_vec()),
            Err(SnapshotError::WriterClosed)
        ));
    }

    #[test]
    fn test_memory_sink_keeps_latest() {
        let sink = MemorySnapshotSink::new();
        assert!(sink.is_empty());
        sink.submit(b"a".to_vec()).unwrap();
        sink.submit(b"b".to_vec()).unwrap();
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.latest().unwrap(), b"b".to_vec());
    }
}
