//! # State Blob Repository
//!
//! Key/value storage for serialized state containers.
//!
//! Each key holds exactly one blob. Saving replaces the previous blob
//! atomically, so a reader sees either the old or the new snapshot, never a
//! mix of the two.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Repository for the `state_blobs` table.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.state_blobs();
/// repo.save("categoryProductStore", &bytes).await?;
/// let restored = repo.load("categoryProductStore").await?;
/// ```
#[derive(Debug, Clone)]
pub struct StateBlobRepository {
    pool: SqlitePool,
}

impl StateBlobRepository {
    /// Creates a new StateBlobRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StateBlobRepository { pool }
    }

    /// Loads the blob stored under `key`.
    ///
    /// ## Returns
    /// * `Ok(Some(bytes))` - A blob was saved previously
    /// * `Ok(None)` - Nothing stored under this key (first run)
    pub async fn load(&self, key: &str) -> DbResult<Option<Vec<u8>>> {
        let row = sqlx::query("SELECT blob FROM state_blobs WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        let blob = match row {
            Some(row) => Some(row.try_get::<Vec<u8>, _>("blob")?),
            None => None,
        };

        debug!(
            key = %key,
            bytes = blob.as_ref().map(Vec::len).unwrap_or(0),
            found = blob.is_some(),
            "Loaded state blob"
        );

        Ok(blob)
    }

    /// Stores `blob` under `key`, replacing any previous value.
    pub async fn save(&self, key: &str, blob: &[u8]) -> DbResult<()> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO state_blobs (key, blob, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                blob = excluded.blob,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(blob)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = blob.len(), "Saved state blob");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
