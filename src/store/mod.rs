//! The `videos` collection: entry types, the store contract, and the change
//! feed every viewer and the admin listing observe.

mod feed;
mod memory;
mod postgres;

pub use feed::{ChangeFeed, Snapshot, Subscription};
pub use memory::MemoryVideoStore;
pub use postgres::PgVideoStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Shown for any entry stored without a thumbnail.
pub const PLACEHOLDER_THUMBNAIL: &str = "https://img.youtube.com/vi/placeholder/hqdefault.jpg";

/// One catalog item as every reader sees it. Optional fields are already
/// resolved, so `thumbnail` is always a usable URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
    pub id: String,
    pub title: String,
    pub video_id: String,
    pub thumbnail: String,
    pub live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl VideoEntry {
    /// Build an entry from raw stored fields, applying the thumbnail fallback.
    pub fn from_stored(
        id: String,
        title: String,
        video_id: String,
        thumbnail: Option<String>,
        live: bool,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            title,
            video_id,
            thumbnail: resolve_thumbnail(thumbnail),
            live,
            created_at,
            updated_at,
        }
    }
}

fn resolve_thumbnail(thumbnail: Option<String>) -> String {
    thumbnail
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_THUMBNAIL.to_string())
}

/// Validated input for a new document. The store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideoEntry {
    pub title: String,
    pub video_id: String,
    pub thumbnail: Option<String>,
    pub live: bool,
}

/// Replacement values for the editable fields of an existing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUpdate {
    pub title: String,
    pub video_id: String,
    pub thumbnail: Option<String>,
    pub live: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("video '{0}' not found")]
    NotFound(String),

    #[error("connection pool error: {0}")]
    Pool(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// Document collection backing both surfaces.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn create(&self, entry: NewVideoEntry) -> Result<VideoEntry, StoreError>;

    /// `Ok(None)` for ids that never existed, were deleted, or are malformed.
    async fn get(&self, id: &str) -> Result<Option<VideoEntry>, StoreError>;

    async fn list(&self) -> Result<Vec<VideoEntry>, StoreError>;

    async fn update(&self, id: &str, update: VideoUpdate) -> Result<VideoEntry, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Live subscription to the full collection. The first value is the
    /// current contents; the subscription ends when the guard is dropped.
    fn subscribe(&self) -> Subscription;

    /// Number of subscriptions currently held open.
    fn active_subscriptions(&self) -> usize;
}
