use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    ChangeFeed, NewVideoEntry, StoreError, Subscription, VideoEntry, VideoStore, VideoUpdate,
};

/// Process-local collection used for development and tests. Keeps creation
/// order and mirrors the Postgres store's semantics.
pub struct MemoryVideoStore {
    videos: RwLock<Vec<VideoEntry>>,
    feed: ChangeFeed,
}

impl MemoryVideoStore {
    pub fn new() -> Self {
        Self {
            videos: RwLock::new(Vec::new()),
            feed: ChangeFeed::new(Vec::new()),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<VideoEntry>>, StoreError> {
        self.videos
            .read()
            .map_err(|_| StoreError::Database("video lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<VideoEntry>>, StoreError> {
        self.videos
            .write()
            .map_err(|_| StoreError::Database("video lock poisoned".to_string()))
    }
}

impl Default for MemoryVideoStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoStore for MemoryVideoStore {
    async fn create(&self, entry: NewVideoEntry) -> Result<VideoEntry, StoreError> {
        let created = VideoEntry::from_stored(
            Uuid::new_v4().to_string(),
            entry.title,
            entry.video_id,
            entry.thumbnail,
            entry.live,
            Some(Utc::now()),
            None,
        );

        // Publish under the lock so concurrent writers cannot reorder snapshots.
        let mut videos = self.write()?;
        videos.push(created.clone());
        self.feed.publish(videos.clone());
        drop(videos);

        Ok(created)
    }

    async fn get(&self, id: &str) -> Result<Option<VideoEntry>, StoreError> {
        Ok(self.read()?.iter().find(|v| v.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<VideoEntry>, StoreError> {
        Ok(self.read()?.clone())
    }

    async fn update(&self, id: &str, update: VideoUpdate) -> Result<VideoEntry, StoreError> {
        let mut videos = self.write()?;
        let slot = videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        *slot = VideoEntry::from_stored(
            slot.id.clone(),
            update.title,
            update.video_id,
            update.thumbnail,
            update.live,
            slot.created_at,
            Some(Utc::now()),
        );
        let updated = slot.clone();
        self.feed.publish(videos.clone());
        drop(videos);

        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let mut videos = self.write()?;
        let before = videos.len();
        videos.retain(|v| v.id != id);
        if videos.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.feed.publish(videos.clone());
        drop(videos);

        Ok(())
    }

    fn subscribe(&self) -> Subscription {
        self.feed.subscribe()
    }

    fn active_subscriptions(&self) -> usize {
        self.feed.active()
    }
}
