use async_trait::async_trait;
use chrono::Utc;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    ChangeFeed, NewVideoEntry, StoreError, Subscription, VideoEntry, VideoStore, VideoUpdate,
};
use crate::db::models::{NewVideoRow, VideoChanges, VideoRow};
use crate::db::schema::videos;
use crate::db::DbPool;

/// `videos` table behind a deadpool of async diesel connections. Writes made
/// through this store are republished on its change feed.
pub struct PgVideoStore {
    pool: DbPool,
    feed: ChangeFeed,
    // One reload at a time, so a slow older reload cannot publish last.
    refresh: Mutex<()>,
}

impl PgVideoStore {
    /// Loads the current table contents so the first subscriber sees them.
    pub async fn new(pool: DbPool) -> Result<Self, StoreError> {
        let store = Self {
            pool,
            feed: ChangeFeed::new(Vec::new()),
            refresh: Mutex::new(()),
        };
        let initial = store.load_all().await?;
        store.feed.publish(initial);
        Ok(store)
    }

    async fn load_all(&self) -> Result<Vec<VideoEntry>, StoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        let rows = videos::table
            .order_by(videos::created_at.asc())
            .select(VideoRow::as_select())
            .load::<VideoRow>(&mut conn)
            .await?;

        Ok(rows.into_iter().map(VideoEntry::from).collect())
    }

    /// The write already happened; a failed reload only delays viewers.
    async fn republish(&self) {
        let _serial = self.refresh.lock().await;
        match self.load_all().await {
            Ok(entries) => self.feed.publish(entries),
            Err(e) => log::error!("Failed to refresh video feed: {}", e),
        }
    }
}

// Ids that are not UUIDs can never name a row.
fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn create(&self, entry: NewVideoEntry) -> Result<VideoEntry, StoreError> {
        let row = NewVideoRow::from_entry(Uuid::new_v4(), entry, Utc::now().naive_utc());

        let created = {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|e| StoreError::Pool(e.to_string()))?;

            diesel::insert_into(videos::table)
                .values(&row)
                .returning(VideoRow::as_returning())
                .get_result::<VideoRow>(&mut conn)
                .await?
        };

        self.republish().await;
        Ok(created.into())
    }

    async fn get(&self, id: &str) -> Result<Option<VideoEntry>, StoreError> {
        let Some(uuid) = parse_id(id) else {
            return Ok(None);
        };
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        let row = videos::table
            .find(uuid)
            .select(VideoRow::as_select())
            .first::<VideoRow>(&mut conn)
            .await
            .optional()?;

        Ok(row.map(VideoEntry::from))
    }

    async fn list(&self) -> Result<Vec<VideoEntry>, StoreError> {
        self.load_all().await
    }

    async fn update(&self, id: &str, update: VideoUpdate) -> Result<VideoEntry, StoreError> {
        let uuid = parse_id(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let changes = VideoChanges::from_update(update, Utc::now().naive_utc());

        let updated = {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|e| StoreError::Pool(e.to_string()))?;

            diesel::update(videos::table.find(uuid))
                .set(&changes)
                .returning(VideoRow::as_returning())
                .get_result::<VideoRow>(&mut conn)
                .await
                .optional()?
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?
        };

        self.republish().await;
        Ok(updated.into())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let uuid = parse_id(id).ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let removed = {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|e| StoreError::Pool(e.to_string()))?;

            diesel::delete(videos::table.filter(videos::id.eq(uuid)))
                .execute(&mut conn)
                .await?
        };

        if removed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        self.republish().await;
        Ok(())
    }

    fn subscribe(&self) -> Subscription {
        self.feed.subscribe()
    }

    fn active_subscriptions(&self) -> usize {
        self.feed.active()
    }
}
