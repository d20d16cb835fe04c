use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

use crate::store::{NewVideoEntry, VideoEntry, VideoUpdate};

#[derive(Debug, Queryable, Selectable, Clone)]
#[diesel(table_name = crate::db::schema::videos)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VideoRow {
    pub id: Uuid,
    pub title: String,
    pub video_id: String,
    pub thumbnail: Option<String>,
    pub live: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::db::schema::videos)]
pub struct NewVideoRow {
    pub id: Uuid,
    pub title: String,
    pub video_id: String,
    pub thumbnail: Option<String>,
    pub live: bool,
    pub created_at: NaiveDateTime,
}

/// Full overwrite of the editable columns. A `None` thumbnail clears the
/// column instead of leaving it untouched.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::db::schema::videos)]
#[diesel(treat_none_as_null = true)]
pub struct VideoChanges {
    pub title: String,
    pub video_id: String,
    pub thumbnail: Option<String>,
    pub live: bool,
    pub updated_at: Option<NaiveDateTime>,
}

impl NewVideoRow {
    pub fn from_entry(id: Uuid, entry: NewVideoEntry, now: NaiveDateTime) -> Self {
        Self {
            id,
            title: entry.title,
            video_id: entry.video_id,
            thumbnail: entry.thumbnail,
            live: entry.live,
            created_at: now,
        }
    }
}

impl VideoChanges {
    pub fn from_update(update: VideoUpdate, now: NaiveDateTime) -> Self {
        Self {
            title: update.title,
            video_id: update.video_id,
            thumbnail: update.thumbnail,
            live: update.live,
            updated_at: Some(now),
        }
    }
}

impl From<VideoRow> for VideoEntry {
    fn from(row: VideoRow) -> Self {
        VideoEntry::from_stored(
            row.id.to_string(),
            row.title,
            row.video_id,
            row.thumbnail,
            row.live,
            Some(row.created_at.and_utc()),
            row.updated_at.map(|t| t.and_utc()),
        )
    }
}
