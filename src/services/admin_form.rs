// src/services/admin_form.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::{NewVideoEntry, VideoEntry, VideoUpdate};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("title is required")]
    MissingTitle,

    #[error("videoId is required")]
    MissingVideoId,
}

/// Field state of the add/edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub live: bool,
}

impl VideoForm {
    /// Edit state for an existing document.
    pub fn from_entry(entry: &VideoEntry) -> Self {
        Self {
            title: entry.title.clone(),
            video_id: entry.video_id.clone(),
            thumbnail: entry.thumbnail.clone(),
            live: entry.live,
        }
    }

    /// Blank form shown after a successful create.
    pub fn cleared() -> Self {
        Self::default()
    }

    fn validated(&self) -> Result<(String, String, Option<String>), FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::MissingTitle);
        }
        let video_id = self.video_id.trim();
        if video_id.is_empty() {
            return Err(FormError::MissingVideoId);
        }
        let thumbnail = Some(self.thumbnail.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Ok((title.to_string(), video_id.to_string(), thumbnail))
    }

    pub fn to_new_entry(&self) -> Result<NewVideoEntry, FormError> {
        let (title, video_id, thumbnail) = self.validated()?;
        Ok(NewVideoEntry {
            title,
            video_id,
            thumbnail,
            live: self.live,
        })
    }

    pub fn to_update(&self) -> Result<VideoUpdate, FormError> {
        let (title, video_id, thumbnail) = self.validated()?;
        Ok(VideoUpdate {
            title,
            video_id,
            thumbnail,
            live: self.live,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PLACEHOLDER_THUMBNAIL;

    #[test]
    fn title_and_video_id_are_required() {
        let form = VideoForm {
            title: "  ".into(),
            video_id: "1".into(),
            ..Default::default()
        };
        assert_eq!(form.to_new_entry(), Err(FormError::MissingTitle));

        let form = VideoForm {
            title: "Final".into(),
            ..Default::default()
        };
        assert_eq!(form.to_update(), Err(FormError::MissingVideoId));
    }

    #[test]
    fn blank_thumbnail_is_left_for_the_read_fallback() {
        let form = VideoForm {
            title: " Final ".into(),
            video_id: "12345".into(),
            thumbnail: " ".into(),
            live: false,
        };
        let entry = form.to_new_entry().unwrap();
        assert_eq!(entry.title, "Final");
        assert_eq!(entry.thumbnail, None);
        assert!(!entry.live);
    }

    #[test]
    fn missing_json_fields_take_form_defaults() {
        let form: VideoForm =
            serde_json::from_str(r#"{"title":"Final","videoId":"12345"}"#).unwrap();
        assert_eq!(form.thumbnail, "");
        assert!(!form.live);
    }

    #[test]
    fn edit_state_mirrors_the_stored_entry() {
        let entry = VideoEntry::from_stored(
            "x".into(),
            "Final".into(),
            "12345".into(),
            None,
            true,
            None,
            None,
        );
        let form = VideoForm::from_entry(&entry);
        assert_eq!(form.thumbnail, PLACEHOLDER_THUMBNAIL);
        assert!(form.live);
        assert_eq!(VideoForm::cleared(), VideoForm::default());
    }
}
