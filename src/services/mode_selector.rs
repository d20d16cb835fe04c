// src/services/mode_selector.rs
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::store::{VideoEntry, PLACEHOLDER_THUMBNAIL};

/// Id given to the entry synthesized in forced-live mode.
pub const FORCED_LIVE_ID: &str = "live-json";

#[derive(Debug, Error)]
pub enum ModeConfigError {
    #[error("remote mode config url is not configured")]
    NotConfigured,

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("invalid config document: {0}")]
    Parse(String),
}

/// The out-of-band switch document `{ isLive, title, videoId }`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteModeConfig {
    #[serde(default)]
    pub is_live: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub video_id: Value,
}

impl RemoteModeConfig {
    /// Only a JSON `true` counts.
    pub fn is_live(&self) -> bool {
        self.is_live == Value::Bool(true)
    }

    /// `videoId` as text; numbers are accepted as well as strings.
    pub fn video_id(&self) -> Option<String> {
        match &self.video_id {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn title(&self) -> Option<String> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    /// The single entry served in forced-live mode, if this document asks
    /// for it and carries enough to build one.
    pub fn forced_live_entry(&self) -> Option<VideoEntry> {
        if !self.is_live() {
            return None;
        }
        let (Some(title), Some(video_id)) = (self.title(), self.video_id()) else {
            log::warn!("Remote config is live but lacks a title or videoId, ignoring");
            return None;
        };

        Some(VideoEntry {
            id: FORCED_LIVE_ID.to_string(),
            title,
            video_id,
            thumbnail: PLACEHOLDER_THUMBNAIL.to_string(),
            live: true,
            created_at: None,
            updated_at: None,
        })
    }
}

/// Where the switch document comes from.
#[async_trait]
pub trait ModeConfigSource: Send + Sync {
    async fn fetch(&self) -> Result<RemoteModeConfig, ModeConfigError>;
}

/// Plain HTTP GET of a static JSON document, bypassing caches.
pub struct HttpModeConfigSource {
    client: Client,
    url: Option<String>,
}

impl HttpModeConfigSource {
    pub fn new(url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait]
impl ModeConfigSource for HttpModeConfigSource {
    async fn fetch(&self) -> Result<RemoteModeConfig, ModeConfigError> {
        let url = self.url.as_deref().ok_or(ModeConfigError::NotConfigured)?;

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| ModeConfigError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ModeConfigError::Status(response.status().as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ModeConfigError::Request(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| ModeConfigError::Parse(e.to_string()))
    }
}

/// Data source chosen for one activation of the viewing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerMode {
    Catalog,
    ForcedLive(VideoEntry),
}

/// Fetch the switch document once and settle on a mode. Every failure
/// converges on catalog mode.
pub async fn select_mode(source: &dyn ModeConfigSource) -> ViewerMode {
    match source.fetch().await {
        Ok(config) => match config.forced_live_entry() {
            Some(entry) => {
                log::info!("High traffic mode active, serving '{}'", entry.title);
                ViewerMode::ForcedLive(entry)
            }
            None => {
                log::info!("Normal mode, serving catalog");
                ViewerMode::Catalog
            }
        },
        Err(e) => {
            log::error!("Config fetch failed, defaulting to catalog: {}", e);
            ViewerMode::Catalog
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixed(Result<Value, u16>);

    #[async_trait]
    impl ModeConfigSource for Fixed {
        async fn fetch(&self) -> Result<RemoteModeConfig, ModeConfigError> {
            match &self.0 {
                Ok(v) => serde_json::from_value(v.clone())
                    .map_err(|e| ModeConfigError::Parse(e.to_string())),
                Err(code) => Err(ModeConfigError::Status(*code)),
            }
        }
    }

    #[tokio::test]
    async fn live_config_forces_a_single_live_entry() {
        let source = Fixed(Ok(json!({"isLive": true, "title": "Match A", "videoId": "999"})));

        let ViewerMode::ForcedLive(entry) = select_mode(&source).await else {
            panic!("expected forced-live mode");
        };
        assert_eq!(entry.id, FORCED_LIVE_ID);
        assert_eq!(entry.title, "Match A");
        assert_eq!(entry.video_id, "999");
        assert_eq!(entry.thumbnail, PLACEHOLDER_THUMBNAIL);
        assert!(entry.live);
    }

    #[tokio::test]
    async fn numeric_video_id_is_accepted() {
        let source = Fixed(Ok(json!({"isLive": true, "title": "Match B", "videoId": 4242})));
        match select_mode(&source).await {
            ViewerMode::ForcedLive(entry) => assert_eq!(entry.video_id, "4242"),
            other => panic!("unexpected mode {other:?}"),
        }
    }

    #[tokio::test]
    async fn anything_but_literal_true_stays_in_catalog_mode() {
        for doc in [
            json!({"isLive": false, "title": "x", "videoId": "1"}),
            json!({"isLive": "true", "title": "x", "videoId": "1"}),
            json!({"isLive": 1, "title": "x", "videoId": "1"}),
            json!({"title": "x", "videoId": "1"}),
            json!({}),
        ] {
            assert_eq!(select_mode(&Fixed(Ok(doc))).await, ViewerMode::Catalog);
        }
    }

    #[tokio::test]
    async fn live_config_without_title_or_video_id_stays_in_catalog_mode() {
        for doc in [
            json!({"isLive": true, "title": "Match A"}),
            json!({"isLive": true, "title": "", "videoId": "1"}),
            json!({"isLive": true, "title": "Match A", "videoId": "  "}),
        ] {
            assert_eq!(select_mode(&Fixed(Ok(doc))).await, ViewerMode::Catalog);
        }
    }

    #[tokio::test]
    async fn fetch_failure_falls_back_to_catalog_mode() {
        assert_eq!(select_mode(&Fixed(Err(503))).await, ViewerMode::Catalog);
        assert_eq!(
            select_mode(&HttpModeConfigSource::new(None)).await,
            ViewerMode::Catalog
        );
    }

    #[tokio::test]
    async fn http_source_bypasses_caches_and_parses_the_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mode"))
            .and(header_exists("cache-control"))
            .and(header("pragma", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"isLive": true, "title": "Match A", "videoId": "999"}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let source = HttpModeConfigSource::new(Some(format!("{}/mode", server.uri())));
        let config = source.fetch().await.unwrap();
        assert!(config.is_live());
        assert_eq!(config.video_id().as_deref(), Some("999"));
    }

    #[tokio::test]
    async fn http_error_status_and_bad_json_are_failures() {
        let server = MockServer::start().await;
        Mock::given(path("/down"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let down = HttpModeConfigSource::new(Some(format!("{}/down", server.uri())));
        assert!(matches!(down.fetch().await, Err(ModeConfigError::Status(500))));
        assert_eq!(select_mode(&down).await, ViewerMode::Catalog);

        let garbage = HttpModeConfigSource::new(Some(format!("{}/garbage", server.uri())));
        assert!(matches!(garbage.fetch().await, Err(ModeConfigError::Parse(_))));
        assert_eq!(select_mode(&garbage).await, ViewerMode::Catalog);
    }
}
