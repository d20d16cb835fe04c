// src/services/embed.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static OKRU_EMBED: Lazy<Regex> = Lazy::new(|| Regex::new(r"videoembed/(\d+)").unwrap());
static OKRU_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"ok\.ru/video/(\d+)").unwrap());
static BILIBILI_BVID: Lazy<Regex> = Lazy::new(|| Regex::new(r"BV[a-zA-Z0-9]+").unwrap());
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Third-party platforms the player can embed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    #[serde(alias = "ok.ru", alias = "ok")]
    OkRu,
    Bilibili,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OkRu => "okru",
            Provider::Bilibili => "bilibili",
        }
    }

    /// Reduce a bare id, a page URL, or a pasted embed snippet to the id.
    /// Embed markup wins over a page URL, which wins over the raw string.
    pub fn extract_id(&self, raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return String::new();
        }

        match self {
            Provider::OkRu => OKRU_EMBED
                .captures(raw)
                .or_else(|| OKRU_URL.captures(raw))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| raw.to_string()),
            Provider::Bilibili => BILIBILI_BVID
                .find(raw)
                .or_else(|| DIGITS.find(raw))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| raw.to_string()),
        }
    }

    /// Player URL for an already extracted id.
    pub fn embed_url(&self, id: &str, autoplay: bool) -> String {
        let autoplay = if autoplay { 1 } else { 0 };
        match self {
            Provider::OkRu => {
                format!("https://ok.ru/videoembed/{id}?nochat=1&autoplay={autoplay}")
            }
            // Numeric ids are live rooms, BV ids are uploaded videos.
            Provider::Bilibili if !id.starts_with("BV") => format!(
                "https://www.bilibili.com/blackboard/live/live-activity-player.html?cid={id}&quality=3&danmaku=0&autoplay={autoplay}"
            ),
            Provider::Bilibili => format!(
                "https://player.bilibili.com/player.html?isOutside=true&bvid={id}&high_quality=0&danmaku=0&autoplay={autoplay}"
            ),
        }
    }

    fn allow(&self) -> &'static str {
        match self {
            Provider::OkRu => "autoplay; encrypted-media; picture-in-picture; screen-wake-lock",
            Provider::Bilibili => "autoplay; fullscreen; encrypted-media; picture-in-picture",
        }
    }

    fn overlays(&self) -> Vec<OverlayRegion> {
        match self {
            Provider::OkRu => vec![
                // title bar and channel link
                OverlayRegion::new(Anchor::TopLeft, 100.0, 18.0),
                // share / branding corner
                OverlayRegion::new(Anchor::TopRight, 15.0, 20.0),
                // native fullscreen button and logo
                OverlayRegion::new(Anchor::BottomRight, 36.0, 29.0),
            ],
            Provider::Bilibili => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopRight,
    BottomRight,
}

/// Transparent click shield over a fixed share of the player surface.
/// Clicks and context menus landing on it are swallowed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRegion {
    pub anchor: Anchor,
    pub width_percent: f32,
    pub height_percent: f32,
}

impl OverlayRegion {
    fn new(anchor: Anchor, width_percent: f32, height_percent: f32) -> Self {
        Self {
            anchor,
            width_percent,
            height_percent,
        }
    }
}

/// Everything a client needs to mount the player iframe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedDescriptor {
    pub provider: Provider,
    pub video_id: String,
    pub embed_url: String,
    pub title: String,
    pub autoplay: bool,
    pub allow: String,
    pub overlays: Vec<OverlayRegion>,
}

pub fn describe(provider: Provider, raw: &str, title: &str, autoplay: bool) -> EmbedDescriptor {
    let video_id = provider.extract_id(raw);
    EmbedDescriptor {
        provider,
        embed_url: provider.embed_url(&video_id, autoplay),
        video_id,
        title: title.to_string(),
        autoplay,
        allow: provider.allow().to_string(),
        overlays: provider.overlays(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn okru_prefers_embed_markup_over_page_url() {
        let snippet = r#"<iframe src="//ok.ru/videoembed/11090668161682?nochat=1"></iframe> see ok.ru/video/42"#;
        assert_eq!(Provider::OkRu.extract_id(snippet), "11090668161682");
    }

    #[test]
    fn okru_reads_page_urls_and_bare_ids() {
        assert_eq!(
            Provider::OkRu.extract_id("https://ok.ru/video/9988776655"),
            "9988776655"
        );
        assert_eq!(Provider::OkRu.extract_id("  12345 "), "12345");
        assert_eq!(Provider::OkRu.extract_id("not-a-number"), "not-a-number");
    }

    #[test]
    fn okru_url_carries_nochat_and_autoplay_flags() {
        assert_eq!(
            Provider::OkRu.embed_url("999", true),
            "https://ok.ru/videoembed/999?nochat=1&autoplay=1"
        );
        assert_eq!(
            Provider::OkRu.embed_url("999", false),
            "https://ok.ru/videoembed/999?nochat=1&autoplay=0"
        );
    }

    #[test]
    fn bilibili_switches_between_live_room_and_video_players() {
        let bv = Provider::Bilibili.extract_id("https://www.bilibili.com/video/BV1xx411c7mD/?p=2");
        assert_eq!(bv, "BV1xx411c7mD");
        assert!(Provider::Bilibili
            .embed_url(&bv, false)
            .starts_with("https://player.bilibili.com/player.html?isOutside=true&bvid=BV1xx411c7mD"));

        let room = Provider::Bilibili.extract_id("https://live.bilibili.com/1809235763");
        assert_eq!(room, "1809235763");
        assert_eq!(
            Provider::Bilibili.embed_url(&room, true),
            "https://www.bilibili.com/blackboard/live/live-activity-player.html?cid=1809235763&quality=3&danmaku=0&autoplay=1"
        );
    }

    #[test]
    fn descriptor_lists_okru_click_shields() {
        let d = describe(Provider::OkRu, "ok.ru/video/555", "Match A", true);
        assert_eq!(d.video_id, "555");
        assert_eq!(d.overlays.len(), 3);
        assert!(d.overlays.iter().any(|o| o.anchor == Anchor::BottomRight));
    }

    #[test]
    fn provider_names_parse_from_config_strings() {
        let p: Provider = serde_json::from_str("\"ok.ru\"").unwrap();
        assert_eq!(p, Provider::OkRu);
        let p: Provider = serde_json::from_str("\"bilibili\"").unwrap();
        assert_eq!(p, Provider::Bilibili);
    }
}
