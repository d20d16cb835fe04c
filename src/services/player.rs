//! Client-side player state: the loading indicator and the fullscreen +
//! landscape convenience toggle. Display capabilities come from the host
//! through [`DisplaySurface`]; every one of them is optional.

use thiserror::Error;

use super::embed::Provider;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("not supported on this platform")]
    Unsupported,

    #[error("request rejected: {0}")]
    Rejected(String),
}

/// Fullscreen and orientation controls of the host display. Fullscreen is
/// always requested for the player container, never the raw iframe, so the
/// click shields and the toggle button stay on top.
pub trait DisplaySurface {
    fn is_fullscreen(&self) -> bool;
    fn request_fullscreen(&mut self) -> Result<(), PlatformError>;
    fn exit_fullscreen(&mut self) -> Result<(), PlatformError>;
    fn lock_landscape(&mut self) -> Result<(), PlatformError>;
    fn unlock_orientation(&mut self) -> Result<(), PlatformError>;
}

/// Result of a toggle. Callers may ignore it; failures were already logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullscreenOutcome {
    pub fullscreen: bool,
    pub orientation_locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    provider: Provider,
    video_id: String,
    loaded: bool,
    fullscreen: bool,
}

impl PlayerState {
    pub fn new(provider: Provider, raw: &str) -> Self {
        Self {
            provider,
            video_id: provider.extract_id(raw),
            loaded: false,
            fullscreen: false,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Whether the loading indicator should be shown.
    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Point the player at a new source. The loading indicator comes back
    /// only when the extracted id actually changes.
    pub fn set_source(&mut self, raw: &str) {
        let next = self.provider.extract_id(raw);
        if next != self.video_id {
            self.video_id = next;
            self.loaded = false;
        }
    }

    /// The iframe finished loading.
    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    /// Host reported a fullscreen change (e.g. the user pressed Escape).
    pub fn sync_fullscreen(&mut self, surface: &dyn DisplaySurface) {
        self.fullscreen = surface.is_fullscreen();
    }

    pub fn toggle_fullscreen(&mut self, surface: &mut dyn DisplaySurface) -> FullscreenOutcome {
        if surface.is_fullscreen() {
            if let Err(e) = surface.exit_fullscreen() {
                log::warn!("Fullscreen exit failed: {}", e);
            }
            if let Err(e) = surface.unlock_orientation() {
                log::debug!("Orientation unlock skipped: {}", e);
            }
            self.fullscreen = surface.is_fullscreen();
            return FullscreenOutcome {
                fullscreen: self.fullscreen,
                orientation_locked: false,
            };
        }

        if let Err(e) = surface.request_fullscreen() {
            log::warn!("Fullscreen request failed: {}", e);
            self.fullscreen = surface.is_fullscreen();
            return FullscreenOutcome {
                fullscreen: self.fullscreen,
                orientation_locked: false,
            };
        }

        let orientation_locked = match surface.lock_landscape() {
            Ok(()) => true,
            Err(e) => {
                log::info!("Landscape lock not available: {}", e);
                false
            }
        };
        self.fullscreen = surface.is_fullscreen();

        FullscreenOutcome {
            fullscreen: self.fullscreen,
            orientation_locked,
        }
    }
}
