use serde::Serialize;

use super::mode_selector::ViewerMode;
use crate::store::VideoEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    EvaluatingConfig,
    CatalogMode,
    ForcedLiveMode,
}

#[derive(Debug, Clone)]
pub enum ViewerAction {
    AuthResolved,
    ConfigResolved(ViewerMode),
    SnapshotReceived(Vec<VideoEntry>),
    VideoSelected(String),
}

/// Everything the viewing surface renders, owned by one page activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    pub phase: Phase,
    pub authenticated: bool,
    pub loading: bool,
    pub entries: Vec<VideoEntry>,
    pub selected: Option<VideoEntry>,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            phase: Phase::EvaluatingConfig,
            authenticated: false,
            loading: true,
            entries: Vec::new(),
            selected: None,
        }
    }
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action. Actions that make no sense in the current phase
    /// leave the state untouched.
    pub fn apply(mut self, action: ViewerAction) -> Self {
        match action {
            ViewerAction::AuthResolved => {
                self.authenticated = true;
            }
            ViewerAction::ConfigResolved(mode) => {
                // decided once per activation
                if self.phase != Phase::EvaluatingConfig {
                    return self;
                }
                match mode {
                    ViewerMode::ForcedLive(entry) => {
                        self.phase = Phase::ForcedLiveMode;
                        self.entries = vec![entry.clone()];
                        self.selected = Some(entry);
                        self.loading = false;
                    }
                    ViewerMode::Catalog => {
                        self.phase = Phase::CatalogMode;
                    }
                }
            }
            ViewerAction::SnapshotReceived(entries) => {
                if self.phase != Phase::CatalogMode {
                    return self;
                }
                self.selected = self
                    .selected
                    .take()
                    .and_then(|sel| entries.iter().find(|e| e.id == sel.id).cloned());
                self.entries = entries;
                self.loading = false;
            }
            ViewerAction::VideoSelected(id) => {
                if let Some(entry) = self.entries.iter().find(|e| e.id == id) {
                    self.selected = Some(entry.clone());
                }
            }
        }
        self
    }

    /// The store subscription is wanted only in catalog mode, and only once
    /// the session handshake has settled.
    pub fn wants_subscription(&self) -> bool {
        self.phase == Phase::CatalogMode && self.authenticated
    }
}
