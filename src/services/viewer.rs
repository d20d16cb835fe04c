//! One activation of the viewing surface: pick the mode, then (catalog mode
//! only) hold a store subscription for as long as the viewer stays mounted.

use futures::stream::{self, BoxStream, StreamExt};
use serde::Serialize;

use super::embed::{self, EmbedDescriptor, Provider};
use super::mode_selector::{select_mode, ModeConfigSource};
use super::viewer_state::{Phase, ViewerAction, ViewerState};
use crate::store::{Subscription, VideoStore};

pub struct Activation {
    state: ViewerState,
    subscription: Option<Subscription>,
}

/// Resolve the mode once. The store is subscribed to only after the mode
/// has settled on catalog and the session handshake is done.
pub async fn activate(
    store: &dyn VideoStore,
    source: &dyn ModeConfigSource,
    authenticated: bool,
) -> Activation {
    let mut state = ViewerState::new();
    if authenticated {
        state = state.apply(ViewerAction::AuthResolved);
    }

    let mode = select_mode(source).await;
    state = state.apply(ViewerAction::ConfigResolved(mode));

    let subscription = if state.wants_subscription() {
        let mut subscription = store.subscribe();
        let current = subscription.current();
        state = state.apply(ViewerAction::SnapshotReceived(current.to_vec()));
        Some(subscription)
    } else {
        None
    };

    Activation {
        state,
        subscription,
    }
}

impl Activation {
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn select(mut self, id: &str) -> Self {
        self.state = self.state.apply(ViewerAction::VideoSelected(id.to_string()));
        self
    }

    /// End the activation, releasing any subscription, and keep the state.
    pub fn into_state(self) -> ViewerState {
        self.state
    }

    /// The current state, then a new state per store change. In forced-live
    /// mode the stream yields once and then idles without touching the
    /// store. Dropping the stream releases the subscription.
    pub fn into_stream(self) -> BoxStream<'static, ViewerState> {
        let Activation {
            state,
            subscription,
        } = self;

        match subscription {
            // The feed replays its current contents first.
            Some(subscription) => subscription
                .into_stream()
                .scan(state, |state, snapshot| {
                    *state = state
                        .clone()
                        .apply(ViewerAction::SnapshotReceived(snapshot.to_vec()));
                    futures::future::ready(Some(state.clone()))
                })
                .boxed(),
            None => stream::once(futures::future::ready(state))
                .chain(stream::pending())
                .boxed(),
        }
    }
}

/// What a viewer renders: the state plus the player for the selection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerView {
    pub high_traffic: bool,
    #[serde(flatten)]
    pub state: ViewerState,
    pub player: Option<EmbedDescriptor>,
}

impl ViewerView {
    pub fn render(state: ViewerState, provider: Provider) -> Self {
        let player = state
            .selected
            .as_ref()
            .map(|entry| embed::describe(provider, &entry.video_id, &entry.title, true));
        Self {
            high_traffic: state.phase == Phase::ForcedLiveMode,
            state,
            player,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::mode_selector::{ModeConfigError, RemoteModeConfig};
    use crate::store::{MemoryVideoStore, NewVideoEntry};
    use async_trait::async_trait;

    struct Live;

    #[async_trait]
    impl ModeConfigSource for Live {
        async fn fetch(&self) -> Result<RemoteModeConfig, ModeConfigError> {
            Ok(serde_json::from_value(serde_json::json!({
                "isLive": true, "title": "Match A", "videoId": "999"
            }))
            .unwrap())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl ModeConfigSource for Unreachable {
        async fn fetch(&self) -> Result<RemoteModeConfig, ModeConfigError> {
            Err(ModeConfigError::Request("connection timed out".into()))
        }
    }

    async fn seeded_store(n: usize) -> MemoryVideoStore {
        let store = MemoryVideoStore::new();
        for i in 0..n {
            store
                .create(NewVideoEntry {
                    title: format!("Video {i}"),
                    video_id: format!("{i}"),
                    thumbnail: None,
                    live: false,
                })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn forced_live_never_subscribes_to_the_store() {
        let store = seeded_store(3).await;
        let activation = activate(&store, &Live, true).await;

        assert!(!activation.is_subscribed());
        assert_eq!(store.active_subscriptions(), 0);

        let view = ViewerView::render(activation.into_state(), Provider::OkRu);
        assert!(view.high_traffic);
        assert_eq!(view.state.entries.len(), 1);
        assert!(view.state.entries[0].live);
        let player = view.player.unwrap();
        assert_eq!(player.video_id, "999");
        assert!(player.autoplay);
    }

    #[tokio::test]
    async fn failed_config_shows_store_contents_without_selection() {
        let store = seeded_store(3).await;
        let activation = activate(&store, &Unreachable, true).await;

        assert!(activation.is_subscribed());
        assert_eq!(store.active_subscriptions(), 1);
        let state = activation.into_state();
        assert_eq!(state.phase, Phase::CatalogMode);
        assert_eq!(state.entries.len(), 3);
        assert!(state.entries.iter().all(|e| !e.live));
        assert!(state.selected.is_none());
        assert_eq!(store.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn catalog_stream_follows_writes_and_releases_on_drop() {
        let store = seeded_store(1).await;
        let activation = activate(&store, &Unreachable, true).await;
        let mut states = activation.into_stream();

        let first = states.next().await.unwrap();
        assert_eq!(first.entries.len(), 1);

        store
            .create(NewVideoEntry {
                title: "Late".into(),
                video_id: "7".into(),
                thumbnail: None,
                live: true,
            })
            .await
            .unwrap();
        let second = states.next().await.unwrap();
        assert_eq!(second.entries.len(), 2);
        assert!(second.entries[1].live);

        drop(states);
        assert_eq!(store.active_subscriptions(), 0);
    }

    #[tokio::test]
    async fn selection_survives_store_writes_on_the_stream() {
        let store = seeded_store(2).await;
        let picked = store.list().await.unwrap()[1].id.clone();
        let activation = activate(&store, &Unreachable, true).await.select(&picked);
        let mut states = activation.into_stream();

        let first = states.next().await.unwrap();
        assert_eq!(first.selected.as_ref().map(|e| e.id.as_str()), Some(picked.as_str()));

        store
            .create(NewVideoEntry {
                title: "Late".into(),
                video_id: "7".into(),
                thumbnail: None,
                live: false,
            })
            .await
            .unwrap();
        let second = states.next().await.unwrap();
        assert_eq!(second.entries.len(), 3);
        assert_eq!(second.selected.map(|e| e.id), Some(picked));
    }

    #[tokio::test]
    async fn unauthenticated_catalog_activation_does_not_subscribe() {
        let store = seeded_store(2).await;
        let activation = activate(&store, &Unreachable, false).await;
        assert!(!activation.is_subscribed());
        assert!(activation.state().loading);
    }
}
