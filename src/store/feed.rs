use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

use super::VideoEntry;

/// Full contents of the collection at one point in time.
pub type Snapshot = Arc<Vec<VideoEntry>>;

/// Push channel carrying the whole collection after every write.
#[derive(Clone)]
pub struct ChangeFeed {
    tx: Arc<watch::Sender<Snapshot>>,
    active: Arc<AtomicUsize>,
}

impl ChangeFeed {
    pub fn new(initial: Vec<VideoEntry>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self {
            tx: Arc::new(tx),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the published contents. Succeeds with zero subscribers.
    pub fn publish(&self, entries: Vec<VideoEntry>) {
        self.tx.send_replace(Arc::new(entries));
    }

    pub fn current(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> Subscription {
        self.active.fetch_add(1, Ordering::SeqCst);
        Subscription {
            rx: self.tx.subscribe(),
            guard: ActiveGuard(self.active.clone()),
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
        log::debug!("store subscription released");
    }
}

/// A held subscription. Dropping it (or the stream made from it) releases it.
pub struct Subscription {
    rx: watch::Receiver<Snapshot>,
    guard: ActiveGuard,
}

impl Subscription {
    /// Latest contents, marking them as seen.
    pub fn current(&mut self) -> Snapshot {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next write. `None` once the store has gone away.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Current contents first, then one item per change.
    pub fn into_stream(self) -> impl Stream<Item = Snapshot> + Send + 'static {
        let Subscription { rx, guard } = self;
        WatchStream::new(rx).map(move |snapshot| {
            let _held = &guard;
            snapshot
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> VideoEntry {
        VideoEntry::from_stored(
            id.into(),
            format!("Video {id}"),
            "1".into(),
            None,
            false,
            None,
            None,
        )
    }

    #[test]
    fn dropping_a_subscription_releases_it() {
        let feed = ChangeFeed::new(vec![]);
        let first = feed.subscribe();
        let second = feed.subscribe();
        assert_eq!(feed.active(), 2);

        drop(first);
        assert_eq!(feed.active(), 1);
        drop(second);
        assert_eq!(feed.active(), 0);
    }

    #[tokio::test]
    async fn subscribers_see_current_contents_then_full_replacements() {
        let feed = ChangeFeed::new(vec![entry("a")]);
        let mut sub = feed.subscribe();
        assert_eq!(sub.current().len(), 1);

        feed.publish(vec![entry("a"), entry("b")]);
        let next = sub.changed().await.unwrap();
        assert_eq!(next.len(), 2);
        assert_eq!(next[1].id, "b");
    }

    #[tokio::test]
    async fn stream_holds_the_subscription_until_dropped() {
        let feed = ChangeFeed::new(vec![entry("a")]);
        let mut stream = Box::pin(feed.subscribe().into_stream());
        assert_eq!(feed.active(), 1);

        let first = stream.next().await.unwrap();
        assert_eq!(first[0].id, "a");

        feed.publish(vec![]);
        let second = stream.next().await.unwrap();
        assert!(second.is_empty());

        drop(stream);
        assert_eq!(feed.active(), 0);
    }
}
