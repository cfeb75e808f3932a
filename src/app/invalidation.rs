use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::infra::cache::ViewCache;

/// A rendered route whose cached output is stale after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Post(Uuid),
    Feed,
}

impl Invalidation {
    pub fn path(&self) -> String {
        match self {
            Self::Post(id) => format!("/post/{}", id),
            Self::Feed => "/".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<Invalidation>,
}

impl InvalidationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: Invalidation) {
        let path = event.path();
        if self.sender.send(event).is_err() {
            debug!(path = %path, "no invalidation subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.sender.subscribe()
    }
}

/// Evicts cached views as invalidation events arrive. Runs until every
/// publisher is dropped.
pub async fn run_consumer(mut events: broadcast::Receiver<Invalidation>, views: ViewCache) {
    loop {
        match events.recv().await {
            Ok(event) => views.evict(&event.path()).await,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                // Missed events leave entries to expire via TTL.
                warn!(skipped, "invalidation consumer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_the_routes() {
        let id = Uuid::nil();
        assert_eq!(
            Invalidation::Post(id).path(),
            "/post/00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(Invalidation::Feed.path(), "/");
    }

    #[tokio::test]
    async fn subscribers_see_published_events() {
        let bus = InvalidationBus::new(8);
        let mut rx = bus.subscribe();
        let id = Uuid::new_v4();

        bus.publish(Invalidation::Post(id));
        bus.publish(Invalidation::Feed);

        assert_eq!(rx.recv().await.unwrap(), Invalidation::Post(id));
        assert_eq!(rx.recv().await.unwrap(), Invalidation::Feed);
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        InvalidationBus::new(1).publish(Invalidation::Feed);
    }
}
