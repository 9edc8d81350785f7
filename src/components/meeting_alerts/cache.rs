use crate::components::google_calendar::Event;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Immutable view of the cache at one point in time
pub type Snapshot = Arc<Vec<Event>>;

/// Latest successfully fetched meetings.
///
/// The lock only guards the pointer: readers clone the `Arc` and drop the guard, the
/// writer swaps in a new `Arc`. Nothing is mutated in place.
#[derive(Clone, Default)]
pub struct EventCache {
    current: Arc<RwLock<Snapshot>>,
}

impl EventCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new event set
    pub async fn replace(&self, events: Vec<Event>) {
        let snapshot = Arc::new(events);
        *self.current.write().await = snapshot;
    }

    /// Current event set, safe to hold across awaits
    pub async fn read(&self) -> Snapshot {
        Arc::clone(&*self.current.read().await)
    }
}
