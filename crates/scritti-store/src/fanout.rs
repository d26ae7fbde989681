//! Change propagation along reverse dependency edges.
//!
//! A write to one asset must reach subscribers of that asset and of every
//! asset that depends on it, directly or through a chain. The walk is
//! breadth-first over the `dependants` sets with a visited set, so each key
//! is offered the event at most once per pass and cycles terminate.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use scritti_core::AssetKey;

use crate::event::AssetEvent;
use crate::store::StoreInner;

impl StoreInner {
    /// Notifies `origin` and its transitive dependants.
    ///
    /// Returns the number of subscriber channels that accepted an event.
    pub(crate) async fn notify(&self, origin: &AssetKey) -> usize {
        let mut visited: HashSet<AssetKey> = HashSet::new();
        let mut queue: VecDeque<AssetKey> = VecDeque::from([origin.clone()]);
        let mut delivered = 0;

        while let Some(key) = queue.pop_front() {
            if !visited.insert(key.clone()) {
                continue;
            }
            let Some(entry) = self.entries.get(&key).map(|e| Arc::clone(e.value())) else {
                continue;
            };

            let event = AssetEvent {
                key: key.clone(),
                origin: origin.clone(),
            };
            let dependants = {
                let mut state = entry.state.write().await;
                delivered += state.deliver(&event);
                state.dependants.clone()
            };

            queue.extend(
                dependants
                    .into_iter()
                    .filter(|dependant| !visited.contains(dependant)),
            );
        }

        tracing::debug!(
            "change of {} reached {} key(s), {} subscriber(s)",
            origin,
            visited.len(),
            delivered
        );
        delivered
    }
}
