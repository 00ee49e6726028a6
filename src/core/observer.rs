use crate::domain::model::{Element, PageSnapshot};
use tokio::sync::watch;

/// Shared handle over the live page state.
///
/// Mutations go through [`Page::apply`], which notifies every pending wait.
/// Waits are poll-or-subscribe: the current snapshot is probed before any
/// subscription is created, so a condition that already holds resolves with
/// zero observer side effects.
#[derive(Debug, Clone)]
pub struct Page {
    state: watch::Sender<PageSnapshot>,
}

impl Page {
    pub fn new(snapshot: PageSnapshot) -> Self {
        let (state, _) = watch::channel(snapshot);
        Self { state }
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.state.borrow().clone()
    }

    /// Mutate the page and wake every pending wait, whether or not the
    /// mutation is relevant to them.
    pub fn apply<F: FnOnce(&mut PageSnapshot)>(&self, mutate: F) {
        self.state.send_modify(mutate);
    }

    /// Live subscriptions; only waits that missed their immediate probe
    /// count here.
    pub fn watcher_count(&self) -> usize {
        self.state.receiver_count()
    }

    /// Resolve once the probe matches a snapshot of the page.
    ///
    /// Matches the current snapshot immediately when possible; otherwise
    /// subscribes and re-probes after every mutation, dropping the
    /// subscription as soon as the probe matches. Each call is an
    /// independent watch and resolves exactly once. There is no timeout: if
    /// the probe never matches (or the page handle is dropped) the future
    /// stays pending forever.
    pub async fn wait_for<T, F>(&self, probe: F) -> T
    where
        F: Fn(&PageSnapshot) -> Option<T>,
    {
        if let Some(found) = probe(&self.state.borrow()) {
            return found;
        }

        let mut rx = self.state.subscribe();
        loop {
            // Re-probe before waiting: a mutation may have landed between
            // the miss above and the subscription.
            if let Some(found) = probe(&rx.borrow_and_update()) {
                return found;
            }

            if rx.changed().await.is_err() {
                // Page handle dropped without a match; stay pending.
                std::future::pending::<()>().await;
            }
        }
    }

    /// Wait until an element with the given selector class appears and
    /// return a clone of it.
    pub async fn wait_for_element(&self, class: &str) -> Element {
        self.wait_for(|snapshot| snapshot.query(class).cloned())
            .await
    }
}
