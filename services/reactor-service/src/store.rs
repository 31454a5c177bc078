use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::Snapshot;

/// Latest snapshot plus publication history, both behind one lock.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<StoreInner>>,
    history_limit: Option<usize>,
}

#[derive(Default)]
struct StoreInner {
    latest: Snapshot,
    history: VecDeque<Snapshot>,
}

impl SnapshotStore {
    pub fn new(history_limit: usize) -> Self {
        // Zero means unbounded.
        Self {
            inner: Arc::default(),
            history_limit: (history_limit > 0).then_some(history_limit),
        }
    }

    pub async fn publish(&self, snapshot: Snapshot) -> usize {
        let mut inner = self.inner.write().await;
        if let Some(limit) = self.history_limit {
            while inner.history.len() >= limit {
                inner.history.pop_front();
            }
        }
        inner.history.push_back(snapshot.clone());
        inner.latest = snapshot;
        inner.history.len()
    }

    pub async fn latest(&self) -> Snapshot {
        self.inner.read().await.latest.clone()
    }

    pub async fn history(&self) -> Vec<Snapshot> {
        self.inner.read().await.history.iter().cloned().collect()
    }

    pub async fn history_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        // Encode under the read lock instead of cloning the whole history.
        let inner = self.inner.read().await;
        serde_json::to_vec(&inner.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(label: &str) -> Snapshot {
        Snapshot {
            computer_label: label.to_string(),
            ..Snapshot::default()
        }
    }

    #[tokio::test]
    async fn starts_with_zero_snapshot() {
        let store = SnapshotStore::new(0);
        assert_eq!(store.latest().await, Snapshot::default());
        assert!(store.history().await.is_empty());
    }

    #[tokio::test]
    async fn publish_updates_latest_and_appends() {
        let store = SnapshotStore::new(0);
        for label in ["A", "B", "C"] {
            store.publish(labelled(label)).await;
        }
        let labels: Vec<_> = store
            .history()
            .await
            .into_iter()
            .map(|snapshot| snapshot.computer_label)
            .collect();
        assert_eq!(labels, ["A", "B", "C"]);
        assert_eq!(store.latest().await.computer_label, "C");
    }

    #[tokio::test]
    async fn limit_evicts_oldest() {
        let store = SnapshotStore::new(2);
        for label in ["A", "B", "C"] {
            store.publish(labelled(label)).await;
        }
        let history = store.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].computer_label, "B");
        assert_eq!(history[1].computer_label, "C");
    }

    #[tokio::test]
    async fn history_json_is_an_array() {
        let store = SnapshotStore::new(0);
        assert_eq!(store.history_json().await.expect("encode"), b"[]");
        store.publish(labelled("A")).await;
        let value: serde_json::Value =
            serde_json::from_slice(&store.history_json().await.expect("encode")).expect("json");
        assert_eq!(value[0]["computerLabel"], "A");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_publishes_keep_latest_in_history() {
        let store = SnapshotStore::new(0);
        let mut tasks = Vec::new();
        for i in 0..64 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.publish(labelled(&i.to_string())).await;
            }));
        }
        for task in tasks {
            task.await.expect("publish task");
        }
        let history = store.history().await;
        assert_eq!(history.len(), 64);
        assert_eq!(history.last(), Some(&store.latest().await));
    }
}
