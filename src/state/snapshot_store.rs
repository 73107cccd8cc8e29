use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::pipeline::Dashboard;

/// A finished dashboard, shared read-only between requests.
pub type Snapshot = Arc<Dashboard<Value>>;

/// Latest dashboard per dataset id. A rebuild replaces the whole snapshot;
/// readers holding the old `Arc` keep a consistent view.
pub struct SnapshotStore {
    default_dataset: String,
    snapshots: DashMap<String, Snapshot>,
}

impl SnapshotStore {
    pub fn new(default_dataset: &str) -> Arc<Self> {
        Arc::new(Self {
            default_dataset: default_dataset.to_string(),
            snapshots: DashMap::new(),
        })
    }

    pub fn default_dataset(&self) -> &str {
        &self.default_dataset
    }

    pub fn insert(&self, dashboard: Dashboard<Value>) -> Snapshot {
        let snapshot = Arc::new(dashboard);
        self.snapshots
            .insert(snapshot.dataset.clone(), Arc::clone(&snapshot));
        snapshot
    }

    pub fn get(&self, dataset: &str) -> Option<Snapshot> {
        self.snapshots.get(dataset).map(|s| Arc::clone(s.value()))
    }

    /// Snapshot of the default dataset, if one has been built.
    pub fn latest(&self) -> Option<Snapshot> {
        self.get(&self.default_dataset)
    }

    pub fn datasets(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.snapshots.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
