use crate::influx::InfluxWriter;
use crate::store::SnapshotStore;

#[derive(Clone)]
pub struct AppState {
    pub store: SnapshotStore,
    /// `None` when no TSDB is configured; snapshots are then kept in memory only.
    pub influx: Option<InfluxWriter>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(store: SnapshotStore, influx: Option<InfluxWriter>, max_body_bytes: usize) -> Self {
        Self {
            store,
            influx,
            max_body_bytes,
        }
    }
}
