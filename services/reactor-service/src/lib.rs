//! Telemetry ingestion for a reactor controller: snapshots arrive over HTTP, are
//! kept in memory for polling clients and forwarded to InfluxDB.

pub mod app;
pub mod error;
pub mod handlers;
pub mod influx;
pub mod models;
pub mod point;
pub mod state;
pub mod store;

pub use app::build_router;
pub use influx::{InfluxConfig, InfluxError, InfluxWriter};
pub use models::Snapshot;
pub use state::AppState;
pub use store::SnapshotStore;
