use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tokio::task::JoinHandle;

use crate::models::Snapshot;
use crate::point::Point;

pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum InfluxError {
    #[error("influx request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("influx rejected write with {status}: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("influx reported status {status:?}")]
    Unhealthy { status: String },
}

#[derive(Clone)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
    pub write_timeout: Duration,
    pub health_timeout: Duration,
}

impl InfluxConfig {
    pub fn masked_token(&self) -> String {
        // Only the first five characters ever reach the logs.
        let prefix: String = self.token.chars().take(5).collect();
        format!("{prefix}...")
    }
}

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

/// Shared InfluxDB v2 client; clones reuse one connection pool.
#[derive(Clone)]
pub struct InfluxWriter {
    client: Client,
    config: Arc<InfluxConfig>,
    in_flight: Arc<AtomicUsize>,
}

impl InfluxWriter {
    pub fn new(config: InfluxConfig) -> Result<Self, InfluxError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            config: Arc::new(config),
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.url.trim_end_matches('/'))
    }

    pub async fn health(&self) -> Result<String, InfluxError> {
        let response = self
            .client
            .get(self.endpoint("/health"))
            .timeout(self.config.health_timeout)
            .send()
            .await?;
        let body: HealthResponse = response.json().await?;
        if body.status == "pass" {
            Ok(body.status)
        } else {
            Err(InfluxError::Unhealthy {
                status: body.status,
            })
        }
    }

    pub async fn write_point(&self, point: &Point) -> Result<(), InfluxError> {
        let response = self
            .client
            .post(self.endpoint("/api/v2/write"))
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", "s"),
            ])
            .header(header::AUTHORIZATION, format!("Token {}", self.config.token))
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .timeout(self.config.write_timeout)
            .body(point.to_line_protocol())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(InfluxError::Rejected { status, body })
    }

    pub fn spawn_write(&self, snapshot: &Snapshot) -> JoinHandle<()> {
        // Fire-and-forget: failures are logged and dropped, never retried.
        let point = Point::from_snapshot(snapshot);
        let writer = self.clone();
        writer.in_flight.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(async move {
            match writer.write_point(&point).await {
                Ok(()) => tracing::info!(
                    label = %point_label(&point),
                    timestamp = point.timestamp_secs,
                    "wrote stats to influx"
                ),
                Err(err) => tracing::error!(
                    error = %err,
                    label = %point_label(&point),
                    timestamp = point.timestamp_secs,
                    "influx write failed"
                ),
            }
            writer.in_flight.fetch_sub(1, Ordering::SeqCst);
        })
    }

    pub fn pending_writes(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

fn point_label(point: &Point) -> &str {
    point
        .tags
        .iter()
        .find(|(key, _)| *key == "label")
        .map(|(_, value)| value.as_str())
        .unwrap_or_default()
}
