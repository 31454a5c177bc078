use std::{process::ExitCode, time::Duration};

use reactor_common::{bind_listener, env_non_empty, env_or, init_tracing, shutdown_signal};
use reactor_service::influx::{DEFAULT_HEALTH_TIMEOUT, DEFAULT_WRITE_TIMEOUT};
use reactor_service::{build_router, AppState, InfluxConfig, InfluxWriter, SnapshotStore};

#[derive(Debug, thiserror::Error)]
enum BootstrapError {
    #[error("bind port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },
    #[error("serve: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let _guards = init_tracing("reactor-service");
    tracing::info!("starting reactor-service");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), BootstrapError> {
    let port = env_or("PORT", 8080u16);
    let history_limit = env_or("HISTORY_LIMIT", 0usize);
    let max_body_bytes = env_or("MAX_BODY_BYTES", 64 * 1024usize);

    let influx = build_influx().await;
    let state = AppState::new(SnapshotStore::new(history_limit), influx.clone(), max_body_bytes);
    let app = build_router(state);

    let listener = bind_listener(port)
        .await
        .map_err(|source| BootstrapError::Bind { port, source })?;
    tracing::info!(port, history_limit, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(BootstrapError::Serve)?;

    // In-flight TSDB writes are abandoned with the runtime.
    if let Some(influx) = influx {
        let pending = influx.pending_writes();
        if pending > 0 {
            tracing::warn!(pending, "exiting with influx writes still in flight");
        }
    }
    Ok(())
}

async fn build_influx() -> Option<InfluxWriter> {
    let Some(url) = env_non_empty("INFLUX_URL") else {
        tracing::warn!("INFLUX_URL not set; influx forwarding disabled");
        return None;
    };
    let config = InfluxConfig {
        url,
        token: env_or("INFLUX_TOKEN", String::new()),
        org: env_or("INFLUX_ORG", String::new()),
        bucket: env_or("INFLUX_BUCKET", String::new()),
        write_timeout: Duration::from_secs(env_or(
            "INFLUX_WRITE_TIMEOUT_SECS",
            DEFAULT_WRITE_TIMEOUT.as_secs(),
        )),
        health_timeout: Duration::from_secs(env_or(
            "INFLUX_HEALTH_TIMEOUT_SECS",
            DEFAULT_HEALTH_TIMEOUT.as_secs(),
        )),
    };
    tracing::info!(
        url = %config.url,
        org = %config.org,
        bucket = %config.bucket,
        token = %config.masked_token(),
        "influx config"
    );

    let writer = match InfluxWriter::new(config) {
        Ok(writer) => writer,
        Err(err) => {
            tracing::warn!(error = %err, "influx client init failed");
            return None;
        }
    };

    // A failed probe is not fatal; writes are best-effort anyway.
    match writer.health().await {
        Ok(status) => tracing::info!(status = %status, "influx connected"),
        Err(err) => tracing::warn!(error = %err, "influx health check failed"),
    }
    Some(writer)
}
