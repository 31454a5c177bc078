use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::IngestError;
use crate::models::Snapshot;
use crate::state::AppState;

pub async fn ping() -> &'static str {
    "pong"
}

pub async fn post_reactor(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, IngestError> {
    let snapshot = Snapshot::from_json(&body?)?.stamped(unix_now());

    let history_len = state.store.publish(snapshot.clone()).await;
    tracing::debug!(
        label = %snapshot.computer_label,
        timestamp = snapshot.timestamp,
        history_len,
        "snapshot published"
    );

    // Publication happens before the write is queued; the write never blocks the reply.
    if let Some(influx) = &state.influx {
        influx.spawn_write(&snapshot);
    }

    Ok(([(header::CONTENT_TYPE, "text/plain")], "ok\n"))
}

pub async fn get_reactor(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.store.latest().await)
}

pub async fn get_history(State(state): State<AppState>) -> Response {
    match state.store.history_json().await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "history encode failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or_default()
}
