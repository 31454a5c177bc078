use axum::{
    extract::rejection::BytesRejection,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read body: {0}")]
    BodyRead(#[from] BytesRejection),
    #[error("json decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

impl IngestError {
    fn reason(&self) -> &'static str {
        match self {
            IngestError::BodyRead(_) => "Failed to read body\n",
            IngestError::Decode(_) => "Invalid JSON\n",
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        // Every ingest failure is the client's fault.
        tracing::warn!(error = %self, "rejected snapshot");
        (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.reason(),
        )
            .into_response()
    }
}
