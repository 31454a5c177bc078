use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::get,
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::handlers::{get_history, get_reactor, ping, post_reactor};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);

    Router::new()
        .route("/reactor", get(get_reactor).post(post_reactor))
        .route("/history", get(get_history))
        .route("/ping", get(ping))
        .layer(body_limit)
        .layer(
            // One line per request; outcome is not logged.
            TraceLayer::new_for_http()
                .on_request(|request: &Request<Body>, _span: &Span| {
                    tracing::info!(
                        method = %request.method(),
                        path = %request.uri().path(),
                        "request"
                    );
                })
                .on_response(())
                .on_failure(()),
        )
        .with_state(state)
}
