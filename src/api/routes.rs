//! Router assembly

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api::auth::{auth_middleware_fn, BearerAuth};
use crate::api::handlers::{self, AppState};

/// Build the service router
///
/// The run and stats endpoints require a bearer token. Oversized bodies are
/// rejected by the `Json` extractor so they get the usual error body.
pub fn build_router(state: AppState, auth: Arc<BearerAuth>, max_body_bytes: usize) -> Router {
    let protected = Router::new()
        .route("/hackrx/run", post(handlers::run_hackrx))
        .route("/api/v1/hackrx/run", post(handlers::run_hackrx))
        .route("/stats", get(handlers::stats))
        .route_layer(axum::middleware::from_fn_with_state(auth, auth_middleware_fn));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .merge(protected)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
