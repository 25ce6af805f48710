//! HTTP API: run endpoint, health, metrics

pub mod auth;
pub mod handlers;
pub mod models;
pub mod routes;

pub use auth::{auth_middleware_fn, AuthError, BearerAuth};
pub use handlers::{AppState, RunLimits};
pub use models::error_codes;
pub use routes::build_router;

use crate::answering::AnswerEngine;
use crate::config::Config;
use crate::error::Result;
use crate::ingest::HttpDocumentSource;
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};

/// Wire the HTTP document source, answer engine and auth into a router
pub fn build_app(config: &Config) -> Result<Router> {
    let source = HttpDocumentSource::new(config.document.clone())?;
    let engine = AnswerEngine::new(&config.answering);
    info!("Answer engine ready with {} rules", engine.rules().len());

    let auth = BearerAuth::new(&config.auth);
    if !auth.is_configured() {
        warn!("No bearer token configured, every run request will be rejected");
    }

    let state = AppState {
        engine: Arc::new(engine),
        source: Arc::new(source),
        limits: RunLimits {
            max_questions: config.server.max_questions,
            min_text_chars: config.document.min_text_chars,
        },
    };

    Ok(build_router(
        state,
        Arc::new(auth),
        config.server.max_body_bytes,
    ))
}
