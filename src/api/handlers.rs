use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use crate::answering::AnswerEngine;
use crate::api::error_codes;
use crate::api::models::{ApiError, HackRxRequest, HackRxResponse, HealthResponse, ServiceInfo};
use crate::error::QaError;
use crate::ingest::{load_document, DocumentSource};
use crate::metrics::{StatsSnapshot, METRICS};

const SERVICE_NAME: &str = "policy-qa";

pub const INVALID_FORMAT: &str =
    "Invalid request format. Required: documents (string) and questions (array)";

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, Json<ApiError>)>;

/// Request limits applied before any download happens
#[derive(Debug, Clone, Copy)]
pub struct RunLimits {
    pub max_questions: usize,
    pub min_text_chars: usize,
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnswerEngine>,
    pub source: Arc<dyn DocumentSource>,
    pub limits: RunLimits,
}

/// GET /
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Insurance policy question answering API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        features: vec![
            "pdf-extraction".to_string(),
            "rule-matching".to_string(),
            "lexical-ranking".to_string(),
        ],
    })
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.export_prometheus(),
    )
}

/// GET /stats
pub async fn stats() -> Json<StatsSnapshot> {
    Json(METRICS.snapshot())
}

/// Answer questions about one policy document
///
/// POST /hackrx/run
#[instrument(skip_all, fields(request_id = %uuid::Uuid::new_v4()))]
pub async fn run_hackrx(
    State(state): State<AppState>,
    payload: std::result::Result<Json<HackRxRequest>, JsonRejection>,
) -> ApiResult<HackRxResponse> {
    let start = Instant::now();

    let result = process_run(&state, payload).await;
    METRICS.record_run(result.is_ok(), start.elapsed().as_secs_f64());

    if let Ok(ref response) = result {
        info!(
            "Answered {} questions in {:?}",
            response.answers.len(),
            start.elapsed()
        );
    }

    result.map(Json)
}

async fn process_run(
    state: &AppState,
    payload: std::result::Result<Json<HackRxRequest>, JsonRejection>,
) -> std::result::Result<HackRxResponse, (StatusCode, Json<ApiError>)> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ApiError::new(
                    error_codes::PAYLOAD_TOO_LARGE,
                    "Request body too large",
                )),
            )
        } else {
            validation_error(INVALID_FORMAT)
        }
    })?;

    if request.documents.trim().is_empty() {
        return Err(validation_error("documents cannot be empty"));
    }

    if request.questions.len() > state.limits.max_questions {
        return Err(validation_error(format!(
            "questions cannot exceed {}",
            state.limits.max_questions
        )));
    }

    info!(
        "Run request: {} questions for {}",
        request.questions.len(),
        request.documents
    );

    let document = load_document(
        state.source.as_ref(),
        &request.documents,
        state.limits.min_text_chars,
    )
    .await
    .map_err(|e| error_response(&e))?;

    let engine = state.engine.clone();
    let questions = request.questions;
    let answers = tokio::task::spawn_blocking(move || engine.generate_answers(&document, &questions))
        .await
        .map_err(|e| {
            error!("Answer task failed: {}", e);
            error_response(&QaError::Internal(e.to_string()))
        })?;

    Ok(HackRxResponse {
        answers: answers.into_iter().map(|answer| answer.text).collect(),
    })
}

fn validation_error(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new(error_codes::VALIDATION_ERROR, message)),
    )
}

/// Map a request-level failure to its status and error body
pub fn error_response(e: &QaError) -> (StatusCode, Json<ApiError>) {
    let (status, code, message) = match e {
        QaError::InvalidRequest(msg) => (
            StatusCode::BAD_REQUEST,
            error_codes::VALIDATION_ERROR,
            msg.clone(),
        ),
        QaError::DownloadFailed(_) | QaError::UpstreamStatus { .. } => (
            StatusCode::BAD_GATEWAY,
            error_codes::UPSTREAM_ERROR,
            e.to_string(),
        ),
        QaError::DownloadTimeout(_) => (
            StatusCode::GATEWAY_TIMEOUT,
            error_codes::TIMEOUT,
            "Timed out downloading document".to_string(),
        ),
        QaError::DocumentTooLarge { .. } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            error_codes::DOCUMENT_TOO_LARGE,
            e.to_string(),
        ),
        QaError::ExtractionFailed(_) => (
            StatusCode::BAD_REQUEST,
            error_codes::DOCUMENT_PROCESSING_FAILED,
            format!("Document processing failed: {}", e),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            "Internal server error".to_string(),
        ),
    };

    (status, Json(ApiError::new(code, message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::EXTRACTION_FAILED;

    #[test]
    fn test_error_response_statuses() {
        let cases = [
            (QaError::InvalidRequest("bad url".into()), StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            (QaError::UpstreamStatus { status: 404 }, StatusCode::BAD_GATEWAY, error_codes::UPSTREAM_ERROR),
            (QaError::DownloadFailed("reset".into()), StatusCode::BAD_GATEWAY, error_codes::UPSTREAM_ERROR),
            (QaError::DownloadTimeout("slow".into()), StatusCode::GATEWAY_TIMEOUT, error_codes::TIMEOUT),
            (QaError::DocumentTooLarge { size: 10, limit: 5 }, StatusCode::PAYLOAD_TOO_LARGE, error_codes::DOCUMENT_TOO_LARGE),
            (QaError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR),
        ];

        for (err, status, code) in cases {
            let (actual_status, Json(body)) = error_response(&err);
            assert_eq!(actual_status, status, "{:?}", err);
            assert_eq!(body.code, code);
        }
    }

    #[test]
    fn test_extraction_failure_message() {
        let (status, Json(body)) =
            error_response(&QaError::ExtractionFailed(EXTRACTION_FAILED.to_string()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, error_codes::DOCUMENT_PROCESSING_FAILED);
        assert_eq!(
            body.message,
            format!("Document processing failed: {}", EXTRACTION_FAILED)
        );
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let (_, Json(body)) = error_response(&QaError::Internal("secret path".into()));
        assert!(!body.message.contains("secret"));
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.service, "policy-qa");
    }
}
