//! Bearer token authentication for the run endpoints

use super::models::{error_codes, ApiError};
use crate::config::AuthConfig;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::ExposeSecret;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::warn;

/// Why a request was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header, or not a `Bearer` scheme
    MissingHeader,
    /// Token absent from config or not equal to it
    InvalidToken,
}

impl AuthError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingHeader => "Missing or invalid authorization header",
            Self::InvalidToken => "Invalid bearer token",
        }
    }
}

/// Validates `Authorization: Bearer <token>` against the configured token
pub struct BearerAuth {
    expected: Option<[u8; 32]>,
}

impl BearerAuth {
    pub fn new(config: &AuthConfig) -> Self {
        let expected = config
            .bearer_token
            .as_ref()
            .map(|token| digest(token.expose_secret()));

        Self { expected }
    }

    pub fn is_configured(&self) -> bool {
        self.expected.is_some()
    }

    /// Check a raw `Authorization` header value
    pub fn verify(&self, header: Option<&str>) -> Result<(), AuthError> {
        let token = header
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingHeader)?
            .split(' ')
            .next()
            .unwrap_or_default();

        match self.expected {
            Some(expected) if digest(token) == expected => Ok(()),
            _ => Err(AuthError::InvalidToken),
        }
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// Middleware rejecting unauthenticated requests with 401
pub async fn auth_middleware_fn(
    State(auth): State<Arc<BearerAuth>>,
    request: Request,
    next: Next,
) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth.verify(authorization) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            warn!("Rejected request to {}: {}", request.uri().path(), e.message());
            (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(ApiError::new(error_codes::UNAUTHORIZED, e.message())),
            )
                .into_response()
        }
    }
}
