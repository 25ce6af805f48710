//! Request and response bodies

use crate::answering::QuestionInput;
use serde::{Deserialize, Serialize};

/// Stable error codes returned in [`ApiError::code`]
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const PAYLOAD_TOO_LARGE: &str = "PAYLOAD_TOO_LARGE";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const DOCUMENT_TOO_LARGE: &str = "DOCUMENT_TOO_LARGE";
    pub const DOCUMENT_PROCESSING_FAILED: &str = "DOCUMENT_PROCESSING_FAILED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// POST /hackrx/run body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackRxRequest {
    /// URL of the policy document
    pub documents: String,
    pub questions: Vec<QuestionInput>,
}

/// POST /hackrx/run response, one answer per question in request order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackRxResponse {
    pub answers: Vec<String>,
}

/// Error body for every non-2xx response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub features: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_accepts_mixed_question_entries() {
        let request: HackRxRequest = serde_json::from_value(json!({
            "documents": "https://example.com/policy.pdf",
            "questions": ["What is the grace period?", {"q": 1}]
        }))
        .unwrap();

        assert_eq!(request.questions.len(), 2);
        assert!(matches!(request.questions[0], QuestionInput::Text(_)));
        assert!(matches!(request.questions[1], QuestionInput::Malformed(_)));
    }

    #[test]
    fn test_request_requires_question_array() {
        let result: Result<HackRxRequest, _> = serde_json::from_value(json!({
            "documents": "https://example.com/policy.pdf",
            "questions": "What is the grace period?"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_response_shape() {
        let response = HackRxResponse {
            answers: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"answers": ["a", "b"]})
        );
    }
}
