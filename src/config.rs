//! Layered configuration: defaults, optional TOML file, then environment

use crate::error::Result;
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default config file consulted when `POLICY_QA_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub document: DocumentConfig,

    #[serde(default)]
    pub answering: AnsweringConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Maximum questions accepted in one run request
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_max_body_bytes() -> usize { 1024 * 1024 }
fn default_max_questions() -> usize { 100 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            max_questions: default_max_questions(),
        }
    }
}

impl ServerConfig {
    /// Socket address string for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Bearer token authentication
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Expected bearer token. Requests are rejected while unset.
    #[serde(default)]
    pub bearer_token: Option<Secret<String>>,
}

/// Document download and extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Download timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Largest document body accepted, in bytes
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,

    /// Extracted text shorter than this is treated as an extraction failure
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,

    /// Retries after the first failed attempt
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,

    /// Base backoff in milliseconds, doubled per attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_ms() -> u64 { 30_000 }
fn default_max_document_bytes() -> usize { 25 * 1024 * 1024 }
fn default_min_text_chars() -> usize { 50 }
fn default_retry_attempts() -> usize { 2 }
fn default_retry_backoff_ms() -> u64 { 200 }
fn default_user_agent() -> String { format!("policy-qa/{}", env!("CARGO_PKG_VERSION")) }

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_document_bytes: default_max_document_bytes(),
            min_text_chars: default_min_text_chars(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl DocumentConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get retry backoff as Duration
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Fallback ranker tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnsweringConfig {
    /// Sentences concatenated into a ranked answer
    #[serde(default = "default_max_ranked_sentences")]
    pub max_ranked_sentences: usize,

    /// Sentences at or below this trimmed length are ignored
    #[serde(default = "default_min_sentence_chars")]
    pub min_sentence_chars: usize,
}

fn default_max_ranked_sentences() -> usize { 2 }
fn default_min_sentence_chars() -> usize { 20 }

impl Default for AnsweringConfig {
    fn default() -> Self {
        Self {
            max_ranked_sentences: default_max_ranked_sentences(),
            min_sentence_chars: default_min_sentence_chars(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load from the file named by `POLICY_QA_CONFIG` (or `config.toml`) and the environment
    pub fn load() -> Result<Self> {
        let path = std::env::var("POLICY_QA_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::from_file(&path)
    }

    /// Load from a TOML file (optional) layered under `POLICY_QA__SECTION__KEY` variables
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("POLICY_QA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config.from_env())
    }

    /// Parse configuration from a TOML string, without consulting the environment
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Apply the unprefixed variables older deployments rely on
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("BEARER_TOKEN") {
            if !val.is_empty() {
                self.auth.bearer_token = Some(Secret::new(val));
            }
        }

        if let Ok(val) = std::env::var("API_HOST") {
            self.server.host = val;
        }

        if let Ok(val) = std::env::var("API_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.max_questions, 100);
        assert!(config.auth.bearer_token.is_none());
        assert_eq!(config.document.min_text_chars, 50);
        assert_eq!(config.answering.max_ranked_sentences, 2);
        assert_eq!(config.answering.min_sentence_chars, 20);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_config_from_toml() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 9100

            [auth]
            bearer_token = "secret-token"

            [document]
            timeout_ms = 1500
            retry_attempts = 0

            [logging]
            level = "debug"
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.auth.bearer_token.as_ref().map(|t| t.expose_secret().as_str()),
            Some("secret-token")
        );
        assert_eq!(config.document.timeout(), Duration::from_millis(1500));
        assert_eq!(config.document.retry_attempts, 0);
        assert_eq!(config.document.min_text_chars, 50);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_config_legacy_env() {
        std::env::set_var("BEARER_TOKEN", "env-token");
        std::env::set_var("API_PORT", "9001");

        let config = Config::default().from_env();

        assert_eq!(
            config.auth.bearer_token.as_ref().map(|t| t.expose_secret().clone()),
            Some("env-token".to_string())
        );
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.server.bind_addr(), "0.0.0.0:9001");

        std::env::remove_var("BEARER_TOKEN");
        std::env::remove_var("API_PORT");
    }

    #[test]
    fn test_duration_conversions() {
        let config = DocumentConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.retry_backoff(), Duration::from_millis(200));
    }
}
