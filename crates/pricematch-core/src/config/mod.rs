//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `PRICEMATCH_*` environment
//! variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;

use crate::constants::{
    DEFAULT_COLLECTION_NAME, DEFAULT_EMBEDDING_MODEL, DEFAULT_EXTRACTION_MODEL,
    DEFAULT_MAX_RETRIES, DEFAULT_MIN_MATCH_SCORE, DEFAULT_RERANK_MODEL,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_SCORE_THRESHOLD,
};

/// Default Qdrant URL used when `PRICEMATCH_QDRANT_URL` is not set.
pub const DEFAULT_QDRANT_URL: &str = "http://localhost:6334";

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `PRICEMATCH_*` overrides on top of
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Qdrant endpoint URL. Default: `http://localhost:6334`.
    pub qdrant_url: String,

    /// Catalog collection name. Default: `supermarket_products`.
    pub collection_name: String,

    /// Gemini API key. Unset leaves the extraction and embedding
    /// collaborators unconfigured; the server still starts and reports
    /// degraded readiness.
    pub gemini_api_key: Option<String>,

    /// Embedding model id.
    pub embedding_model: String,

    /// Vision extraction model id.
    pub extraction_model: String,

    /// Re-ranking model id.
    pub rerank_model: String,

    /// Candidates requested per product. Default: `10`.
    pub search_limit: u64,

    /// Index-side score threshold. Default: `0.5`.
    pub score_threshold: f32,

    /// Raw-score floor for preview candidates. Default: `0.7`.
    pub min_match_score: f32,

    /// Whether the LLM re-ranking stage runs. Default: `false`.
    pub rerank_enabled: bool,

    /// Per-call HTTP timeout for external collaborators, in seconds.
    pub request_timeout_secs: u64,

    /// Retry budget for transient embedding failures.
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            qdrant_url: DEFAULT_QDRANT_URL.to_string(),
            collection_name: DEFAULT_COLLECTION_NAME.to_string(),
            gemini_api_key: None,
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            extraction_model: DEFAULT_EXTRACTION_MODEL.to_string(),
            rerank_model: DEFAULT_RERANK_MODEL.to_string(),
            search_limit: DEFAULT_SEARCH_LIMIT,
            score_threshold: DEFAULT_SEARCH_SCORE_THRESHOLD,
            min_match_score: DEFAULT_MIN_MATCH_SCORE,
            rerank_enabled: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "PRICEMATCH_PORT";
    const ENV_BIND_ADDR: &'static str = "PRICEMATCH_BIND_ADDR";
    const ENV_QDRANT_URL: &'static str = "PRICEMATCH_QDRANT_URL";
    const ENV_COLLECTION_NAME: &'static str = "PRICEMATCH_COLLECTION_NAME";
    const ENV_GEMINI_API_KEY: &'static str = "PRICEMATCH_GEMINI_API_KEY";
    const ENV_EMBEDDING_MODEL: &'static str = "PRICEMATCH_EMBEDDING_MODEL";
    const ENV_EXTRACTION_MODEL: &'static str = "PRICEMATCH_EXTRACTION_MODEL";
    const ENV_RERANK_MODEL: &'static str = "PRICEMATCH_RERANK_MODEL";
    const ENV_SEARCH_LIMIT: &'static str = "PRICEMATCH_SEARCH_LIMIT";
    const ENV_SCORE_THRESHOLD: &'static str = "PRICEMATCH_SCORE_THRESHOLD";
    const ENV_MIN_MATCH_SCORE: &'static str = "PRICEMATCH_MIN_MATCH_SCORE";
    const ENV_RERANK_ENABLED: &'static str = "PRICEMATCH_RERANK_ENABLED";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "PRICEMATCH_REQUEST_TIMEOUT_SECS";
    const ENV_MAX_RETRIES: &'static str = "PRICEMATCH_MAX_RETRIES";

    /// Loads configuration from environment variables (falling back to
    /// defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let qdrant_url = Self::parse_string_from_env(Self::ENV_QDRANT_URL, defaults.qdrant_url);
        let collection_name =
            Self::parse_string_from_env(Self::ENV_COLLECTION_NAME, defaults.collection_name);
        let gemini_api_key = Self::parse_optional_string_from_env(Self::ENV_GEMINI_API_KEY);
        let embedding_model =
            Self::parse_string_from_env(Self::ENV_EMBEDDING_MODEL, defaults.embedding_model);
        let extraction_model =
            Self::parse_string_from_env(Self::ENV_EXTRACTION_MODEL, defaults.extraction_model);
        let rerank_model =
            Self::parse_string_from_env(Self::ENV_RERANK_MODEL, defaults.rerank_model);
        let search_limit = Self::parse_u64_from_env(Self::ENV_SEARCH_LIMIT, defaults.search_limit);
        let score_threshold =
            Self::parse_f32_from_env(Self::ENV_SCORE_THRESHOLD, defaults.score_threshold);
        let min_match_score =
            Self::parse_f32_from_env(Self::ENV_MIN_MATCH_SCORE, defaults.min_match_score);
        let rerank_enabled =
            Self::parse_bool_from_env(Self::ENV_RERANK_ENABLED, defaults.rerank_enabled);
        let request_timeout_secs = Self::parse_u64_from_env(
            Self::ENV_REQUEST_TIMEOUT_SECS,
            defaults.request_timeout_secs,
        );
        let max_retries = Self::parse_u32_from_env(Self::ENV_MAX_RETRIES, defaults.max_retries);

        Ok(Self {
            port,
            bind_addr,
            qdrant_url,
            collection_name,
            gemini_api_key,
            embedding_model,
            extraction_model,
            rerank_model,
            search_limit,
            score_threshold,
            min_match_score,
            rerank_enabled,
            request_timeout_secs,
            max_retries,
        })
    }

    /// Validates basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.collection_name.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_COLLECTION_NAME,
            });
        }
        if self.qdrant_url.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                name: Self::ENV_QDRANT_URL,
            });
        }
        if self.search_limit == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_SEARCH_LIMIT,
                value: self.search_limit.to_string(),
                expected: "at least 1",
            });
        }
        for (name, value) in [
            (Self::ENV_SCORE_THRESHOLD, self.score_threshold),
            (Self::ENV_MIN_MATCH_SCORE, self.min_match_score),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    name,
                    value: value.to_string(),
                    expected: "within [0.0, 1.0]",
                });
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                name: Self::ENV_REQUEST_TIMEOUT_SECS,
                value: self.request_timeout_secs.to_string(),
                expected: "at least 1",
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_string_from_env(var_name: &str, default: String) -> String {
        env::var(var_name).unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_u32_from_env(var_name: &str, default: u32) -> u32 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_f32_from_env(var_name: &str, default: f32) -> f32 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn parse_bool_from_env(var_name: &str, default: bool) -> bool {
        env::var(var_name)
            .ok()
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(default)
    }
}
