//! Configuration for the fact-checking service.
//!
//! All settings come from environment variables:
//! - `OPENAI_API_KEY` - Required. Credential for the generation and evaluation models.
//! - `TAVILY_API_KEY` - Required. Credential for web search.
//! - `SERP_API_KEY` - Required. Credential for Google Scholar search (SerpAPI).
//! - `MODEL` - Optional. Generation model. Defaults to `gpt-4o-mini`.
//! - `EVALUATOR_MODEL` - Optional. Groundedness judge model. Defaults to `MODEL`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.
//! - `MAX_CYCLES` - Optional. Cap on generation cycles per request. Defaults to `10`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI API key
    pub openai_api_key: String,

    /// Tavily web search API key
    pub tavily_api_key: String,

    /// SerpAPI key for Google Scholar
    pub serp_api_key: String,

    /// Generation model identifier
    pub model: String,

    /// Groundedness evaluator model identifier
    pub evaluator_model: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Cap on generation cycles per request
    pub max_cycles: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if any required credential is
    /// absent. The process must not serve requests without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = require_env("OPENAI_API_KEY")?;
        let tavily_api_key = require_env("TAVILY_API_KEY")?;
        let serp_api_key = require_env("SERP_API_KEY")?;

        let model = std::env::var("MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let evaluator_model = std::env::var("EVALUATOR_MODEL").unwrap_or_else(|_| model.clone());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let max_cycles = std::env::var("MAX_CYCLES")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("MAX_CYCLES".to_string(), format!("{}", e)))?;

        Ok(Self {
            openai_api_key,
            tavily_api_key,
            serp_api_key,
            model,
            evaluator_model,
            host,
            port,
            max_cycles,
        })
    }

    /// Create a config with fixed credentials and defaults (useful for testing).
    pub fn new(
        openai_api_key: impl Into<String>,
        tavily_api_key: impl Into<String>,
        serp_api_key: impl Into<String>,
    ) -> Self {
        Self {
            openai_api_key: openai_api_key.into(),
            tavily_api_key: tavily_api_key.into(),
            serp_api_key: serp_api_key.into(),
            model: "gpt-4o-mini".to_string(),
            evaluator_model: "gpt-4o-mini".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            max_cycles: 10,
        }
    }
}

fn require_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}
