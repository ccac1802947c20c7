// config.rs - explicit configuration passed to every analysis
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::chunker::DEFAULT_TOKEN_BUDGET;
use crate::fanout::DEFAULT_WORKERS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown model backend '{0}' (expected 'anthropic' or 'openai')")]
    UnknownBackend(String),

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Which hosted model API the analyses talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModelBackend {
    /// Anthropic Messages API (Claude)
    Anthropic,
    /// OpenAI Chat Completions API
    #[value(name = "openai")]
    OpenAi,
}

impl ModelBackend {
    pub fn default_model(&self) -> &'static str {
        match self {
            ModelBackend::Anthropic => "claude-3-5-sonnet-20240620",
            ModelBackend::OpenAi => "gpt-4.1",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ModelBackend::Anthropic => "https://api.anthropic.com",
            ModelBackend::OpenAi => "https://api.openai.com",
        }
    }

    /// Environment variable holding the API key for this backend
    pub fn api_key_var(&self) -> &'static str {
        match self {
            ModelBackend::Anthropic => "ANTHROPIC_API_KEY",
            ModelBackend::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl FromStr for ModelBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ModelBackend::Anthropic),
            "openai" | "open_ai" | "gpt" => Ok(ModelBackend::OpenAi),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelBackend::Anthropic => f.write_str("anthropic"),
            ModelBackend::OpenAi => f.write_str("openai"),
        }
    }
}

/// Connection and sampling settings for one model backend
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub backend: ModelBackend,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl ModelConfig {
    pub fn new(backend: ModelBackend) -> Self {
        Self {
            backend,
            model: backend.default_model().to_string(),
            endpoint: backend.default_endpoint().to_string(),
            api_key: None,
            max_output_tokens: 5000,
            temperature: 0.0,
            timeout: Duration::from_secs(180), // LLM generation is slow
        }
    }

    /// Switch backend, resetting model and endpoint to that backend's defaults
    pub fn with_backend(self, backend: ModelBackend) -> Self {
        Self::new(backend).inherit_sampling(&self)
    }

    fn inherit_sampling(mut self, from: &ModelConfig) -> Self {
        self.max_output_tokens = from.max_output_tokens;
        self.temperature = from.temperature;
        self.timeout = from.timeout;
        self
    }
}

/// Everything an audit run needs, loaded once and passed down explicitly
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelConfig,
    /// Token budget per chunk
    pub token_budget: usize,
    /// Concurrent model calls per audit
    pub workers: usize,
    /// Review iterations per markup chunk
    pub max_issues: usize,
    /// Extra attempts per review step after a transport failure
    pub step_retries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::new(ModelBackend::Anthropic),
            token_budget: DEFAULT_TOKEN_BUDGET,
            workers: DEFAULT_WORKERS,
            max_issues: 1,
            step_retries: 1,
        }
    }
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let backend = match lookup("WEBAUDIT_BACKEND") {
            Some(value) => value.parse()?,
            None => defaults.model.backend,
        };

        let mut model = ModelConfig::new(backend);
        if let Some(name) = lookup("WEBAUDIT_MODEL") {
            model.model = name;
        }
        if let Some(endpoint) = lookup("WEBAUDIT_ENDPOINT") {
            model.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        model.api_key = lookup(backend.api_key_var()).filter(|k| !k.trim().is_empty());
        model.max_output_tokens =
            parse_or(&lookup, "WEBAUDIT_MAX_OUTPUT_TOKENS", model.max_output_tokens)?;
        model.temperature = parse_or(&lookup, "WEBAUDIT_TEMPERATURE", model.temperature)?;
        model.timeout = Duration::from_secs(parse_or(
            &lookup,
            "WEBAUDIT_TIMEOUT_SECS",
            model.timeout.as_secs(),
        )?);

        Ok(Self {
            model,
            token_budget: parse_or(&lookup, "WEBAUDIT_TOKEN_BUDGET", defaults.token_budget)?,
            workers: parse_or(&lookup, "WEBAUDIT_WORKERS", defaults.workers)?,
            max_issues: parse_or(&lookup, "WEBAUDIT_MAX_ISSUES", defaults.max_issues)?,
            step_retries: parse_or(&lookup, "WEBAUDIT_STEP_RETRIES", defaults.step_retries)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
