//! Configuration management for Study Partner
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section is optional; a missing section takes its defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::conversation::DEFAULT_GREETING;

/// Upper bound for every timeout setting, in seconds
const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub router: RouterConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Completion provider configuration
///
/// Fields are private so validated values cannot be mutated afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_model")]
    model: String,
    /// Environment variable consulted first for the API key
    #[serde(default = "default_api_key_env")]
    api_key_env: String,
    /// TOML secrets file consulted second (key = `api_key_env`)
    #[serde(default = "default_secrets_file")]
    secrets_file: String,
    #[serde(default = "default_request_timeout")]
    request_timeout_seconds: u64,
}

impl ProviderConfig {
    /// OpenAI-compatible API root, e.g. `https://api.groq.com/openai/v1`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Model identifier sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    pub fn secrets_file(&self) -> &str {
        &self.secrets_file
    }

    pub fn request_timeout_seconds(&self) -> u64 {
        self.request_timeout_seconds
    }

    /// Point the provider at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            secrets_file: default_secrets_file(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_secrets_file() -> String {
    "secrets.toml".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

/// Topic router configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouterConfig {
    /// How many of the most recent messages are shown to the classifier
    #[serde(default = "default_context_window")]
    context_window: usize,
    #[serde(default = "default_router_max_tokens")]
    max_tokens: u32,
    #[serde(default)]
    temperature: f32,
    #[serde(default = "default_router_timeout")]
    timeout_seconds: u64,
}

impl RouterConfig {
    pub fn context_window(&self) -> usize {
        self.context_window
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            context_window: default_context_window(),
            max_tokens: default_router_max_tokens(),
            temperature: 0.0,
            timeout_seconds: default_router_timeout(),
        }
    }
}

fn default_context_window() -> usize {
    2
}

fn default_router_max_tokens() -> u32 {
    5
}

fn default_router_timeout() -> u64 {
    10
}

/// Run condition selected by the operator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Always answer directly
    #[default]
    Standard,
    /// Route every new message; new topics go through the planning form
    #[serde(alias = "planning")]
    #[value(alias = "planning")]
    PlanningIntervention,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::PlanningIntervention => "planning_intervention",
        }
    }
}

impl FromStr for Condition {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "standard" => Ok(Self::Standard),
            "planning" | "planning_intervention" => Ok(Self::PlanningIntervention),
            other => Err(crate::error::AppError::Validation(format!(
                "unknown condition '{}', expected 'standard' or 'planning'",
                other
            ))),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub condition: Condition,
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            condition: Condition::default(),
            greeting: default_greeting(),
        }
    }
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::error::AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        // Phase 1: Read file (preserves io::Error context)
        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            crate::error::AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        // Phase 2: Parse TOML (preserves toml::de::Error context)
        let config: Self = toml::from_str(&content).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            }
        })?;

        // Phase 3: Validate parsed config (provides contextual reason)
        config
            .validate()
            .map_err(|e| crate::error::AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Validate configuration after parsing
    pub fn validate(&self) -> crate::error::AppResult<()> {
        let provider = &self.provider;

        if provider.model.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "provider.model must not be empty".to_string(),
            ));
        }

        if !provider.base_url.starts_with("http://") && !provider.base_url.starts_with("https://")
        {
            return Err(crate::error::AppError::Config(format!(
                "provider.base_url must start with http:// or https://, got '{}'",
                provider.base_url
            )));
        }

        if provider.api_key_env.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "provider.api_key_env must not be empty".to_string(),
            ));
        }

        for (name, value) in [
            (
                "provider.request_timeout_seconds",
                provider.request_timeout_seconds,
            ),
            ("router.timeout_seconds", self.router.timeout_seconds),
        ] {
            if value == 0 || value > MAX_TIMEOUT_SECONDS {
                return Err(crate::error::AppError::Config(format!(
                    "{} must be in (0, {}] seconds, got {}",
                    name, MAX_TIMEOUT_SECONDS, value
                )));
            }
        }

        if !(1..=10).contains(&self.router.context_window) {
            return Err(crate::error::AppError::Config(format!(
                "router.context_window must be between 1 and 10, got {}",
                self.router.context_window
            )));
        }

        if self.router.max_tokens == 0 {
            return Err(crate::error::AppError::Config(
                "router.max_tokens must be greater than 0".to_string(),
            ));
        }

        let temperature = self.router.temperature;
        if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
            return Err(crate::error::AppError::Config(format!(
                "router.temperature must be between 0.0 and 2.0, got {}",
                temperature
            )));
        }

        if self.session.greeting.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "session.greeting must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = crate::error::AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config = toml::from_str(toml_str).map_err(|source| {
            crate::error::AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            }
        })?;

        config.validate()?;
        Ok(config)
    }
}
