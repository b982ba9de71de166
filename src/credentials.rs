//! API key resolution
//!
//! Lookup order: environment variable, secrets file, interactive prompt.
//! Blank values count as absent at every step.

use crate::config::ProviderConfig;
use std::path::Path;

/// Provider API key
///
/// `Debug` is redacted so the key never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, returning `None` for blank input
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        if value.is_empty() { None } else { Some(Self(value)) }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Where the key was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    SecretsFile,
    Interactive,
}

/// Read `key` from a flat TOML secrets file (`GROQ_API_KEY = "..."`)
///
/// A missing file is not an error; an unreadable or malformed one is logged
/// and treated as absent.
pub fn read_secrets_file(path: &Path, key: &str) -> Option<ApiKey> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to read secrets file"
            );
            return None;
        }
    };

    let table: toml::Table = match toml::from_str(&content) {
        Ok(table) => table,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Secrets file is not valid TOML"
            );
            return None;
        }
    };

    table
        .get(key)
        .and_then(|value| value.as_str())
        .and_then(ApiKey::new)
}

/// Resolve the API key, asking `prompt` only when nothing is configured
pub fn resolve<F>(config: &ProviderConfig, prompt: F) -> Option<(ApiKey, CredentialSource)>
where
    F: FnOnce() -> Option<String>,
{
    let env_var = config.api_key_env();

    if let Some(key) = std::env::var(env_var).ok().and_then(ApiKey::new) {
        tracing::info!(env_var = %env_var, "API key loaded from environment");
        return Some((key, CredentialSource::Environment));
    }

    let secrets_path = Path::new(config.secrets_file());
    if let Some(key) = read_secrets_file(secrets_path, env_var) {
        tracing::info!(path = %secrets_path.display(), "API key loaded from secrets file");
        return Some((key, CredentialSource::SecretsFile));
    }

    match prompt().and_then(ApiKey::new) {
        Some(key) => Some((key, CredentialSource::Interactive)),
        None => {
            tracing::warn!(
                env_var = %env_var,
                "No API key configured; answering is disabled until one is provided"
            );
            None
        }
    }
}
