//! Error types for Study Partner
//!
//! No error here is fatal to the session loop. Every variant is rendered to the
//! user through the chat surface and leaves the conversation resumable.

use thiserror::Error;

use crate::provider::ProviderError;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum AppError {
    /// No API key configured. Blocks answering only; the user can supply one.
    #[error("No API key configured. Set {env_var} or enter a key when prompted.")]
    CredentialMissing { env_var: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Failed to read configuration file from disk
    ///
    /// Preserves the underlying io::Error for better debugging context
    #[error("Failed to read config file '{path}': {source}")]
    ConfigFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file as TOML
    ///
    /// Preserves the underlying toml::de::Error for line/column information
    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration parsed but failed validation
    #[error("Invalid configuration in '{path}': {reason}")]
    ConfigValidationFailed { path: String, reason: String },

    /// Terminal input or output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Short text suitable for showing in the chat surface
    pub fn user_message(&self) -> String {
        match self {
            Self::CredentialMissing { .. } => "Please enter an API key.".to_string(),
            Self::Provider(e) => format!("API Error: {}", e),
            other => other.to_string(),
        }
    }
}

/// Convenience type alias for Results
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_config_error_creates() {
        let err = AppError::Config("test error".to_string());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_validation_error_creates() {
        let err = AppError::Validation("invalid input".to_string());
        assert_eq!(err.to_string(), "Invalid request: invalid input");
    }

    #[test]
    fn test_credential_missing_names_env_var() {
        let err = AppError::CredentialMissing {
            env_var: "GROQ_API_KEY".to_string(),
        };
        assert!(err.to_string().contains("GROQ_API_KEY"));
        assert_eq!(err.user_message(), "Please enter an API key.");
    }

    #[test]
    fn test_provider_error_is_transparent() {
        let err: AppError = ProviderError::Api {
            status: 401,
            message: "invalid api key".to_string(),
        }
        .into();
        assert!(err.to_string().contains("401"));
        assert!(err.user_message().starts_with("API Error:"));
    }

    #[test]
    fn test_config_file_read_keeps_source() {
        let err = AppError::ConfigFileRead {
            path: "missing.toml".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_terminal_io_error_converts() {
        fn read() -> AppResult<String> {
            let text = std::fs::read_to_string("/nonexistent/study-partner/input")?;
            Ok(text)
        }

        let err = read().unwrap_err();
        assert!(matches!(err, AppError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
        assert!(err.user_message().starts_with("I/O error:"));
    }
}
