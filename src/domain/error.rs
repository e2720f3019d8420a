use std::time::Duration;

use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Failed to construct resource for key '{key}': {source}")]
    Construction {
        key: String,
        #[source]
        source: Box<DomainError>,
    },

    #[error("Timed out after {timeout:?} waiting for resource '{key}' to be constructed")]
    LockTimeout { key: String, timeout: Duration },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn construction(key: impl Into<String>, source: DomainError) -> Self {
        Self::Construction {
            key: key.into(),
            source: Box::new(source),
        }
    }

    pub fn lock_timeout(key: impl Into<String>, timeout: Duration) -> Self {
        Self::LockTimeout {
            key: key.into(),
            timeout,
        }
    }

    /// Whether this error came out of the resource factory
    pub fn is_construction(&self) -> bool {
        matches!(self, Self::Construction { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = DomainError::validation("Invalid input");
        assert_eq!(error.to_string(), "Validation error: Invalid input");
    }

    #[test]
    fn test_construction_error_wraps_source() {
        let error = DomainError::construction(
            "default",
            DomainError::provider("qwen", "HTTP 401: unauthorized"),
        );

        assert!(error.is_construction());
        assert_eq!(
            error.to_string(),
            "Failed to construct resource for key 'default': Provider error: qwen - HTTP 401: unauthorized"
        );

        let source = std::error::Error::source(&error).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("Provider error: qwen - HTTP 401: unauthorized")
        );
    }

    #[test]
    fn test_lock_timeout_error() {
        let error = DomainError::lock_timeout("bge", Duration::from_millis(250));

        assert!(!error.is_construction());
        assert!(error.to_string().contains("'bge'"));
        assert!(error.to_string().contains("250ms"));
    }
}
