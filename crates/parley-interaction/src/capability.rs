//! Generative analysis capability.
//!
//! The analyzer's generative strategy is polymorphic over anything that can
//! turn a structured prompt into a text completion. Implementations are
//! expected to be remote services; every failure mode they expose is folded
//! into [`CapabilityError`] so the analyzer can make its fallback decision
//! on a single type.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors a generative capability can produce.
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// Transport-level failure before an HTTP status was obtained.
    #[error("Capability request failed: {message}")]
    Transport {
        message: String,
        is_retryable: bool,
    },

    /// The capability answered with a non-success HTTP status.
    #[error("Capability returned HTTP error: {message}")]
    Http {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    /// The capability answered but the reply carried no usable content.
    #[error("Capability returned no usable content: {0}")]
    EmptyReply(String),

    /// Credentials or model configuration could not be resolved.
    #[error("Capability configuration error: {0}")]
    Config(String),
}

impl CapabilityError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { is_retryable, .. } | Self::Http { is_retryable, .. } => {
                *is_retryable
            }
            Self::EmptyReply(_) | Self::Config(_) => false,
        }
    }
}

/// A backing generative-language capability.
///
/// Given a fully rendered prompt, returns the raw completion text. The
/// analyzer owns prompt construction, response validation, and the timeout;
/// implementations only perform the request.
#[async_trait]
pub trait GenerativeCapability: Send + Sync {
    /// Short human-readable identifier for logging.
    fn name(&self) -> &str;

    /// Executes one completion request.
    async fn complete(&self, prompt: String) -> Result<String, CapabilityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryability_follows_variant_flags() {
        let transport = CapabilityError::Transport {
            message: "connection reset".to_string(),
            is_retryable: true,
        };
        assert!(transport.is_retryable());

        let config = CapabilityError::Config("missing api key".to_string());
        assert!(!config.is_retryable());
    }
}
