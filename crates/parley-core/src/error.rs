//! Error types for the Parley simulation core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the Parley core crates.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
///
/// Only `EmptyMessage` is ever surfaced to callers of the turn pipeline;
/// the analyzer variants exist so the fallback decision can be made on a
/// typed value instead of a stringly-typed flag.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ParleyError {
    /// The caller supplied a message with no extractable content.
    #[error("Message is empty after trimming")]
    EmptyMessage,

    /// The generative analysis capability could not be reached or failed.
    ///
    /// Internal to the analyzer: always converted into a fallback to the
    /// lexical strategy, never propagated out of `analyze`.
    #[error("Generative analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    /// The generative capability replied, but the reply failed shape
    /// validation against the analysis model.
    ///
    /// Treated identically to `AnalysisUnavailable` by the analyzer.
    #[error("Malformed analyzer output: {0}")]
    MalformedAnalysis(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "template", etc.
        message: String,
    },

    /// IO error (config file access)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ParleyError {
    /// Creates an AnalysisUnavailable error
    pub fn analysis_unavailable(reason: impl Into<String>) -> Self {
        Self::AnalysisUnavailable(reason.into())
    }

    /// Creates a MalformedAnalysis error
    pub fn malformed_analysis(reason: impl Into<String>) -> Self {
        Self::MalformedAnalysis(reason.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is the caller-visible empty-message error
    pub fn is_empty_message(&self) -> bool {
        matches!(self, Self::EmptyMessage)
    }

    /// Check if this error must be absorbed by the analyzer fallback.
    ///
    /// Returns true for:
    /// - `AnalysisUnavailable` (transport failure, timeout)
    /// - `MalformedAnalysis` (shape validation failure)
    pub fn triggers_fallback(&self) -> bool {
        matches!(
            self,
            Self::AnalysisUnavailable(_) | Self::MalformedAnalysis(_)
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ParleyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ParleyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ParleyError>`.
pub type Result<T> = std::result::Result<T, ParleyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_is_caller_visible() {
        assert!(ParleyError::EmptyMessage.is_empty_message());
        assert!(!ParleyError::EmptyMessage.triggers_fallback());
    }

    #[test]
    fn analyzer_errors_trigger_fallback() {
        assert!(ParleyError::analysis_unavailable("timeout").triggers_fallback());
        assert!(ParleyError::malformed_analysis("bad JSON").triggers_fallback());
        assert!(!ParleyError::config("missing key").triggers_fallback());
    }
}
