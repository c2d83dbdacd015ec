//! Error types for layer and state construction.
//!
//! This module provides error handling for:
//! - Input description loading (JSON/YAML)
//! - Layer field validation and shader generation
//! - Marker file parsing
//! - Writing the final state document

use serde_json::Value;
use thiserror::Error;

/// Result type for state operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while building a viewer state.
#[derive(Debug, Error)]
pub enum StateError {
    /// Unit, matrix, format or scheme error from the core conversions.
    #[error(transparent)]
    Core(#[from] nglink_core::Error),

    /// Required key missing or value of the wrong shape.
    #[error("malformed input: {reason}. Received: {value}")]
    MalformedInput {
        /// What was expected.
        reason: String,
        /// The offending value.
        value: Value,
    },

    /// Shader emitter is not one of the viewer's emit functions.
    #[error("unsupported shader emitter: '{emitter}' (supported: RGB, RGBA, Grayscale, Transparent)")]
    UnsupportedEmitter {
        /// Emitter as supplied.
        emitter: String,
    },

    /// I/O error reading a description or writing a document.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// XML parse error in a marker file.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl StateError {
    /// Shorthand for [`StateError::MalformedInput`].
    pub fn malformed(reason: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::MalformedInput {
            reason: reason.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_reports_value() {
        let err = StateError::malformed("layers accepts only a list", json!({"a": 1}));
        assert_eq!(
            err.to_string(),
            r#"malformed input: layers accepts only a list. Received: {"a":1}"#
        );
    }

    #[test]
    fn core_errors_are_transparent() {
        let err: StateError = nglink_core::Error::UnsupportedFormat {
            path: "x.tif".into(),
        }
        .into();
        assert_eq!(err.to_string(), "format not implemented for visualization: x.tif");
    }
}
