//! Error types for data parsing in hygronode-types.

use thiserror::Error;

/// Errors that can occur when building readings or decoding wire messages.
///
/// This error type is transport-agnostic and does not include
/// driver errors (those belong in hygronode-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A raw measurement was outside the range the sensor can report.
    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    /// The payload is not a well-formed message object.
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The `type` field names a reading kind this node does not emit.
    #[error("Unknown message type: {0}")]
    UnknownType(String),

    /// A field that must hold an integer did not.
    #[error("Field '{field}' is not an integer: {value:?}")]
    NotAnInteger {
        /// Name of the offending field.
        field: &'static str,
        /// The raw string found in the payload.
        value: String,
    },
}

/// Result type alias using hygronode-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_an_integer_display() {
        let err = ParseError::NotAnInteger {
            field: "epoch",
            value: "soon".to_string(),
        };
        assert_eq!(err.to_string(), "Field 'epoch' is not an integer: \"soon\"");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ParseError = json_err.into();
        assert!(matches!(err, ParseError::MalformedPayload(_)));
    }
}
