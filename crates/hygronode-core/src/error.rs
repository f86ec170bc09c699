//! Error types for hygronode-core.
//!
//! # Error Recovery Strategies
//!
//! The node has no operator and no fallback role, so almost every fault is
//! absorbed by the control loop and reported only through `tracing`:
//!
//! | Error Type | Where | Strategy |
//! |------------|-------|----------|
//! | [`Error::Sensor`] | cycle | Log, keep the previous reading, finish the cycle |
//! | [`Error::Sensor`] | boot probe | Retry with fixed delay, then continue without data |
//! | [`Error::Transport`] (send) | cycle | Log, drop the remaining datagrams, sleep the radio |
//! | [`Error::Transport`] (associate) | cycle/boot | Retry per [`crate::AssociationPolicy`] |
//! | [`Error::AssociationFailed`] | cycle/boot | Log, skip sends, sleep the radio |
//! | [`Error::Display`] | cycle | Log and carry on |
//! | [`Error::DisplayInit`] | boot | Fatal: the node halts |
//! | [`Error::InvalidConfig`] | startup | Fatal: fix constants and rebuild |
//!
//! ## Error Classification
//!
//! [`crate::retry`] treats these as retryable: [`SensorFault::NotFound`],
//! [`SensorFault::Timeout`], [`SensorFault::ChecksumMismatch`],
//! [`Error::Transport`] and [`Error::Io`]. Everything else is returned
//! immediately.

use std::fmt;

use thiserror::Error;

/// Errors produced by the node's components and controller.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The sensor could not deliver a sample.
    #[error("Sensor fault: {0}")]
    Sensor(SensorFault),

    /// The display could not be brought up at boot.
    #[error("Display initialization failed: {0}")]
    DisplayInit(String),

    /// A frame could not be pushed to the display.
    #[error("Display error: {0}")]
    Display(String),

    /// A network transport operation failed.
    #[error("Transport {operation} failed: {reason}")]
    Transport {
        /// The transport step that failed (`wake`, `associate`, `send`, `sleep`).
        operation: &'static str,
        /// Driver-level description.
        reason: String,
    },

    /// Association was abandoned after the policy's attempt limit.
    #[error("Network association failed after {attempts} attempts")]
    AssociationFailed {
        /// Number of association attempts made.
        attempts: u32,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A reading or message could not be built or decoded.
    #[error(transparent)]
    Parse(#[from] hygronode_types::ParseError),
}

/// Why a sensor sample failed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SensorFault {
    /// Sensor did not answer on the bus.
    NotFound,
    /// Sensor answered but the conversion did not complete in time.
    Timeout,
    /// Frame checksum did not match.
    ChecksumMismatch,
    /// Sensor returned values outside its physical range.
    InvalidData(String),
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "sensor not found"),
            Self::Timeout => write!(f, "measurement timed out"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::InvalidData(msg) => write!(f, "invalid data: {}", msg),
        }
    }
}

impl From<SensorFault> for Error {
    fn from(fault: SensorFault) -> Self {
        Error::Sensor(fault)
    }
}

impl Error {
    /// Create a transport error for the given step.
    pub fn transport(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Transport {
            operation,
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type alias using hygronode-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
