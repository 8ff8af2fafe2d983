//! Sigwarden error types.

use http::HeaderName;
use thiserror::Error;

/// Errors that can occur while signing or validating a request.
///
/// The gate collapses every variant into a bare `401`; callers of
/// [`Validator::check_request`](crate::Validator::check_request) get the
/// specific kind for diagnostics.
#[derive(Debug, Error)]
pub enum SigwardenError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A required signature header is absent or empty.
    #[error("Required header missing: {header}")]
    MissingHeader {
        /// Name of the missing header.
        header: HeaderName,
    },

    /// Timestamp header is not a decimal epoch-seconds value.
    #[error("Malformed timestamp header: {0}")]
    MalformedTimestamp(String),

    /// Signature is older than the configured maximum age.
    #[error("Signature expired ({age_seconds}s old)")]
    SignatureExpired {
        /// Age of the signature in seconds.
        age_seconds: i64,
    },

    /// Reading the request body failed.
    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    /// The destination host of the request could not be determined.
    #[error("Destination host of the request could not be determined")]
    MissingHost,

    /// Signature does not match the request.
    #[error("Invalid signature")]
    InvalidSignature,

    /// HTTP transport error on the sending side.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request could not be encoded for signing.
    #[error("Protocol error: {0}")]
    ProtocolError(String),
}
