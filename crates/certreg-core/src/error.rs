//! Error types for certreg core.

use thiserror::Error;

/// Core errors from cryptographic and encoding operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Validation errors for certificate payloads and mint requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("course code must not be empty")]
    EmptyCourseCode,

    #[error("payload course {got} does not match registry course {expected}")]
    CourseMismatch { expected: String, got: String },

    #[error("issuance date must not be empty")]
    EmptyIssuedOn,

    #[error("too many attributes: {count} (max {max})")]
    TooManyAttributes { count: usize, max: usize },

    #[error("attribute names must not be empty")]
    EmptyAttributeName,

    #[error("metadata reference is required")]
    MissingMetadataRef,

    #[error("metadata reference exceeds {max} bytes")]
    MetadataRefTooLong { max: usize },

    #[error("metadata reference has unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("metadata reference is derived by the registry and must not be supplied")]
    UnexpectedMetadataRef,
}
