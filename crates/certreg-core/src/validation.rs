//! Structural checks on payloads and metadata references.

use crate::certificate::CertificatePayload;
use crate::error::ValidationError;

/// Maximum number of attributes on one certificate.
pub const MAX_ATTRIBUTES: usize = 32;

/// Default maximum length of a metadata reference, in bytes.
pub const MAX_METADATA_REF_LEN: usize = 256;

/// Validate a payload for a registry scoped to `course_code`.
pub fn validate_payload(
    payload: &CertificatePayload,
    course_code: &str,
) -> Result<(), ValidationError> {
    if payload.course_code().is_empty() {
        return Err(ValidationError::EmptyCourseCode);
    }

    if payload.course_code() != course_code {
        return Err(ValidationError::CourseMismatch {
            expected: course_code.to_string(),
            got: payload.course_code().to_string(),
        });
    }

    if payload.issued_on().trim().is_empty() {
        return Err(ValidationError::EmptyIssuedOn);
    }

    let count = payload.attributes().len();
    if count > MAX_ATTRIBUTES {
        return Err(ValidationError::TooManyAttributes {
            count,
            max: MAX_ATTRIBUTES,
        });
    }

    if payload.attributes().keys().any(|k| k.is_empty()) {
        return Err(ValidationError::EmptyAttributeName);
    }

    Ok(())
}

/// Validate a metadata reference against a length limit and scheme allow-list.
///
/// An empty allow-list accepts any `scheme://` reference.
pub fn validate_metadata_ref(
    uri: &str,
    max_len: usize,
    allowed_schemes: &[String],
) -> Result<(), ValidationError> {
    if uri.is_empty() {
        return Err(ValidationError::MissingMetadataRef);
    }

    if uri.len() > max_len {
        return Err(ValidationError::MetadataRefTooLong { max: max_len });
    }

    let scheme = match uri.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => scheme,
        _ => return Err(ValidationError::UnsupportedScheme(uri.to_string())),
    };

    if !allowed_schemes.is_empty() && !allowed_schemes.iter().any(|s| s == scheme) {
        return Err(ValidationError::UnsupportedScheme(scheme.to_string()));
    }

    Ok(())
}
