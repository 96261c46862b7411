//! Metadata lookup for issued certificates.

use certreg_core::{CertificateId, ContentHash};
use certreg_store::CertificateStore;

use crate::config::MetadataPolicy;
use crate::error::{RegistryError, Result};

/// Resolves a certificate id to its metadata reference.
///
/// Borrowed from a [`Registry`](crate::Registry) via
/// [`Registry::resolver`](crate::Registry::resolver).
pub struct MetadataResolver<'a, S: CertificateStore> {
    store: &'a S,
}

impl<'a, S: CertificateStore> MetadataResolver<'a, S> {
    pub(crate) fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// The metadata reference recorded at mint.
    pub async fn resolve(&self, id: CertificateId) -> Result<String> {
        let cert = self
            .store
            .get_certificate(id)
            .await?
            .ok_or(RegistryError::NotFound(id))?;
        Ok(cert.metadata_ref().to_string())
    }
}

/// The reference a `Derived` policy assigns to a certificate.
pub(crate) fn derived_uri(base_uri: &str, course_code: &str, hash: &ContentHash) -> String {
    format!(
        "{}/{}/{}.json",
        base_uri.trim_end_matches('/'),
        course_code,
        hash.to_hex()
    )
}

/// Pick the reference for a new certificate under `policy`.
pub(crate) fn metadata_ref_for(
    policy: &MetadataPolicy,
    max_len: usize,
    supplied: Option<&str>,
    course_code: &str,
    hash: &ContentHash,
) -> std::result::Result<String, certreg_core::ValidationError> {
    use certreg_core::{validate_metadata_ref, ValidationError};

    match policy {
        MetadataPolicy::CallerSupplied { allowed_schemes } => {
            let uri = supplied.ok_or(ValidationError::MissingMetadataRef)?;
            validate_metadata_ref(uri, max_len, allowed_schemes)?;
            Ok(uri.to_string())
        }
        MetadataPolicy::Derived { base_uri } => {
            if supplied.is_some() {
                return Err(ValidationError::UnexpectedMetadataRef);
            }
            let uri = derived_uri(base_uri, course_code, hash);
            validate_metadata_ref(&uri, max_len, &[])?;
            Ok(uri)
        }
    }
}
