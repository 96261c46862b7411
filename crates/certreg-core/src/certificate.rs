//! Certificates: immutable records binding a recipient to a course.
//!
//! A [`Certificate`] has no setters. Once a store hands one back it can only
//! be read, and stores expose no update path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::checksum::ChecksumLib;
use crate::crypto::PublicKey;
use crate::types::{CertificateId, ContentHash};

/// The fields a certificate's checksum covers (besides the recipient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificatePayload {
    course_code: String,
    issued_on: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
}

impl CertificatePayload {
    /// A payload for `course_code` issued on `issued_on` (e.g. `"2024-01-01"`).
    pub fn new(course_code: impl Into<String>, issued_on: impl Into<String>) -> Self {
        Self {
            course_code: course_code.into(),
            issued_on: issued_on.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add a named attribute such as a grade.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Replace the attribute map.
    pub fn with_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn course_code(&self) -> &str {
        &self.course_code
    }

    pub fn issued_on(&self) -> &str {
        &self.issued_on
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Everything about a certificate except its id.
///
/// Built by the registry before the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDraft {
    pub recipient: PublicKey,
    pub payload: CertificatePayload,
    pub content_hash: ContentHash,
    pub metadata_ref: String,
    pub issued_at: i64,
}

impl CertificateDraft {
    /// Seal the draft under the id the store assigned.
    pub fn into_certificate(self, id: CertificateId) -> Certificate {
        Certificate {
            id,
            recipient: self.recipient,
            payload: self.payload,
            content_hash: self.content_hash,
            metadata_ref: self.metadata_ref,
            issued_at: self.issued_at,
        }
    }
}

/// An issued certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    id: CertificateId,
    recipient: PublicKey,
    payload: CertificatePayload,
    content_hash: ContentHash,
    metadata_ref: String,
    issued_at: i64,
}

impl Certificate {
    pub fn id(&self) -> CertificateId {
        self.id
    }

    pub fn recipient(&self) -> &PublicKey {
        &self.recipient
    }

    pub fn payload(&self) -> &CertificatePayload {
        &self.payload
    }

    pub fn course_code(&self) -> &str {
        self.payload.course_code()
    }

    /// The hash recorded at mint.
    pub fn content_hash(&self) -> &ContentHash {
        &self.content_hash
    }

    pub fn metadata_ref(&self) -> &str {
        &self.metadata_ref
    }

    /// Unix milliseconds at mint.
    pub fn issued_at(&self) -> i64 {
        self.issued_at
    }

    /// Recompute the checksum over the stored fields and compare it to the
    /// recorded hash.
    pub fn verify_with(&self, library: &dyn ChecksumLib) -> bool {
        library.compute(&self.recipient, &self.payload) == self.content_hash
    }
}
