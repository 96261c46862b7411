//! Store trait: the abstract interface for certificate persistence.
//!
//! A store backs exactly one registry instance. It is insert-only: there is
//! no operation that updates or deletes a committed certificate.

use async_trait::async_trait;
use certreg_core::{
    Certificate, CertificateDraft, CertificateId, LibraryAddress, PublicKey,
};

use crate::error::Result;

/// The identity a store was created for.
///
/// Recorded once, the first time a registry opens the store. Reopening with
/// a different binding is refused by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryBinding {
    pub course_code: String,
    pub issuer: PublicKey,
    pub library: LibraryAddress,
}

/// Result of recording a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindResult {
    /// The store was fresh and is now bound.
    Bound,
    /// The store already carries this exact binding.
    AlreadyBound,
    /// The store is bound to something else.
    Mismatch {
        /// The binding already recorded.
        existing: RegistryBinding,
    },
}

/// Result of appending a certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendResult {
    /// The certificate was stored under a freshly assigned id.
    Appended(CertificateId),
    /// The recipient already holds a certificate; nothing was written.
    DuplicateRecipient {
        /// The recipient's existing certificate.
        existing: CertificateId,
    },
}

/// The CertificateStore trait: async interface for certificate persistence.
///
/// # Design Notes
///
/// - **Atomic append**: the recipient check, id assignment and insert in
///   [`append_certificate`](Self::append_certificate) happen in one critical
///   section. Concurrent appends for one recipient yield exactly one
///   `Appended`.
/// - **Dense ids**: ids are assigned from 0 with no gaps.
/// - **No mutation**: committed rows are never changed through this trait.
#[async_trait]
pub trait CertificateStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Binding
    // ─────────────────────────────────────────────────────────────────────────

    /// Record the binding if the store has none yet.
    async fn bind(&self, binding: &RegistryBinding) -> Result<BindResult>;

    /// The recorded binding, if any.
    async fn binding(&self) -> Result<Option<RegistryBinding>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Certificates
    // ─────────────────────────────────────────────────────────────────────────

    /// Append a certificate, assigning the next id.
    async fn append_certificate(&self, draft: &CertificateDraft) -> Result<AppendResult>;

    /// Get a certificate by id.
    async fn get_certificate(&self, id: CertificateId) -> Result<Option<Certificate>>;

    /// The id of the certificate held by `recipient`, if any.
    async fn certificate_id_of(&self, recipient: &PublicKey) -> Result<Option<CertificateId>>;

    /// Whether `recipient` holds a certificate.
    async fn has_recipient(&self, recipient: &PublicKey) -> Result<bool>;

    /// Number of certificates issued.
    async fn count(&self) -> Result<u64>;

    /// Up to `limit` certificates with `id >= start`, ordered by id.
    async fn get_certificates_range(
        &self,
        start: CertificateId,
        limit: usize,
    ) -> Result<Vec<Certificate>>;
}

/// Extension trait for common store patterns.
pub trait StoreExt: CertificateStore {
    /// The full certificate held by `recipient`, if any.
    fn certificate_of(
        &self,
        recipient: &PublicKey,
    ) -> impl std::future::Future<Output = Result<Option<Certificate>>> + Send;
}

impl<S: CertificateStore + ?Sized> StoreExt for S {
    async fn certificate_of(&self, recipient: &PublicKey) -> Result<Option<Certificate>> {
        match self.certificate_id_of(recipient).await? {
            Some(id) => self.get_certificate(id).await,
            None => Ok(None),
        }
    }
}
