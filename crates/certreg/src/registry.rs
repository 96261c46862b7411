//! The Registry: one course's certificate authority.
//!
//! A registry binds an issuer key, a course, a checksum library and a store.
//! It mints certificates on signed requests from the issuer, at most one per
//! recipient, and answers ownership, metadata and integrity queries.

use std::sync::Arc;

use certreg_core::{
    now_millis, validate_payload, Certificate, CertificateDraft, CertificateId, LibraryAddress,
    LibraryHandle, PublicKey, SignedMintRequest,
};
use certreg_store::{
    AppendResult, BindResult, CertificateStore, RegistryBinding, StoreError, StoreExt,
};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::resolver::{metadata_ref_for, MetadataResolver};

/// A certificate registry for a single course.
///
/// Cloning is cheap and clones share the store.
pub struct Registry<S: CertificateStore> {
    config: RegistryConfig,
    /// The only key allowed to mint.
    issuer: PublicKey,
    /// Fixed at construction.
    library: LibraryHandle,
    store: Arc<S>,
}

impl<S: CertificateStore> Clone for Registry<S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            issuer: self.issuer,
            library: self.library.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CertificateStore> Registry<S> {
    /// Bind a registry to its library and store.
    ///
    /// Fails with [`RegistryError::Binding`] if the library does not answer at
    /// the handle's address, or if the store was created for a different
    /// course, issuer or library.
    pub async fn bind(
        config: RegistryConfig,
        issuer: PublicKey,
        library: LibraryHandle,
        store: S,
    ) -> Result<Self> {
        config.validate()?;

        if !library.is_consistent() {
            return Err(RegistryError::Binding(format!(
                "library at {} reports address {}",
                library.address(),
                library.library().address()
            )));
        }

        let binding = RegistryBinding {
            course_code: config.course_code.clone(),
            issuer,
            library: library.address(),
        };

        match store.bind(&binding).await? {
            BindResult::Bound => {
                tracing::info!(
                    course = %config.course_code,
                    issuer = %issuer,
                    library = %library.address(),
                    "bound new registry"
                );
            }
            BindResult::AlreadyBound => {
                tracing::debug!(course = %config.course_code, "reopened registry");
            }
            BindResult::Mismatch { existing } => {
                tracing::warn!(
                    course = %config.course_code,
                    existing_course = %existing.course_code,
                    "store belongs to another registry"
                );
                return Err(RegistryError::Binding(describe_mismatch(&existing, &binding)));
            }
        }

        Ok(Self {
            config,
            issuer,
            library,
            store: Arc::new(store),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Identity
    // ─────────────────────────────────────────────────────────────────────────

    /// The course name.
    pub fn name(&self) -> &str {
        &self.config.course_name
    }

    /// The course code.
    pub fn symbol(&self) -> &str {
        &self.config.course_code
    }

    pub fn issuer(&self) -> &PublicKey {
        &self.issuer
    }

    pub fn library_address(&self) -> LibraryAddress {
        self.library.address()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn resolver(&self) -> MetadataResolver<'_, S> {
        MetadataResolver::new(&self.store)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Issuance
    // ─────────────────────────────────────────────────────────────────────────

    /// Mint a certificate.
    ///
    /// The request must be signed by the issuer. On success the recipient
    /// holds the returned id; on any error nothing is recorded.
    pub async fn mint(&self, request: &SignedMintRequest) -> Result<CertificateId> {
        self.authorize(request)?;

        let req = &request.request;
        if let Err(e) = validate_payload(&req.payload, &self.config.course_code) {
            tracing::warn!(course = %self.config.course_code, error = %e, "rejected mint");
            return Err(e.into());
        }

        let content_hash = self.library.compute(&req.recipient, &req.payload);
        let metadata_ref = metadata_ref_for(
            &self.config.metadata,
            self.config.max_metadata_len,
            req.metadata_ref.as_deref(),
            &self.config.course_code,
            &content_hash,
        )?;

        let draft = CertificateDraft {
            recipient: req.recipient,
            payload: req.payload.clone(),
            content_hash,
            metadata_ref,
            issued_at: now_millis(),
        };

        // The store checks the recipient and assigns the id atomically.
        match self.store.append_certificate(&draft).await? {
            AppendResult::Appended(id) => {
                tracing::info!(
                    course = %self.config.course_code,
                    id = %id,
                    recipient = %req.recipient,
                    hash = %content_hash,
                    "issued certificate"
                );
                Ok(id)
            }
            AppendResult::DuplicateRecipient { existing } => {
                tracing::warn!(
                    course = %self.config.course_code,
                    recipient = %req.recipient,
                    existing = %existing,
                    "recipient already certified"
                );
                Err(RegistryError::DuplicateCertificate {
                    recipient: req.recipient,
                    existing,
                })
            }
        }
    }

    fn authorize(&self, request: &SignedMintRequest) -> Result<()> {
        if request.signer != self.issuer {
            tracing::warn!(
                course = %self.config.course_code,
                caller = %request.signer,
                "mint from non-issuer"
            );
            return Err(RegistryError::Unauthorized {
                caller: request.signer,
            });
        }

        if request.verify_signature().is_err() {
            tracing::warn!(
                course = %self.config.course_code,
                caller = %request.signer,
                "mint with bad signature"
            );
            return Err(RegistryError::Unauthorized {
                caller: request.signer,
            });
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Recompute the certificate's checksum and compare it with the one
    /// recorded at mint. `Ok(false)` means the stored fields were altered,
    /// including alterations that leave the row undecodable.
    pub async fn verify(&self, id: CertificateId) -> Result<bool> {
        let cert = match self.certificate(id).await {
            Ok(cert) => cert,
            Err(RegistryError::Store(StoreError::Corrupted { reason, .. })) => {
                tracing::warn!(
                    course = %self.config.course_code,
                    id = %id,
                    reason = %reason,
                    "stored certificate no longer decodes"
                );
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        let intact = cert.verify_with(self.library.library().as_ref());
        if !intact {
            tracing::warn!(course = %self.config.course_code, id = %id, "checksum mismatch");
        }
        Ok(intact)
    }

    /// The recipient of certificate `id`.
    pub async fn resolve_owner(&self, id: CertificateId) -> Result<PublicKey> {
        Ok(*self.certificate(id).await?.recipient())
    }

    /// The metadata reference of certificate `id`.
    pub async fn resolve_metadata(&self, id: CertificateId) -> Result<String> {
        self.resolver().resolve(id).await
    }

    /// Whether `recipient` holds a certificate from this registry.
    pub async fn has_certificate(&self, recipient: &PublicKey) -> Result<bool> {
        Ok(self.store.has_recipient(recipient).await?)
    }

    pub async fn certificate(&self, id: CertificateId) -> Result<Certificate> {
        self.store
            .get_certificate(id)
            .await?
            .ok_or(RegistryError::NotFound(id))
    }

    /// The certificate held by `recipient`, if any.
    pub async fn certificate_of(&self, recipient: &PublicKey) -> Result<Option<Certificate>> {
        Ok(self.store.certificate_of(recipient).await?)
    }

    /// Number of certificates issued so far; also the next id.
    pub async fn issued_count(&self) -> Result<u64> {
        Ok(self.store.count().await?)
    }

    /// Up to `limit` certificates starting at `start`, in id order.
    pub async fn certificates(
        &self,
        start: CertificateId,
        limit: usize,
    ) -> Result<Vec<Certificate>> {
        Ok(self.store.get_certificates_range(start, limit).await?)
    }
}

fn describe_mismatch(existing: &RegistryBinding, wanted: &RegistryBinding) -> String {
    if existing.course_code != wanted.course_code {
        format!(
            "store belongs to course {}, not {}",
            existing.course_code, wanted.course_code
        )
    } else if existing.issuer != wanted.issuer {
        format!("store belongs to issuer {}", existing.issuer)
    } else {
        format!("store is bound to library {}", existing.library)
    }
}
