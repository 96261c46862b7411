//! In-memory implementation of the CertificateStore trait.
//!
//! Same semantics as SQLite with no persistence. Thread-safe via RwLock;
//! appends hold the write guard across the recipient check and the insert.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use certreg_core::{Certificate, CertificateDraft, CertificateId, PublicKey};

use crate::error::{Result, StoreError};
use crate::traits::{AppendResult, BindResult, CertificateStore, RegistryBinding};

/// In-memory store implementation.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    binding: Option<RegistryBinding>,

    /// Certificates indexed by id; `certificates[i].id() == i`.
    certificates: Vec<Certificate>,

    /// Recipient index.
    by_recipient: HashMap<PublicKey, CertificateId>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CertificateStore for MemoryStore {
    async fn bind(&self, binding: &RegistryBinding) -> Result<BindResult> {
        let mut inner = self.write()?;
        match &inner.binding {
            Some(existing) if existing == binding => Ok(BindResult::AlreadyBound),
            Some(existing) => Ok(BindResult::Mismatch {
                existing: existing.clone(),
            }),
            None => {
                inner.binding = Some(binding.clone());
                Ok(BindResult::Bound)
            }
        }
    }

    async fn binding(&self) -> Result<Option<RegistryBinding>> {
        Ok(self.read()?.binding.clone())
    }

    async fn append_certificate(&self, draft: &CertificateDraft) -> Result<AppendResult> {
        let mut inner = self.write()?;

        if let Some(&existing) = inner.by_recipient.get(&draft.recipient) {
            return Ok(AppendResult::DuplicateRecipient { existing });
        }

        let id = CertificateId(inner.certificates.len() as u64);
        inner.by_recipient.insert(draft.recipient, id);
        inner.certificates.push(draft.clone().into_certificate(id));

        tracing::debug!(id = %id, recipient = %draft.recipient, "appended certificate");
        Ok(AppendResult::Appended(id))
    }

    async fn get_certificate(&self, id: CertificateId) -> Result<Option<Certificate>> {
        let inner = self.read()?;
        let index = usize::try_from(id.value()).ok();
        Ok(index.and_then(|i| inner.certificates.get(i)).cloned())
    }

    async fn certificate_id_of(&self, recipient: &PublicKey) -> Result<Option<CertificateId>> {
        Ok(self.read()?.by_recipient.get(recipient).copied())
    }

    async fn has_recipient(&self, recipient: &PublicKey) -> Result<bool> {
        Ok(self.read()?.by_recipient.contains_key(recipient))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.read()?.certificates.len() as u64)
    }

    async fn get_certificates_range(
        &self,
        start: CertificateId,
        limit: usize,
    ) -> Result<Vec<Certificate>> {
        let inner = self.read()?;
        let start = usize::try_from(start.value()).unwrap_or(usize::MAX);
        Ok(inner
            .certificates
            .iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect())
    }
}
