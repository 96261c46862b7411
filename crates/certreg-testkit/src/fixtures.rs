//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use certreg::{Registry, RegistryConfig, RegistryError};
use certreg_core::{
    Blake3Checksum, CertificatePayload, ChecksumLib, Keypair, LibraryHandle, MintRequest,
    PublicKey, SignedMintRequest,
};
use certreg_store::{CertificateStore, MemoryStore};

/// Course code used by fixtures.
pub const COURSE_CODE: &str = "ICCS101";

/// Course name used by fixtures.
pub const COURSE_NAME: &str = "Introduction to Computer Programming";

/// Issue date used by fixtures.
pub const ISSUED_ON: &str = "2024-01-01";

/// An issuer keypair and the handle of the blake3 library.
pub struct TestFixture {
    pub issuer: Keypair,
    pub library: LibraryHandle,
}

impl TestFixture {
    /// Create a fixture with a random issuer.
    pub fn new() -> Self {
        Self::from_issuer(Keypair::generate())
    }

    /// Create with a deterministic issuer from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self::from_issuer(Keypair::from_seed(&seed))
    }

    fn from_issuer(issuer: Keypair) -> Self {
        let library: Arc<dyn ChecksumLib> = Arc::new(Blake3Checksum);
        Self {
            issuer,
            library: LibraryHandle::new(library.address(), library),
        }
    }

    pub fn issuer_key(&self) -> PublicKey {
        self.issuer.public_key()
    }

    /// The fixture course config.
    pub fn config(&self) -> RegistryConfig {
        RegistryConfig::new(COURSE_CODE, COURSE_NAME)
    }

    /// Bind a registry for the fixture course over `store`.
    pub async fn registry_with<S: CertificateStore>(
        &self,
        store: S,
    ) -> Result<Registry<S>, RegistryError> {
        Registry::bind(self.config(), self.issuer_key(), self.library.clone(), store).await
    }

    /// Bind a registry for the fixture course over a fresh memory store.
    pub async fn registry(&self) -> Result<Registry<MemoryStore>, RegistryError> {
        self.registry_with(MemoryStore::new()).await
    }

    /// A signed request for `recipient` in the fixture course.
    pub fn mint_request(&self, recipient: &PublicKey) -> SignedMintRequest {
        self.request_signed_by(&self.issuer, recipient)
    }

    /// The same request, signed by an arbitrary key.
    pub fn request_signed_by(&self, signer: &Keypair, recipient: &PublicKey) -> SignedMintRequest {
        MintRequest::new(*recipient, CertificatePayload::new(COURSE_CODE, ISSUED_ON))
            .with_metadata_ref(format!("ipfs://cert-{}", recipient.to_hex()))
            .sign(signer)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic recipients for multi-party tests.
pub fn recipients(count: usize) -> Vec<PublicKey> {
    (0..count)
        .map(|i| {
            let mut seed = [0xa0u8; 32];
            seed[0] = i as u8;
            seed[1] = (i >> 8) as u8;
            Keypair::from_seed(&seed).public_key()
        })
        .collect()
}
