//! Pinned checksums, checked through a full mint and store round trip.
//!
//! A hash recorded today must recompute identically in every later build.

use std::sync::Arc;

use certreg::store::{MemoryStore, SqliteStore};
use certreg::{
    Blake3Checksum, CertificateId, CertificatePayload, ChecksumLib, Keypair, LibraryHandle,
    MintRequest, Registry, RegistryConfig,
};

const MINIMAL_HASH: &str = "06b1f746dd483360e9d8fdae346be7a736f5434f9f95ef87b893af1152cd04b8";
const WITH_GRADE_HASH: &str = "e8f079cbf8da9b29621f605d28d8e10674bb49c8be0c1bb6a7ea8a83668d3adc";

fn handle() -> LibraryHandle {
    let lib: Arc<dyn ChecksumLib> = Arc::new(Blake3Checksum);
    LibraryHandle::new(lib.address(), lib)
}

#[tokio::test]
async fn test_minted_hash_matches_pinned_value() {
    let issuer = Keypair::from_seed(&[0x01; 32]);
    let recipient = Keypair::from_seed(&[0x0a; 32]).public_key();
    let registry = Registry::bind(
        RegistryConfig::new("ICCS101", "Introduction to Computer Programming"),
        issuer.public_key(),
        handle(),
        SqliteStore::open_memory().unwrap(),
    )
    .await
    .unwrap();

    let id = registry
        .mint(
            &MintRequest::new(recipient, CertificatePayload::new("ICCS101", "2024-01-01"))
                .with_metadata_ref("ipfs://QmMinimal")
                .sign(&issuer),
        )
        .await
        .unwrap();

    let cert = registry.certificate(id).await.unwrap();
    assert_eq!(cert.content_hash().to_hex(), MINIMAL_HASH);
    assert!(registry.verify(id).await.unwrap());
}

#[tokio::test]
async fn test_hash_independent_of_issuer_and_metadata() {
    // Two registries with different issuers; same recipient and payload.
    let recipient = Keypair::from_seed(&[0x0a; 32]).public_key();
    let payload = CertificatePayload::new("ICCS225", "2024-06-30").with_attribute("grade", "A");

    for (seed, uri) in [(0x21u8, "ipfs://QmOne"), (0x22, "https://example.org/two.json")] {
        let issuer = Keypair::from_seed(&[seed; 32]);
        let registry = Registry::bind(
            RegistryConfig::new("ICCS225", "Data Structures"),
            issuer.public_key(),
            handle(),
            MemoryStore::new(),
        )
        .await
        .unwrap();

        let id = registry
            .mint(
                &MintRequest::new(recipient, payload.clone())
                    .with_metadata_ref(uri)
                    .sign(&issuer),
            )
            .await
            .unwrap();
        assert_eq!(id, CertificateId(0));

        let cert = registry.certificate(id).await.unwrap();
        assert_eq!(cert.content_hash().to_hex(), WITH_GRADE_HASH);
    }
}
