//! End-to-end registry behaviour over both store backends.

use std::sync::Arc;

use certreg::core::canonical::attributes_bytes;
use certreg::core::{ContentHash, ValidationError};
use certreg::store::{CertificateStore, MemoryStore, SqliteStore, StoreError};
use certreg::{
    Blake3Checksum, CertificateId, CertificatePayload, ChecksumLib, Keypair, LibraryAddress,
    LibraryHandle, MetadataPolicy, MintRequest, PublicKey, Registry, RegistryConfig,
    RegistryError, SignedMintRequest,
};
use certreg_testkit::fixtures::{TestFixture, COURSE_CODE as COURSE, COURSE_NAME};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn fixture() -> TestFixture {
    TestFixture::with_seed([0x01; 32])
}

fn issuer() -> Keypair {
    fixture().issuer
}

fn student(n: u8) -> PublicKey {
    Keypair::from_seed(&[0x40 + n; 32]).public_key()
}

fn request(recipient: PublicKey, grade: &str) -> MintRequest {
    MintRequest::new(
        recipient,
        CertificatePayload::new(COURSE, "2024-01-01").with_attribute("grade", grade),
    )
    .with_metadata_ref(format!("ipfs://Qm{}", &recipient.to_hex()[..16]))
}

fn signed(recipient: PublicKey, grade: &str) -> SignedMintRequest {
    request(recipient, grade).sign(&issuer())
}

async fn registry<S: CertificateStore>(store: S) -> Registry<S> {
    fixture().registry_with(store).await.unwrap()
}

async fn issuance_scenario<S: CertificateStore>(store: S) {
    init_tracing();
    let registry = registry(store).await;
    let (a, b) = (student(1), student(2));

    assert_eq!(registry.name(), COURSE_NAME);
    assert_eq!(registry.symbol(), COURSE);
    assert_eq!(registry.issued_count().await.unwrap(), 0);

    assert_eq!(registry.mint(&signed(a, "A")).await.unwrap(), CertificateId(0));
    assert_eq!(registry.mint(&signed(b, "B")).await.unwrap(), CertificateId(1));

    let err = registry.mint(&signed(a, "A+")).await.unwrap_err();
    assert!(matches!(
        err,
        RegistryError::DuplicateCertificate { recipient, existing }
            if recipient == a && existing == CertificateId(0)
    ));

    assert!(registry.verify(CertificateId(0)).await.unwrap());
    assert!(registry.verify(CertificateId(1)).await.unwrap());
    assert_eq!(registry.resolve_owner(CertificateId(0)).await.unwrap(), a);
    assert_eq!(registry.resolve_owner(CertificateId(1)).await.unwrap(), b);
    assert!(registry.has_certificate(&a).await.unwrap());
    assert!(!registry.has_certificate(&student(3)).await.unwrap());
    assert_eq!(registry.issued_count().await.unwrap(), 2);

    // The rejected duplicate left the original untouched.
    let first = registry.certificate_of(&a).await.unwrap().unwrap();
    assert_eq!(first.id(), CertificateId(0));
    assert_eq!(first.payload().attribute("grade"), Some("A"));
}

#[tokio::test]
async fn test_issuance_scenario_memory() {
    issuance_scenario(MemoryStore::new()).await;
}

#[tokio::test]
async fn test_issuance_scenario_sqlite() {
    issuance_scenario(SqliteStore::open_memory().unwrap()).await;
}

#[tokio::test]
async fn test_unauthorized_mint_changes_nothing() {
    let registry = registry(MemoryStore::new()).await;
    let outsider = Keypair::from_seed(&[0x99; 32]);

    let err = registry
        .mint(&request(student(1), "A").sign(&outsider))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistryError::Unauthorized { caller } if caller == outsider.public_key()
    ));
    assert_eq!(registry.issued_count().await.unwrap(), 0);
    assert!(!registry.has_certificate(&student(1)).await.unwrap());
}

#[tokio::test]
async fn test_forged_issuer_signature_is_unauthorized() {
    let registry = registry(MemoryStore::new()).await;
    let outsider = Keypair::from_seed(&[0x99; 32]);

    // Claims the issuer as signer but carries someone else's signature.
    let mut forged = request(student(1), "A").sign(&outsider);
    forged.signer = issuer().public_key();

    assert!(matches!(
        registry.mint(&forged).await,
        Err(RegistryError::Unauthorized { .. })
    ));

    // A valid request tampered with after signing fails the same way.
    let mut altered = signed(student(2), "C");
    altered.request.payload = altered.request.payload.clone().with_attribute("grade", "A");
    assert!(matches!(
        registry.mint(&altered).await,
        Err(RegistryError::Unauthorized { .. })
    ));
    assert_eq!(registry.issued_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_queries_on_unknown_id() {
    let registry = registry(MemoryStore::new()).await;
    registry.mint(&signed(student(1), "A")).await.unwrap();

    let missing = CertificateId(1);
    assert!(matches!(
        registry.verify(missing).await,
        Err(RegistryError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        registry.resolve_owner(missing).await,
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        registry.resolve_metadata(missing).await,
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        registry.certificate(missing).await,
        Err(RegistryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_payload_validation() {
    let registry = registry(MemoryStore::new()).await;

    let wrong_course = MintRequest::new(student(1), CertificatePayload::new("ICCS225", "2024-01-01"))
        .with_metadata_ref("ipfs://QmX")
        .sign(&issuer());
    assert!(matches!(
        registry.mint(&wrong_course).await,
        Err(RegistryError::InvalidPayload(ValidationError::CourseMismatch { .. }))
    ));

    let no_metadata = MintRequest::new(student(1), CertificatePayload::new(COURSE, "2024-01-01"))
        .sign(&issuer());
    assert!(matches!(
        registry.mint(&no_metadata).await,
        Err(RegistryError::InvalidPayload(ValidationError::MissingMetadataRef))
    ));

    let bad_scheme = MintRequest::new(student(1), CertificatePayload::new(COURSE, "2024-01-01"))
        .with_metadata_ref("ftp://example.org/cert.json")
        .sign(&issuer());
    assert!(matches!(
        registry.mint(&bad_scheme).await,
        Err(RegistryError::InvalidPayload(ValidationError::UnsupportedScheme(_)))
    ));

    assert_eq!(registry.issued_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_resolve_metadata_caller_supplied() {
    let registry = registry(MemoryStore::new()).await;
    let req = MintRequest::new(student(1), CertificatePayload::new(COURSE, "2024-01-01"))
        .with_metadata_ref("ipfs://QmCertificateOne")
        .sign(&issuer());
    let id = registry.mint(&req).await.unwrap();

    assert_eq!(
        registry.resolve_metadata(id).await.unwrap(),
        "ipfs://QmCertificateOne"
    );
    assert_eq!(
        registry.resolver().resolve(id).await.unwrap(),
        "ipfs://QmCertificateOne"
    );
}

#[tokio::test]
async fn test_resolve_metadata_derived() {
    let config = RegistryConfig::new(COURSE, COURSE_NAME).with_metadata(MetadataPolicy::Derived {
        base_uri: "https://certs.example.org/meta".into(),
    });
    let registry = Registry::bind(config, issuer().public_key(), fixture().library, MemoryStore::new())
        .await
        .unwrap();

    let req = MintRequest::new(student(1), CertificatePayload::new(COURSE, "2024-01-01"))
        .sign(&issuer());
    let id = registry.mint(&req).await.unwrap();

    let hash = registry.certificate(id).await.unwrap().content_hash().to_hex();
    assert_eq!(
        registry.resolve_metadata(id).await.unwrap(),
        format!("https://certs.example.org/meta/ICCS101/{hash}.json")
    );

    let supplied = request(student(2), "A").sign(&issuer());
    assert!(matches!(
        registry.mint(&supplied).await,
        Err(RegistryError::InvalidPayload(ValidationError::UnexpectedMetadataRef))
    ));
}

#[tokio::test]
async fn test_concurrent_mints_for_one_recipient() {
    let registry = registry(SqliteStore::open_memory().unwrap()).await;
    let recipient = student(7);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.mint(&signed(recipient, &format!("G{i}"))).await })
        })
        .collect();

    let mut ok = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(id) => {
                assert_eq!(id, CertificateId(0));
                ok += 1;
            }
            Err(RegistryError::DuplicateCertificate { .. }) => duplicates += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!((ok, duplicates), (1, 7));
    assert_eq!(registry.issued_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_mints_assign_dense_ids() {
    let registry = registry(MemoryStore::new()).await;

    let handles: Vec<_> = (0..16u8)
        .map(|n| {
            let registry = registry.clone();
            tokio::spawn(async move { registry.mint(&signed(student(n), "A")).await.unwrap() })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().value());
    }
    ids.sort_unstable();
    assert_eq!(ids, (0..16).collect::<Vec<u64>>());

    let page = registry.certificates(CertificateId(4), 4).await.unwrap();
    let page_ids: Vec<u64> = page.iter().map(|c| c.id().value()).collect();
    assert_eq!(page_ids, vec![4, 5, 6, 7]);
}

#[tokio::test]
async fn test_verify_detects_tampering() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ICCS101.db");
    let registry = registry(SqliteStore::open(&path).unwrap()).await;
    let id = registry.mint(&signed(student(1), "C")).await.unwrap();
    assert!(registry.verify(id).await.unwrap());

    let raw = rusqlite::Connection::open(&path).unwrap();
    raw.execute_batch("DROP TRIGGER certificates_no_update;").unwrap();
    let forged = attributes_bytes(
        CertificatePayload::new(COURSE, "2024-01-01")
            .with_attribute("grade", "A")
            .attributes(),
    );
    raw.execute(
        "UPDATE certificates SET attributes = ?1 WHERE id = 0",
        rusqlite::params![forged],
    )
    .unwrap();

    assert!(!registry.verify(id).await.unwrap());
    // Ownership and metadata are still readable.
    assert_eq!(registry.resolve_owner(id).await.unwrap(), student(1));
}

#[tokio::test]
async fn test_verify_reports_undecodable_row_as_tampered() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ICCS101.db");
    let registry = registry(SqliteStore::open(&path).unwrap()).await;
    let id = registry.mint(&signed(student(1), "C")).await.unwrap();
    let untouched = registry.mint(&signed(student(2), "B")).await.unwrap();

    let raw = rusqlite::Connection::open(&path).unwrap();
    raw.execute_batch(
        "DROP TRIGGER certificates_no_update;
         UPDATE certificates SET attributes = x'ff' WHERE id = 0;",
    )
    .unwrap();

    assert!(!registry.verify(id).await.unwrap());
    assert!(registry.verify(untouched).await.unwrap());

    // Other reads surface the damage rather than a generic database error.
    assert!(matches!(
        registry.resolve_owner(id).await,
        Err(RegistryError::Store(StoreError::Corrupted { id: bad, .. })) if bad == id
    ));
    assert!(registry.has_certificate(&student(1)).await.unwrap());
}

#[tokio::test]
async fn test_verify_reports_truncated_hash_as_tampered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ICCS101.db");
    let registry = registry(SqliteStore::open(&path).unwrap()).await;
    let id = registry.mint(&signed(student(1), "A")).await.unwrap();

    let raw = rusqlite::Connection::open(&path).unwrap();
    raw.execute_batch(
        "DROP TRIGGER certificates_no_update;
         UPDATE certificates SET content_hash = x'00', recipient = x'0102' WHERE id = 0;",
    )
    .unwrap();

    assert!(!registry.verify(id).await.unwrap());
}

#[tokio::test]
async fn test_reopen_keeps_certificates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ICCS101.db");

    {
        let registry = registry(SqliteStore::open(&path).unwrap()).await;
        registry.mint(&signed(student(1), "A")).await.unwrap();
    }

    let registry = registry(SqliteStore::open(&path).unwrap()).await;
    assert_eq!(registry.issued_count().await.unwrap(), 1);
    assert!(registry.verify(CertificateId(0)).await.unwrap());
    assert_eq!(registry.mint(&signed(student(2), "B")).await.unwrap(), CertificateId(1));
}

#[tokio::test]
async fn test_reopen_with_other_identity_is_binding_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ICCS101.db");
    drop(registry(SqliteStore::open(&path).unwrap()).await);

    let other_issuer = Registry::bind(
        RegistryConfig::new(COURSE, COURSE_NAME),
        Keypair::from_seed(&[0x02; 32]).public_key(),
        fixture().library,
        SqliteStore::open(&path).unwrap(),
    )
    .await;
    assert!(matches!(other_issuer, Err(RegistryError::Binding(_))));

    let other_course = Registry::bind(
        RegistryConfig::new("ICCS225", "Data Structures"),
        issuer().public_key(),
        fixture().library,
        SqliteStore::open(&path).unwrap(),
    )
    .await;
    assert!(matches!(other_course, Err(RegistryError::Binding(_))));
}

#[derive(Debug)]
struct ZeroChecksum;

impl ChecksumLib for ZeroChecksum {
    fn descriptor(&self) -> certreg::core::LibraryDescriptor {
        certreg::core::LibraryDescriptor {
            name: "zero",
            version: 1,
        }
    }

    fn compute(&self, _: &PublicKey, _: &CertificatePayload) -> ContentHash {
        ContentHash::from_bytes([0; 32])
    }
}

#[tokio::test]
async fn test_library_must_answer_at_bound_address() {
    // A handle that claims the blake3 address but carries another routine.
    let handle = LibraryHandle::new(Blake3Checksum.address(), Arc::new(ZeroChecksum));
    let result = Registry::bind(
        RegistryConfig::new(COURSE, COURSE_NAME),
        issuer().public_key(),
        handle,
        MemoryStore::new(),
    )
    .await;
    assert!(matches!(result, Err(RegistryError::Binding(_))));

    let unknown = LibraryHandle::new(LibraryAddress::from_bytes([7; 32]), Arc::new(Blake3Checksum));
    let result = Registry::bind(
        RegistryConfig::new(COURSE, COURSE_NAME),
        issuer().public_key(),
        unknown,
        MemoryStore::new(),
    )
    .await;
    assert!(matches!(result, Err(RegistryError::Binding(_))));
}
