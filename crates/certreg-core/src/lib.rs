//! # certreg core
//!
//! Pure primitives for course certificate registries: certificates, the
//! canonical checksum encoding, and the shared checksum library.
//!
//! This crate contains no I/O and no storage.
//!
//! ## Key Types
//!
//! - [`Certificate`] - An issued, immutable certificate
//! - [`CertificatePayload`] - The fields covered by the checksum
//! - [`ChecksumLib`] - The shared, stateless checksum routine
//! - [`LibraryHandle`] - A registry's construction-time library binding
//! - [`SignedMintRequest`] - An issuer-signed request to mint
//!
//! ## Canonicalization
//!
//! Checksum and signing inputs use deterministic CBOR. See [`canonical`].

pub mod canonical;
pub mod certificate;
pub mod checksum;
pub mod clock;
pub mod crypto;
pub mod error;
pub mod request;
pub mod types;
pub mod validation;

pub use canonical::checksum_input_bytes;
pub use certificate::{Certificate, CertificateDraft, CertificatePayload};
pub use checksum::{Blake3Checksum, ChecksumLib, LibraryDescriptor, LibraryHandle};
pub use clock::now_millis;
pub use crypto::{Keypair, PublicKey, Signature};
pub use error::{CoreError, ValidationError};
pub use request::{MintRequest, SignedMintRequest};
pub use types::{CertificateId, ContentHash, LibraryAddress};
pub use validation::{validate_metadata_ref, validate_payload, MAX_ATTRIBUTES, MAX_METADATA_REF_LEN};
