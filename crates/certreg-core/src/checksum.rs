//! The shared checksum library.
//!
//! A [`ChecksumLib`] is a pure function from `(recipient, payload)` to a
//! [`ContentHash`]. Registries never embed their own copy of the routine:
//! they hold an [`Arc`] to one deployed library and the [`LibraryAddress`]
//! they were bound to.

use std::fmt;
use std::sync::Arc;

use crate::canonical::checksum_input_bytes;
use crate::certificate::CertificatePayload;
use crate::crypto::{domain_hash, PublicKey};
use crate::types::{ContentHash, LibraryAddress};

/// Domain separation prefix for content hashes.
pub const CHECKSUM_DOMAIN: &[u8] = b"certreg/checksum/v1";

/// Domain separation prefix for library addresses.
pub const LIBRARY_DOMAIN: &[u8] = b"certreg/library/v1";

/// Name and version of a checksum routine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryDescriptor {
    pub name: &'static str,
    pub version: u32,
}

impl LibraryDescriptor {
    /// The address a library with this descriptor is deployed at.
    pub fn address(&self) -> LibraryAddress {
        LibraryAddress(domain_hash(
            LIBRARY_DOMAIN,
            &[self.name.as_bytes(), b":", &self.version.to_be_bytes()],
        ))
    }
}

/// A stateless checksum routine shared by registry instances.
///
/// Implementations must be deterministic and must not depend on the caller,
/// the clock, or any mutable state.
pub trait ChecksumLib: Send + Sync + fmt::Debug {
    /// Identity of this routine.
    fn descriptor(&self) -> LibraryDescriptor;

    /// Compute the content hash of a certificate payload.
    fn compute(&self, recipient: &PublicKey, payload: &CertificatePayload) -> ContentHash;

    /// The address this routine answers at.
    fn address(&self) -> LibraryAddress {
        self.descriptor().address()
    }
}

/// Blake3 over the canonical CBOR checksum input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Checksum;

impl Blake3Checksum {
    pub const DESCRIPTOR: LibraryDescriptor = LibraryDescriptor {
        name: "certreg-checksum-blake3",
        version: 1,
    };
}

impl ChecksumLib for Blake3Checksum {
    fn descriptor(&self) -> LibraryDescriptor {
        Self::DESCRIPTOR
    }

    fn compute(&self, recipient: &PublicKey, payload: &CertificatePayload) -> ContentHash {
        let input = checksum_input_bytes(recipient, payload);
        ContentHash(domain_hash(CHECKSUM_DOMAIN, &[&input]))
    }
}

/// A construction-time binding to a deployed library.
///
/// Pairs the address a registry was told to use with the routine that
/// answered at that address. The pair is fixed once a registry holds it.
#[derive(Clone)]
pub struct LibraryHandle {
    address: LibraryAddress,
    library: Arc<dyn ChecksumLib>,
}

impl LibraryHandle {
    pub fn new(address: LibraryAddress, library: Arc<dyn ChecksumLib>) -> Self {
        Self { address, library }
    }

    /// The address this handle was bound to.
    pub fn address(&self) -> LibraryAddress {
        self.address
    }

    /// Whether the routine behind the handle answers at the bound address.
    pub fn is_consistent(&self) -> bool {
        self.library.address() == self.address
    }

    pub fn compute(&self, recipient: &PublicKey, payload: &CertificatePayload) -> ContentHash {
        self.library.compute(recipient, payload)
    }

    pub fn library(&self) -> &Arc<dyn ChecksumLib> {
        &self.library
    }
}

impl fmt::Debug for LibraryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibraryHandle")
            .field("address", &self.address)
            .field("library", &self.library.descriptor().name)
            .finish()
    }
}
