//! Error types for registries and deployment.

use certreg_core::{CertificateId, LibraryAddress, PublicKey, ValidationError};
use certreg_store::StoreError;
use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The recipient already holds a certificate in this registry.
    #[error("recipient {recipient} already holds certificate {existing}")]
    DuplicateCertificate {
        recipient: PublicKey,
        existing: CertificateId,
    },

    /// The caller is not this registry's issuer, or its signature is invalid.
    #[error("caller {caller} is not authorized to issue in this registry")]
    Unauthorized { caller: PublicKey },

    /// No certificate with this id.
    #[error("certificate not found: {0}")]
    NotFound(CertificateId),

    /// The registry could not be bound to its checksum library or store.
    #[error("binding error: {0}")]
    Binding(String),

    /// The mint request failed validation.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ValidationError),

    /// The registry configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised by the deployment coordinator.
#[derive(Debug, Error)]
pub enum DeployError {
    /// A library already answers at this address.
    #[error("library already deployed at {0:?}")]
    LibraryAlreadyDeployed(LibraryAddress),

    /// Another library is already deployed; a second one could leave
    /// registries on different routines.
    #[error("library {bound:?} is already deployed; refusing to deploy {attempted:?}")]
    LibraryPinned {
        bound: LibraryAddress,
        attempted: LibraryAddress,
    },

    /// A registry for this course was already deployed.
    #[error("course already deployed: {0}")]
    CourseAlreadyDeployed(String),

    /// The deployment plan is malformed.
    #[error("invalid deployment plan: {0}")]
    InvalidPlan(String),

    /// Registry construction failed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Opening a registry's store failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
