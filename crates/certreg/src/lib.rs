//! # certreg
//!
//! Course certificate registries that share one checksum library.
//!
//! ## Overview
//!
//! - **Checksum library**: a stateless, content-addressed routine that hashes
//!   a certificate's recipient and payload. Deployed once.
//! - **Registry**: one per course. Only its issuer may mint; each recipient
//!   holds at most one certificate; ids run 0, 1, 2, ...
//! - **Verification**: recompute the checksum over what is stored and
//!   compare it with the hash recorded at mint.
//! - **Deployer**: publishes the library and binds registries to it.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use certreg::{Deployer, RegistryConfig};
//! use certreg::core::{Blake3Checksum, CertificatePayload, Keypair, MintRequest};
//! use certreg::store::SqliteStore;
//!
//! async fn example() {
//!     let issuer = Keypair::generate();
//!     let mut deployer = Deployer::new();
//!     let library = deployer.deploy_library(Arc::new(Blake3Checksum)).unwrap();
//!
//!     let store = SqliteStore::open("iccs101.db").unwrap();
//!     let registry = deployer
//!         .deploy_registry(
//!             RegistryConfig::new("ICCS101", "Introduction to Computer Programming"),
//!             issuer.public_key(),
//!             library,
//!             store,
//!         )
//!         .await
//!         .unwrap();
//!
//!     let student = Keypair::generate().public_key();
//!     let request = MintRequest::new(student, CertificatePayload::new("ICCS101", "2024-01-01"))
//!         .with_metadata_ref("ipfs://QmCertificate")
//!         .sign(&issuer);
//!
//!     let id = registry.mint(&request).await.unwrap();
//!     assert!(registry.verify(id).await.unwrap());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `certreg::core` - Certificates, checksums, keys
//! - `certreg::store` - Storage abstraction and SQLite

pub mod config;
pub mod deploy;
pub mod error;
pub mod registry;
pub mod resolver;

pub use certreg_core as core;
pub use certreg_store as store;

pub use config::{DeploymentPlan, MetadataPolicy, RegistryConfig};
pub use deploy::Deployer;
pub use error::{DeployError, RegistryError, Result};
pub use registry::Registry;
pub use resolver::MetadataResolver;

pub use certreg_core::{
    Blake3Checksum, Certificate, CertificateId, CertificatePayload, ChecksumLib, ContentHash,
    Keypair, LibraryAddress, LibraryHandle, MintRequest, PublicKey, SignedMintRequest,
};
