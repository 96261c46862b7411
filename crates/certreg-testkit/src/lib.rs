//! # certreg Testkit
//!
//! Testing utilities for certreg.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Pinned checksum outputs for cross-build verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up registries
//!
//! ## Golden Vectors
//!
//! ```rust
//! use certreg_testkit::vectors::all_vectors;
//!
//! for vector in all_vectors() {
//!     assert_eq!(vector.compute().to_hex(), vector.expected_hash);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use certreg_testkit::generators::MintParams;
//!
//! proptest! {
//!     #[test]
//!     fn payload_round_trips(params: MintParams) {
//!         prop_assert_eq!(params.payload().course_code(), params.course_code.as_str());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,ignore
//! use certreg_testkit::fixtures::{recipients, TestFixture};
//!
//! let fixture = TestFixture::new();
//! let registry = fixture.registry().await?;
//! let id = registry.mint(&fixture.mint_request(&recipients(1)[0])).await?;
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{recipients, TestFixture};
pub use generators::{request_from_params, MintParams};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
