//! # certreg store
//!
//! Append-only storage for certificate registries. Provides a trait-based
//! interface with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`CertificateStore`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage
//! - [`AppendResult`] - Result of appending a certificate
//! - [`RegistryBinding`] - The course, issuer and library a store belongs to
//!
//! ## Usage
//!
//! ```rust,no_run
//! use certreg_store::{CertificateStore, SqliteStore};
//!
//! async fn example() {
//!     // One database per course registry
//!     let store = SqliteStore::open("ICCS101.db").unwrap();
//!     let issued = store.count().await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Insert-only**: there is no update or delete; SQLite enforces this
//!   with triggers as well
//! - **One certificate per recipient**: a second append for a recipient
//!   returns `DuplicateRecipient` and writes nothing
//! - **Atomic append**: check, id assignment and insert are one critical section

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{AppendResult, BindResult, CertificateStore, RegistryBinding, StoreExt};
