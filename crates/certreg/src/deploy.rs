//! Deployment: publish the checksum library once, then bind registries to it.

use std::collections::BTreeMap;
use std::sync::Arc;

use certreg_core::{ChecksumLib, LibraryAddress, LibraryHandle, PublicKey};
use certreg_store::{CertificateStore, StoreError};

use crate::config::{DeploymentPlan, RegistryConfig};
use crate::error::{DeployError, RegistryError};
use crate::registry::Registry;

/// Coordinates library deployment and registry construction.
///
/// Libraries are addressed by content, so the same routine always lands at
/// the same address. A deployer holds exactly one library: every registry in
/// a deployment shares one checksum routine.
#[derive(Default)]
pub struct Deployer {
    library: Option<(LibraryAddress, Arc<dyn ChecksumLib>)>,
    /// Deployed courses and the library each is bound to.
    courses: BTreeMap<String, LibraryAddress>,
}

impl Deployer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the checksum library and return its address.
    ///
    /// Succeeds once per deployer. Deploying the same routine again is
    /// `LibraryAlreadyDeployed`; any other routine is `LibraryPinned`.
    pub fn deploy_library(
        &mut self,
        library: Arc<dyn ChecksumLib>,
    ) -> Result<LibraryAddress, DeployError> {
        let address = library.address();

        if let Some((bound, _)) = &self.library {
            let bound = *bound;
            if bound == address {
                return Err(DeployError::LibraryAlreadyDeployed(address));
            }
            tracing::warn!(bound = %bound, attempted = %address, "library is pinned");
            return Err(DeployError::LibraryPinned {
                bound,
                attempted: address,
            });
        }

        let descriptor = library.descriptor();
        tracing::info!(
            address = %address,
            name = descriptor.name,
            version = descriptor.version,
            "deployed checksum library"
        );
        self.library = Some((address, library));
        Ok(address)
    }

    /// The deployed library's address, if any.
    pub fn library_address(&self) -> Option<LibraryAddress> {
        self.library.as_ref().map(|(address, _)| *address)
    }

    /// A handle to the library at `address`, if one was deployed there.
    pub fn library(&self, address: &LibraryAddress) -> Option<LibraryHandle> {
        self.library
            .as_ref()
            .filter(|(bound, _)| bound == address)
            .map(|(bound, lib)| LibraryHandle::new(*bound, Arc::clone(lib)))
    }

    /// Like [`library`](Self::library) but fails with a binding error.
    pub fn handle(&self, address: &LibraryAddress) -> Result<LibraryHandle, RegistryError> {
        self.library(address).ok_or_else(|| {
            RegistryError::Binding(format!("no library deployed at {address}"))
        })
    }

    /// Bind a registry for `config.course_code` to the library at `address`.
    pub async fn deploy_registry<S: CertificateStore>(
        &mut self,
        config: RegistryConfig,
        issuer: PublicKey,
        address: LibraryAddress,
        store: S,
    ) -> Result<Registry<S>, DeployError> {
        if self.courses.contains_key(&config.course_code) {
            return Err(DeployError::CourseAlreadyDeployed(config.course_code));
        }

        let handle = self.handle(&address)?;
        let registry = Registry::bind(config, issuer, handle, store).await?;

        self.courses.insert(registry.symbol().to_string(), address);
        tracing::info!(course = %registry.symbol(), library = %address, "deployed registry");
        Ok(registry)
    }

    /// Deploy one registry per course in `plan`, all against `address`.
    ///
    /// `open_store` supplies each course's store. Stops at the first failure;
    /// registries deployed before it stay deployed.
    pub async fn deploy_plan<S, F>(
        &mut self,
        plan: &DeploymentPlan,
        issuer: PublicKey,
        address: LibraryAddress,
        mut open_store: F,
    ) -> Result<Vec<Registry<S>>, DeployError>
    where
        S: CertificateStore,
        F: FnMut(&RegistryConfig) -> Result<S, StoreError>,
    {
        plan.validate()?;

        let mut registries = Vec::with_capacity(plan.courses.len());
        for config in &plan.courses {
            let store = open_store(config)?;
            let registry = self
                .deploy_registry(config.clone(), issuer, address, store)
                .await?;
            registries.push(registry);
        }
        Ok(registries)
    }

    /// Deployed course codes with their library, in course order.
    pub fn deployed_courses(&self) -> impl Iterator<Item = (&str, LibraryAddress)> {
        self.courses.iter().map(|(code, addr)| (code.as_str(), *addr))
    }

    pub fn is_deployed(&self, course_code: &str) -> bool {
        self.courses.contains_key(course_code)
    }
}
