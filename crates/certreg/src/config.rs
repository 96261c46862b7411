//! Registry configuration and deployment plans.

use serde::{Deserialize, Serialize};

use certreg_core::MAX_METADATA_REF_LEN;

use crate::error::{DeployError, RegistryError};

/// How a registry obtains each certificate's metadata reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MetadataPolicy {
    /// The issuer supplies the reference in the mint request.
    CallerSupplied {
        /// Accepted URI schemes. Empty accepts any `scheme://` reference.
        #[serde(default)]
        allowed_schemes: Vec<String>,
    },
    /// The registry derives `{base_uri}/{course_code}/{content_hash}.json`.
    Derived { base_uri: String },
}

impl Default for MetadataPolicy {
    fn default() -> Self {
        MetadataPolicy::CallerSupplied {
            allowed_schemes: vec!["ipfs".to_string(), "https".to_string()],
        }
    }
}

/// Configuration for one course registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Course code, also the registry's symbol (e.g. `ICCS101`).
    pub course_code: String,
    /// Human-readable course name.
    pub course_name: String,
    #[serde(default)]
    pub metadata: MetadataPolicy,
    #[serde(default = "default_max_metadata_len")]
    pub max_metadata_len: usize,
}

fn default_max_metadata_len() -> usize {
    MAX_METADATA_REF_LEN
}

impl RegistryConfig {
    pub fn new(course_code: impl Into<String>, course_name: impl Into<String>) -> Self {
        Self {
            course_code: course_code.into(),
            course_name: course_name.into(),
            metadata: MetadataPolicy::default(),
            max_metadata_len: MAX_METADATA_REF_LEN,
        }
    }

    pub fn with_metadata(mut self, metadata: MetadataPolicy) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.course_code.trim().is_empty() {
            return Err(RegistryError::InvalidConfig("course_code is empty".into()));
        }
        if self.max_metadata_len == 0 {
            return Err(RegistryError::InvalidConfig(
                "max_metadata_len must be positive".into(),
            ));
        }
        if let MetadataPolicy::Derived { base_uri } = &self.metadata {
            if !base_uri.contains("://") {
                return Err(RegistryError::InvalidConfig(format!(
                    "base_uri is not a URI: {base_uri}"
                )));
            }
        }
        Ok(())
    }
}

/// The registries a coordinator deploys against one checksum library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub courses: Vec<RegistryConfig>,
}

impl DeploymentPlan {
    /// Parse a plan from JSON.
    pub fn from_json(json: &str) -> Result<Self, DeployError> {
        let plan: Self =
            serde_json::from_str(json).map_err(|e| DeployError::InvalidPlan(e.to_string()))?;
        plan.validate()?;
        Ok(plan)
    }

    /// Every course valid, course codes unique.
    pub fn validate(&self) -> Result<(), DeployError> {
        if self.courses.is_empty() {
            return Err(DeployError::InvalidPlan("no courses".into()));
        }

        let mut seen = std::collections::BTreeSet::new();
        for course in &self.courses {
            course
                .validate()
                .map_err(|e| DeployError::InvalidPlan(format!("{}: {e}", course.course_code)))?;
            if !seen.insert(course.course_code.as_str()) {
                return Err(DeployError::InvalidPlan(format!(
                    "duplicate course {}",
                    course.course_code
                )));
            }
        }
        Ok(())
    }
}
