//! Small shared types referenced from several CRDs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to another object in the same namespace, by name
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct LocalObjectReference {
    /// Name of the referenced object
    pub name: String,
}

impl LocalObjectReference {
    /// Create a reference to the named object
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Reference to a cluster-scoped ClusterImageSet
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ClusterImageSetReference {
    /// Name of the ClusterImageSet
    pub name: String,
}

/// Supported cloud platforms
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    /// Amazon Web Services
    Aws,
    /// Microsoft Azure
    Azure,
    /// Google Cloud Platform
    Gcp,
    /// OpenStack private cloud
    OpenStack,
}

impl PlatformType {
    /// All supported platforms, in a stable order
    pub const ALL: [PlatformType; 4] = [Self::Aws, Self::Azure, Self::Gcp, Self::OpenStack];

    /// Lowercase identifier used in generated object names
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::Gcp => "gcp",
            Self::OpenStack => "openstack",
        }
    }
}

impl std::str::FromStr for PlatformType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" => Ok(Self::Aws),
            "azure" => Ok(Self::Azure),
            "gcp" => Ok(Self::Gcp),
            "openstack" => Ok(Self::OpenStack),
            _ => Err(crate::Error::validation(format!(
                "invalid platform: {s}, expected one of: aws, azure, gcp, openstack"
            ))),
        }
    }
}

impl std::fmt::Display for PlatformType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
