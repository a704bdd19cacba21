//! Cloud platform strategies
//!
//! Each provider implements [`CloudBuilder`] to supply the provider-specific
//! parts of a build: the platform block on the ClusterDeployment, the
//! credential secrets it references, and the machine platform stamped onto
//! every MachinePool. The [`Builder`](crate::Builder) drives whichever
//! strategy is attached and never switches on the provider itself.
//!
//! # Supported Providers
//!
//! - [`AwsCloudBuilder`]
//! - [`AzureCloudBuilder`]
//! - [`GcpCloudBuilder`]
//! - [`OpenStackCloudBuilder`]

mod aws;
mod azure;
mod gcp;
mod openstack;

pub use aws::{AwsCloudBuilder, ACCESS_KEY_ID_KEY, SECRET_ACCESS_KEY_KEY};
pub use azure::{AzureCloudBuilder, SERVICE_PRINCIPAL_KEY};
pub use gcp::{GcpCloudBuilder, SERVICE_ACCOUNT_KEY};
pub use openstack::{OpenStackCloudBuilder, CLOUDS_YAML_KEY};

use std::collections::BTreeMap;
use std::fmt::Debug;

use hive_common::crd::{MachinePoolPlatform, Platform, PlatformType};
use hive_common::{Error, Result};

/// Whether the install-config secret is emitted for adopted clusters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum InstallConfigPolicy {
    /// Always emit the install-config secret and reference it
    #[default]
    Always,
    /// Omit the secret and its reference when adopting an existing cluster
    SkipWhenAdopted,
}

impl InstallConfigPolicy {
    /// Whether the install-config secret is emitted for this build
    pub fn emits(self, adopting: bool) -> bool {
        match self {
            Self::Always => true,
            Self::SkipWhenAdopted => !adopting,
        }
    }
}

/// One credential secret a strategy needs
///
/// The secret is named `<cluster>-<suffix>` and holds `data` verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialMaterial {
    /// Name suffix (e.g., "aws-creds")
    pub suffix: String,
    /// Secret keys and their raw contents
    pub data: BTreeMap<String, Vec<u8>>,
}

impl CredentialMaterial {
    /// Material under the platform's standard `<platform>-creds` suffix
    pub fn for_platform(platform: PlatformType) -> Self {
        Self {
            suffix: crate::naming::credentials_suffix(platform),
            data: BTreeMap::new(),
        }
    }

    /// Add a key
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

/// Provider-specific half of a build
///
/// Implementations are immutable after construction so one strategy can be
/// shared by concurrent builds.
pub trait CloudBuilder: Send + Sync + Debug {
    /// Provider identity
    fn platform_type(&self) -> PlatformType;

    /// Check that required credential fields are present
    ///
    /// Only presence is checked; credentials are never exercised.
    fn validate(&self, cluster: &str) -> Result<()>;

    /// Credential secrets to emit, in order
    fn credential_material(&self) -> Vec<CredentialMaterial>;

    /// Fill this provider's block of the ClusterDeployment platform
    ///
    /// `credentials_secret` is the name of the first credential secret.
    fn populate_platform(&self, platform: &mut Platform, credentials_secret: &str);

    /// Machine platform for a pool using the given instance type
    fn machine_pool_platform(&self, instance_type: &str) -> MachinePoolPlatform;

    /// Instance type used when the request does not name one
    fn default_instance_type(&self) -> String;

    /// Install-config emission policy, overriding the request's
    fn install_config_policy(&self) -> Option<InstallConfigPolicy> {
        None
    }
}

/// Reject an empty required credential field
pub(crate) fn require_credential(cluster: &str, field: &str, value: &[u8]) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation_for_field(
            cluster,
            field,
            format!("{field} is required"),
        ));
    }
    Ok(())
}

/// Reject an empty required string setting
pub(crate) fn require_setting(cluster: &str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation_for_field(
            cluster,
            field,
            format!("{field} must not be empty"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::always_fresh(InstallConfigPolicy::Always, false, true)]
    #[case::always_adopt(InstallConfigPolicy::Always, true, true)]
    #[case::skip_fresh(InstallConfigPolicy::SkipWhenAdopted, false, true)]
    #[case::skip_adopt(InstallConfigPolicy::SkipWhenAdopted, true, false)]
    fn policy_decides_emission(
        #[case] policy: InstallConfigPolicy,
        #[case] adopting: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(policy.emits(adopting), expected);
    }

    #[test]
    fn credential_material_uses_platform_suffix() {
        let material = CredentialMaterial::for_platform(PlatformType::Gcp)
            .with_entry("osServiceAccount.json", "fakeSA");
        assert_eq!(material.suffix, "gcp-creds");
        assert_eq!(material.data["osServiceAccount.json"], b"fakeSA".to_vec());
    }

    #[test]
    fn required_credentials_report_field() {
        let err = require_credential("c1", "accessKeyId", b"").unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.field(), Some("accessKeyId"));
        assert_eq!(err.cluster(), Some("c1"));
        assert!(require_credential("c1", "accessKeyId", b"x").is_ok());
        assert!(require_setting("c1", "region", "  ").is_err());
    }
}
