//! OpenStack strategy
//!
//! Credentials are a `clouds.yaml` document; `cloud` selects the entry in it.

use hive_common::crd::{
    openstack, LocalObjectReference, MachinePoolPlatform, Platform, PlatformType,
};
use hive_common::Result;

use super::{require_credential, require_setting, CloudBuilder, CredentialMaterial};

/// Secret key holding the clouds.yaml document
pub const CLOUDS_YAML_KEY: &str = "clouds.yaml";

const DEFAULT_CLOUD: &str = "openstack";
const DEFAULT_FLAVOR: &str = "m1.large";

/// Builds OpenStack clusters from a clouds.yaml document
#[derive(Clone, Debug, PartialEq)]
pub struct OpenStackCloudBuilder {
    /// clouds.yaml contents
    pub clouds_yaml: Vec<u8>,
    /// Entry in clouds.yaml to use
    pub cloud: String,
    /// Flavor for worker machines when the request does not name one
    pub compute_flavor: Option<String>,
    /// Whether the cloud supports trunk ports
    pub trunk_support: bool,
}

impl OpenStackCloudBuilder {
    /// Create a strategy using the `openstack` cloud entry
    pub fn new(clouds_yaml: impl Into<Vec<u8>>) -> Self {
        Self {
            clouds_yaml: clouds_yaml.into(),
            cloud: DEFAULT_CLOUD.to_string(),
            compute_flavor: None,
            trunk_support: false,
        }
    }

    /// Use a different clouds.yaml entry
    pub fn with_cloud(mut self, cloud: impl Into<String>) -> Self {
        self.cloud = cloud.into();
        self
    }

    /// Default worker flavor
    pub fn with_compute_flavor(mut self, flavor: impl Into<String>) -> Self {
        self.compute_flavor = Some(flavor.into());
        self
    }
}

impl CloudBuilder for OpenStackCloudBuilder {
    fn platform_type(&self) -> PlatformType {
        PlatformType::OpenStack
    }

    fn validate(&self, cluster: &str) -> Result<()> {
        require_credential(cluster, "openstack.cloudsYaml", &self.clouds_yaml)?;
        require_setting(cluster, "openstack.cloud", &self.cloud)?;
        if let Some(flavor) = &self.compute_flavor {
            require_setting(cluster, "openstack.computeFlavor", flavor)?;
        }
        Ok(())
    }

    fn credential_material(&self) -> Vec<CredentialMaterial> {
        vec![CredentialMaterial::for_platform(PlatformType::OpenStack)
            .with_entry(CLOUDS_YAML_KEY, self.clouds_yaml.clone())]
    }

    fn populate_platform(&self, platform: &mut Platform, credentials_secret: &str) {
        platform.openstack = Some(openstack::Platform {
            credentials_secret_ref: LocalObjectReference::new(credentials_secret),
            cloud: self.cloud.clone(),
            trunk_support: self.trunk_support,
        });
    }

    fn machine_pool_platform(&self, instance_type: &str) -> MachinePoolPlatform {
        MachinePoolPlatform {
            openstack: Some(openstack::MachinePoolPlatform {
                flavor: instance_type.to_string(),
            }),
            ..Default::default()
        }
    }

    fn default_instance_type(&self) -> String {
        self.compute_flavor
            .clone()
            .unwrap_or_else(|| DEFAULT_FLAVOR.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_clouds_yaml() {
        assert!(OpenStackCloudBuilder::new("fakeYAML").validate("c1").is_ok());
        let err = OpenStackCloudBuilder::new(Vec::<u8>::new())
            .validate("c1")
            .unwrap_err();
        assert_eq!(err.field(), Some("openstack.cloudsYaml"));

        let err = OpenStackCloudBuilder::new("fakeYAML")
            .with_cloud("")
            .validate("c1")
            .unwrap_err();
        assert_eq!(err.field(), Some("openstack.cloud"));
    }

    #[test]
    fn default_flavor_follows_compute_flavor() {
        assert_eq!(OpenStackCloudBuilder::new("y").default_instance_type(), "m1.large");
        assert_eq!(
            OpenStackCloudBuilder::new("y")
                .with_compute_flavor("m1.xlarge")
                .default_instance_type(),
            "m1.xlarge"
        );
    }

    #[test]
    fn populates_cloud_name() {
        let strategy = OpenStackCloudBuilder::new("fakeYAML").with_cloud("mycloud");
        let mut platform = Platform::default();
        strategy.populate_platform(&mut platform, "c1-openstack-creds");
        let os = platform.openstack.unwrap();
        assert_eq!(os.cloud, "mycloud");
        assert_eq!(os.credentials_secret_ref.name, "c1-openstack-creds");

        let material = strategy.credential_material();
        assert_eq!(material[0].suffix, "openstack-creds");
        assert_eq!(material[0].data[CLOUDS_YAML_KEY], b"fakeYAML");

        let pool = strategy.machine_pool_platform("m1.large");
        assert_eq!(pool.openstack.unwrap().flavor, "m1.large");
    }
}
