//! Azure strategy

use hive_common::crd::{azure, LocalObjectReference, MachinePoolPlatform, Platform, PlatformType};
use hive_common::Result;

use super::{require_credential, require_setting, CloudBuilder, CredentialMaterial};

/// Secret key holding the service principal JSON
pub const SERVICE_PRINCIPAL_KEY: &str = "osServicePrincipal.json";

const DEFAULT_REGION: &str = "centralus";
const DEFAULT_INSTANCE_TYPE: &str = "Standard_D2s_v3";
const OS_DISK_SIZE_GB: i32 = 128;

/// Builds Azure clusters authenticated by a service principal
#[derive(Clone, Debug, PartialEq)]
pub struct AzureCloudBuilder {
    /// Service principal JSON document
    pub service_principal: Vec<u8>,
    /// Resource group holding the base domain's DNS zone
    pub base_domain_resource_group_name: String,
    /// Region to install into
    pub region: String,
}

impl AzureCloudBuilder {
    /// Create a strategy for the default region
    pub fn new(
        service_principal: impl Into<Vec<u8>>,
        base_domain_resource_group_name: impl Into<String>,
    ) -> Self {
        Self {
            service_principal: service_principal.into(),
            base_domain_resource_group_name: base_domain_resource_group_name.into(),
            region: DEFAULT_REGION.to_string(),
        }
    }

    /// Install into a specific region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

impl CloudBuilder for AzureCloudBuilder {
    fn platform_type(&self) -> PlatformType {
        PlatformType::Azure
    }

    fn validate(&self, cluster: &str) -> Result<()> {
        require_credential(cluster, "azure.servicePrincipal", &self.service_principal)?;
        require_setting(
            cluster,
            "azure.baseDomainResourceGroupName",
            &self.base_domain_resource_group_name,
        )?;
        require_setting(cluster, "azure.region", &self.region)
    }

    fn credential_material(&self) -> Vec<CredentialMaterial> {
        vec![CredentialMaterial::for_platform(PlatformType::Azure)
            .with_entry(SERVICE_PRINCIPAL_KEY, self.service_principal.clone())]
    }

    fn populate_platform(&self, platform: &mut Platform, credentials_secret: &str) {
        platform.azure = Some(azure::Platform {
            credentials_secret_ref: LocalObjectReference::new(credentials_secret),
            region: self.region.clone(),
            base_domain_resource_group_name: self.base_domain_resource_group_name.clone(),
        });
    }

    fn machine_pool_platform(&self, instance_type: &str) -> MachinePoolPlatform {
        MachinePoolPlatform {
            azure: Some(azure::MachinePoolPlatform {
                instance_type: instance_type.to_string(),
                os_disk: azure::OsDisk {
                    disk_size_gb: OS_DISK_SIZE_GB,
                },
                zones: Vec::new(),
            }),
            ..Default::default()
        }
    }

    fn default_instance_type(&self) -> String {
        DEFAULT_INSTANCE_TYPE.to_string()
    }
}
