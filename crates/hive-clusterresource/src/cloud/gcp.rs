//! GCP strategy

use hive_common::crd::{gcp, LocalObjectReference, MachinePoolPlatform, Platform, PlatformType};
use hive_common::Result;

use super::{require_credential, require_setting, CloudBuilder, CredentialMaterial};

/// Secret key holding the service account JSON
pub const SERVICE_ACCOUNT_KEY: &str = "osServiceAccount.json";

const DEFAULT_REGION: &str = "us-east1";
const DEFAULT_INSTANCE_TYPE: &str = "n1-standard-4";

/// Builds GCP clusters authenticated by a service account key
#[derive(Clone, Debug, PartialEq)]
pub struct GcpCloudBuilder {
    /// Service account key JSON document
    pub service_account: Vec<u8>,
    /// Project to install into
    pub project_id: String,
    /// Region to install into
    pub region: String,
}

impl GcpCloudBuilder {
    /// Create a strategy for the default region
    pub fn new(service_account: impl Into<Vec<u8>>, project_id: impl Into<String>) -> Self {
        Self {
            service_account: service_account.into(),
            project_id: project_id.into(),
            region: DEFAULT_REGION.to_string(),
        }
    }

    /// Install into a specific region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }
}

impl CloudBuilder for GcpCloudBuilder {
    fn platform_type(&self) -> PlatformType {
        PlatformType::Gcp
    }

    fn validate(&self, cluster: &str) -> Result<()> {
        require_credential(cluster, "gcp.serviceAccount", &self.service_account)?;
        require_setting(cluster, "gcp.projectID", &self.project_id)?;
        require_setting(cluster, "gcp.region", &self.region)
    }

    fn credential_material(&self) -> Vec<CredentialMaterial> {
        vec![CredentialMaterial::for_platform(PlatformType::Gcp)
            .with_entry(SERVICE_ACCOUNT_KEY, self.service_account.clone())]
    }

    fn populate_platform(&self, platform: &mut Platform, credentials_secret: &str) {
        platform.gcp = Some(gcp::Platform {
            credentials_secret_ref: LocalObjectReference::new(credentials_secret),
            region: self.region.clone(),
            project_id: self.project_id.clone(),
        });
    }

    fn machine_pool_platform(&self, instance_type: &str) -> MachinePoolPlatform {
        MachinePoolPlatform {
            gcp: Some(gcp::MachinePoolPlatform {
                instance_type: instance_type.to_string(),
                zones: Vec::new(),
            }),
            ..Default::default()
        }
    }

    fn default_instance_type(&self) -> String {
        DEFAULT_INSTANCE_TYPE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_service_account_and_project() {
        assert!(GcpCloudBuilder::new("fakeSA", "gcp-project-id")
            .validate("c1")
            .is_ok());

        let err = GcpCloudBuilder::new("sa", "").validate("c1").unwrap_err();
        assert_eq!(err.field(), Some("gcp.projectID"));

        let err = GcpCloudBuilder::new(Vec::<u8>::new(), "p")
            .validate("c1")
            .unwrap_err();
        assert_eq!(err.field(), Some("gcp.serviceAccount"));
    }

    #[test]
    fn platform_carries_project() {
        let mut platform = Platform::default();
        GcpCloudBuilder::new("fakeSA", "gcp-project-id").populate_platform(&mut platform, "c1-gcp-creds");
        let gcp = platform.gcp.unwrap();
        assert_eq!(gcp.project_id, "gcp-project-id");
        assert_eq!(gcp.region, "us-east1");
        assert_eq!(gcp.credentials_secret_ref.name, "c1-gcp-creds");
    }
}
