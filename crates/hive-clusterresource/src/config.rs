//! Request documents
//!
//! A [`ClusterRequestConfig`] is the YAML (or JSON) form of a [`Builder`].
//! Credentials are plain strings in the document and become raw bytes on
//! the builder. Exactly one platform block must be present:
//!
//! ```yaml
//! name: mycluster
//! namespace: mynamespace
//! baseDomain: example.com
//! imageSet: openshift-v4.14
//! workerNodeCount: 3
//! pullSecret: '{"auths": {}}'
//! sshPrivateKey: ...
//! platform:
//!   aws:
//!     accessKeyId: AKIA...
//!     secretAccessKey: ...
//!     region: us-west-2
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use hive_common::{Error, Result};

use crate::builder::{AdditionalMachinePool, Builder};
use crate::cloud::{
    AwsCloudBuilder, AzureCloudBuilder, CloudBuilder, GcpCloudBuilder, InstallConfigPolicy,
    OpenStackCloudBuilder,
};
use crate::install_config::Networking;

/// A cluster request document
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterRequestConfig {
    /// Cluster name
    pub name: String,
    /// Target namespace
    pub namespace: String,
    /// Base DNS domain
    pub base_domain: String,
    /// Replica count of the default worker pool
    #[serde(default)]
    pub worker_node_count: i64,
    /// Image pull secret
    #[serde(default)]
    pub pull_secret: String,
    /// SSH private key
    #[serde(default)]
    pub ssh_private_key: String,
    /// SSH public key
    #[serde(default)]
    pub ssh_public_key: String,
    /// ClusterDeployment labels
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Extra installer manifests, file name to contents
    #[serde(default)]
    pub manifests: BTreeMap<String, String>,
    /// Lifetime hint such as `8h`
    #[serde(default)]
    pub delete_after: String,
    /// ClusterImageSet name
    #[serde(default)]
    pub image_set: String,
    /// Machine network CIDR
    #[serde(default)]
    pub machine_network: String,
    /// Worker instance type override
    #[serde(default)]
    pub worker_instance_type: Option<String>,
    /// Give up after the first failed install attempt
    #[serde(default)]
    pub install_once: bool,
    /// Manage DNS zones
    #[serde(default, rename = "manageDNS")]
    pub manage_dns: bool,
    /// Serving certificate PEM
    #[serde(default)]
    pub serving_cert: String,
    /// Serving certificate key PEM
    #[serde(default)]
    pub serving_cert_key: String,
    /// Cluster networking
    #[serde(default)]
    pub networking: Networking,
    /// Extra worker pools
    #[serde(default)]
    pub additional_machine_pools: Vec<AdditionalMachinePool>,
    /// Install-config emission for adopted clusters
    #[serde(default)]
    pub install_config_policy: InstallConfigPolicy,
    /// Adopt an existing cluster
    #[serde(default)]
    pub adopt: Option<AdoptConfig>,
    /// Provider settings
    pub platform: PlatformConfig,
}

/// Identifiers of an already-installed cluster
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdoptConfig {
    /// Infrastructure id
    #[serde(default)]
    pub infra_id: String,
    /// Cluster id
    #[serde(default)]
    pub cluster_id: String,
    /// Admin kubeconfig contents
    #[serde(default)]
    pub admin_kubeconfig: String,
}

/// Provider settings; exactly one block is expected
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct PlatformConfig {
    /// AWS settings
    #[serde(default)]
    pub aws: Option<AwsConfig>,
    /// Azure settings
    #[serde(default)]
    pub azure: Option<AzureConfig>,
    /// GCP settings
    #[serde(default)]
    pub gcp: Option<GcpConfig>,
    /// OpenStack settings
    #[serde(default)]
    pub openstack: Option<OpenStackConfig>,
}

/// AWS settings
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AwsConfig {
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Region (default us-east-1)
    #[serde(default)]
    pub region: Option<String>,
    /// Tags for created resources
    #[serde(default)]
    pub user_tags: BTreeMap<String, String>,
    /// Worker availability zones
    #[serde(default)]
    pub zones: Vec<String>,
}

/// Azure settings
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AzureConfig {
    /// Service principal JSON
    pub service_principal: String,
    /// Resource group of the base domain
    pub base_domain_resource_group_name: String,
    /// Region (default centralus)
    #[serde(default)]
    pub region: Option<String>,
}

/// GCP settings
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GcpConfig {
    /// Service account JSON
    pub service_account: String,
    /// Project id
    #[serde(rename = "projectID")]
    pub project_id: String,
    /// Region (default us-east1)
    #[serde(default)]
    pub region: Option<String>,
}

/// OpenStack settings
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenStackConfig {
    /// clouds.yaml contents
    pub clouds_yaml: String,
    /// Entry in clouds.yaml (default openstack)
    #[serde(default)]
    pub cloud: Option<String>,
    /// Default worker flavor
    #[serde(default)]
    pub compute_flavor: Option<String>,
    /// Trunk port support
    #[serde(default)]
    pub trunk_support: bool,
}

impl PlatformConfig {
    fn into_cloud_builder(self, cluster: &str) -> Result<Box<dyn CloudBuilder>> {
        let count = [
            self.aws.is_some(),
            self.azure.is_some(),
            self.gcp.is_some(),
            self.openstack.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count();
        if count != 1 {
            return Err(Error::validation_for_field(
                cluster,
                "platform",
                format!("exactly one platform must be configured, found {count}"),
            ));
        }

        if let Some(aws) = self.aws {
            let mut cloud = AwsCloudBuilder::new(aws.access_key_id, aws.secret_access_key)
                .with_user_tags(aws.user_tags);
            if let Some(region) = aws.region {
                cloud = cloud.with_region(region);
            }
            cloud.zones = aws.zones;
            return Ok(Box::new(cloud));
        }
        if let Some(azure) = self.azure {
            let mut cloud = AzureCloudBuilder::new(
                azure.service_principal,
                azure.base_domain_resource_group_name,
            );
            if let Some(region) = azure.region {
                cloud = cloud.with_region(region);
            }
            return Ok(Box::new(cloud));
        }
        if let Some(gcp) = self.gcp {
            let mut cloud = GcpCloudBuilder::new(gcp.service_account, gcp.project_id);
            if let Some(region) = gcp.region {
                cloud = cloud.with_region(region);
            }
            return Ok(Box::new(cloud));
        }
        if let Some(os) = self.openstack {
            let mut cloud = OpenStackCloudBuilder::new(os.clouds_yaml);
            if let Some(name) = os.cloud {
                cloud = cloud.with_cloud(name);
            }
            cloud.compute_flavor = os.compute_flavor;
            cloud.trunk_support = os.trunk_support;
            return Ok(Box::new(cloud));
        }

        Err(Error::validation_for_field(
            cluster,
            "platform",
            "no platform configured",
        ))
    }
}

impl TryFrom<ClusterRequestConfig> for Builder {
    type Error = Error;

    fn try_from(config: ClusterRequestConfig) -> Result<Self> {
        let cloud_builder = config.platform.into_cloud_builder(&config.name)?;
        let adopt = config.adopt.unwrap_or_default();
        let adopting = !adopt.infra_id.is_empty()
            || !adopt.cluster_id.is_empty()
            || !adopt.admin_kubeconfig.is_empty();

        Ok(Builder {
            name: config.name,
            namespace: config.namespace,
            base_domain: config.base_domain,
            worker_node_count: config.worker_node_count,
            pull_secret: config.pull_secret,
            ssh_private_key: config.ssh_private_key,
            ssh_public_key: config.ssh_public_key,
            labels: config.labels,
            manifests: config
                .manifests
                .into_iter()
                .map(|(name, contents)| (name, contents.into_bytes()))
                .collect(),
            delete_after: config.delete_after,
            image_set: config.image_set,
            machine_network: config.machine_network,
            adopt: adopting,
            adopt_infra_id: adopt.infra_id,
            adopt_cluster_id: adopt.cluster_id,
            adopt_admin_kubeconfig: adopt.admin_kubeconfig.into_bytes(),
            worker_instance_type: config.worker_instance_type,
            install_once: config.install_once,
            manage_dns: config.manage_dns,
            serving_cert: config.serving_cert,
            serving_cert_key: config.serving_cert_key,
            networking: config.networking,
            additional_machine_pools: config.additional_machine_pools,
            install_config_policy: config.install_config_policy,
            cloud_builder: Some(cloud_builder),
        })
    }
}

impl Builder {
    /// Parse a request document
    ///
    /// The result is not validated; call [`Builder::validate`] or
    /// [`Builder::build`].
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ClusterRequestConfig = serde_yaml::from_str(yaml)
            .map_err(|e| Error::validation(format!("invalid cluster request: {e}")))?;
        config.try_into()
    }
}
