//! ClusterDeployment to installer configuration translation
//!
//! [`generate_install_config`] is a pure function: the same deployment,
//! pools and networking always produce the same [`InstallConfig`]. The
//! result is stored YAML-encoded in the `<cluster>-install-config` secret.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::str::FromStr;

use kube::ResourceExt;
use serde::{Deserialize, Serialize};

use hive_common::crd::{ClusterDeployment, MachinePool, MachinePoolPlatform, PlatformType};
use hive_common::{Error, Result};

/// Installer configuration API version
pub const INSTALL_CONFIG_API_VERSION: &str = "v1";
/// Secret key holding the YAML payload
pub const INSTALL_CONFIG_KEY: &str = "install-config.yaml";
/// Pool name of the control plane
pub const CONTROL_PLANE_POOL_NAME: &str = "master";
/// Control plane machine count
pub const CONTROL_PLANE_REPLICAS: i64 = 3;

/// Default pod network
pub const DEFAULT_CLUSTER_NETWORK_CIDR: &str = "10.128.0.0/14";
/// Default per-node pod subnet size
pub const DEFAULT_CLUSTER_NETWORK_HOST_PREFIX: i32 = 23;
/// Default service network
pub const DEFAULT_SERVICE_NETWORK_CIDR: &str = "172.30.0.0/16";

/// Cluster network plugin
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkType {
    /// OpenShift SDN
    #[default]
    OpenShiftSDN,
    /// OVN-Kubernetes
    OVNKubernetes,
}

impl NetworkType {
    /// Installer spelling of the network type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenShiftSDN => "OpenShiftSDN",
            Self::OVNKubernetes => "OVNKubernetes",
        }
    }
}

impl FromStr for NetworkType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OpenShiftSDN" => Ok(Self::OpenShiftSDN),
            "OVNKubernetes" => Ok(Self::OVNKubernetes),
            _ => Err(Error::validation(format!(
                "unknown network type: {s}, expected OpenShiftSDN or OVNKubernetes"
            ))),
        }
    }
}

impl std::fmt::Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested cluster networking
///
/// The network type is kept as text so an unknown value surfaces as a
/// validation error naming it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Networking {
    /// Network plugin name
    pub network_type: String,
    /// Pod network CIDR (empty for none)
    pub cluster_network_cidr: String,
    /// Per-node pod subnet prefix length
    pub cluster_network_host_prefix: i32,
    /// Service network CIDR (empty for none)
    pub service_network_cidr: String,
}

impl Default for Networking {
    fn default() -> Self {
        Self {
            network_type: NetworkType::default().to_string(),
            cluster_network_cidr: DEFAULT_CLUSTER_NETWORK_CIDR.to_string(),
            cluster_network_host_prefix: DEFAULT_CLUSTER_NETWORK_HOST_PREFIX,
            service_network_cidr: DEFAULT_SERVICE_NETWORK_CIDR.to_string(),
        }
    }
}

impl Networking {
    /// Check the network type, CIDRs and host prefix
    pub fn validate(&self, cluster: &str, machine_network: &str) -> Result<()> {
        if NetworkType::from_str(&self.network_type).is_err() {
            return Err(Error::validation_for_field(
                cluster,
                "networking.networkType",
                format!(
                    "unknown network type: {}, expected OpenShiftSDN or OVNKubernetes",
                    self.network_type
                ),
            ));
        }
        optional_cidr(cluster, "networking.clusterNetwork", &self.cluster_network_cidr)?;
        optional_cidr(cluster, "networking.serviceNetwork", &self.service_network_cidr)?;
        optional_cidr(cluster, "networking.machineNetwork", machine_network)?;

        // Per-node subnets are carved out of the pod network.
        let (min_prefix, max_prefix) = match parse_cidr(&self.cluster_network_cidr) {
            Ok((IpAddr::V6(_), len)) => (i32::from(len), 128),
            Ok((IpAddr::V4(_), len)) => (i32::from(len), 32),
            Err(_) => (0, 32),
        };
        if !(min_prefix..=max_prefix).contains(&self.cluster_network_host_prefix) {
            return Err(Error::validation_for_field(
                cluster,
                "networking.clusterNetworkHostPrefix",
                format!(
                    "host prefix {} out of range {min_prefix}..={max_prefix}",
                    self.cluster_network_host_prefix
                ),
            ));
        }
        Ok(())
    }
}

/// Installer configuration document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallConfig {
    /// Always `v1`
    pub api_version: String,
    /// Carries the cluster name
    pub metadata: InstallConfigMetadata,
    /// Base DNS domain
    pub base_domain: String,
    /// Cluster networking
    pub networking: InstallNetworking,
    /// Control plane pool
    pub control_plane: InstallMachinePool,
    /// Worker pools
    pub compute: Vec<InstallMachinePool>,
    /// Target platform
    pub platform: InstallPlatform,
    /// Image pull secret
    pub pull_secret: String,
    /// SSH public key installed on every node
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ssh_key: String,
}

impl InstallConfig {
    /// Encode as the YAML payload stored in the install-config secret
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| Error::serialization_for_kind("InstallConfig", e.to_string()))
    }
}

/// Installer object metadata
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallConfigMetadata {
    /// Cluster name
    pub name: String,
}

/// Installer networking section
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallNetworking {
    /// Network plugin
    pub network_type: NetworkType,
    /// Pod networks
    #[serde(default)]
    pub cluster_network: Vec<ClusterNetworkEntry>,
    /// Machine networks
    #[serde(default)]
    pub machine_network: Vec<MachineNetworkEntry>,
    /// Service networks
    #[serde(default)]
    pub service_network: Vec<String>,
}

/// One pod network
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterNetworkEntry {
    /// Network CIDR
    pub cidr: String,
    /// Per-node subnet prefix length
    pub host_prefix: i32,
}

/// One machine network
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MachineNetworkEntry {
    /// Network CIDR
    pub cidr: String,
}

/// Installer machine pool
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallMachinePool {
    /// Pool name
    pub name: String,
    /// Machine count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i64>,
    /// Machine platform; same wire shape as the MachinePool CRD
    pub platform: MachinePoolPlatform,
}

/// Installer platform section; exactly one block is set
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InstallPlatform {
    /// AWS settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AwsInstallPlatform>,
    /// Azure settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureInstallPlatform>,
    /// GCP settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp: Option<GcpInstallPlatform>,
    /// OpenStack settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openstack: Option<OpenStackInstallPlatform>,
}

/// Installer AWS settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsInstallPlatform {
    /// Region
    pub region: String,
    /// Tags for created resources
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_tags: BTreeMap<String, String>,
}

/// Installer Azure settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureInstallPlatform {
    /// Region
    pub region: String,
    /// Resource group of the base domain's DNS zone
    pub base_domain_resource_group_name: String,
}

/// Installer GCP settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GcpInstallPlatform {
    /// Project
    #[serde(rename = "projectID")]
    pub project_id: String,
    /// Region
    pub region: String,
}

/// Installer OpenStack settings
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenStackInstallPlatform {
    /// Entry in clouds.yaml
    pub cloud: String,
    /// Trunk port support
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub trunk_support: bool,
}

/// Everything the translation reads
#[derive(Clone, Copy, Debug)]
pub struct InstallConfigInput<'a> {
    /// The in-progress ClusterDeployment (platform already populated)
    pub deployment: &'a ClusterDeployment,
    /// Worker pools, in order
    pub pools: &'a [MachinePool],
    /// Machine platform for the control plane
    pub control_plane_platform: &'a MachinePoolPlatform,
    /// Requested networking
    pub networking: &'a Networking,
    /// Machine network CIDR (empty for none)
    pub machine_network: &'a str,
    /// SSH public key
    pub ssh_key: &'a str,
    /// Image pull secret
    pub pull_secret: &'a str,
}

/// Translate a deployment and its pools into an installer configuration
pub fn generate_install_config(input: InstallConfigInput<'_>) -> Result<InstallConfig> {
    let cd = input.deployment;
    let cluster = cd.name_any();

    let networking = input.networking;
    networking.validate(&cluster, input.machine_network)?;
    let network_type = NetworkType::from_str(&networking.network_type)?;

    let cluster_network = optional_cidr(
        &cluster,
        "networking.clusterNetwork",
        &networking.cluster_network_cidr,
    )?
    .map(|cidr| ClusterNetworkEntry {
        cidr,
        host_prefix: networking.cluster_network_host_prefix,
    })
    .into_iter()
    .collect();
    let machine_network =
        optional_cidr(&cluster, "networking.machineNetwork", input.machine_network)?
            .map(|cidr| MachineNetworkEntry { cidr })
            .into_iter()
            .collect();
    let service_network = optional_cidr(
        &cluster,
        "networking.serviceNetwork",
        &networking.service_network_cidr,
    )?
    .into_iter()
    .collect();

    let compute = input
        .pools
        .iter()
        .map(|pool| InstallMachinePool {
            name: pool.spec.name.clone(),
            replicas: pool.spec.replicas,
            platform: pool.spec.platform.clone(),
        })
        .collect();

    Ok(InstallConfig {
        api_version: INSTALL_CONFIG_API_VERSION.to_string(),
        metadata: InstallConfigMetadata {
            name: cd.spec.cluster_name.clone(),
        },
        base_domain: cd.spec.base_domain.clone(),
        networking: InstallNetworking {
            network_type,
            cluster_network,
            machine_network,
            service_network,
        },
        control_plane: InstallMachinePool {
            name: CONTROL_PLANE_POOL_NAME.to_string(),
            replicas: Some(CONTROL_PLANE_REPLICAS),
            platform: input.control_plane_platform.clone(),
        },
        compute,
        platform: install_platform(cd, &cluster)?,
        pull_secret: input.pull_secret.to_string(),
        ssh_key: input.ssh_key.to_string(),
    })
}

fn install_platform(cd: &ClusterDeployment, cluster: &str) -> Result<InstallPlatform> {
    let platform = &cd.spec.platform;
    let configured = platform.configured();
    let mut out = InstallPlatform::default();

    match configured.as_slice() {
        [PlatformType::Aws] => {
            if let Some(aws) = &platform.aws {
                out.aws = Some(AwsInstallPlatform {
                    region: aws.region.clone(),
                    user_tags: aws.user_tags.clone(),
                });
            }
        }
        [PlatformType::Azure] => {
            if let Some(azure) = &platform.azure {
                out.azure = Some(AzureInstallPlatform {
                    region: azure.region.clone(),
                    base_domain_resource_group_name: azure.base_domain_resource_group_name.clone(),
                });
            }
        }
        [PlatformType::Gcp] => {
            if let Some(gcp) = &platform.gcp {
                out.gcp = Some(GcpInstallPlatform {
                    project_id: gcp.project_id.clone(),
                    region: gcp.region.clone(),
                });
            }
        }
        [PlatformType::OpenStack] => {
            if let Some(os) = &platform.openstack {
                out.openstack = Some(OpenStackInstallPlatform {
                    cloud: os.cloud.clone(),
                    trunk_support: os.trunk_support,
                });
            }
        }
        [] => {
            return Err(Error::build_for(
                cluster,
                "ClusterDeployment has no platform configured",
            ))
        }
        many => {
            return Err(Error::build_for(
                cluster,
                format!("ClusterDeployment has {} platforms configured", many.len()),
            ))
        }
    }

    Ok(out)
}

/// Parse `addr/prefix`, returning the address and prefix length
pub fn parse_cidr(s: &str) -> std::result::Result<(IpAddr, u8), String> {
    let (addr, prefix) = s
        .split_once('/')
        .ok_or_else(|| format!("invalid CIDR {s}: missing prefix length"))?;
    let addr: IpAddr = addr
        .parse()
        .map_err(|_| format!("invalid CIDR {s}: bad address"))?;
    let prefix: u8 = prefix
        .parse()
        .map_err(|_| format!("invalid CIDR {s}: bad prefix length"))?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    if prefix > max {
        return Err(format!("invalid CIDR {s}: prefix length exceeds {max}"));
    }
    Ok((addr, prefix))
}

fn optional_cidr(cluster: &str, field: &str, s: &str) -> Result<Option<String>> {
    if s.is_empty() {
        return Ok(None);
    }
    parse_cidr(s).map_err(|msg| Error::validation_for_field(cluster, field, msg))?;
    Ok(Some(s.to_string()))
}
