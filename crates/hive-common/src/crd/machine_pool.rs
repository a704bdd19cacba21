//! MachinePool Custom Resource Definition
//!
//! A MachinePool describes one group of worker machines belonging to a
//! ClusterDeployment. It is a separate object so pools can be scaled
//! without touching the deployment.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::platforms::{aws, azure, gcp, openstack};
use super::types::{LocalObjectReference, PlatformType};

/// Specification for a MachinePool
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "MachinePool",
    plural = "machinepools",
    namespaced,
    derive = "PartialEq",
    printcolumn = r#"{"name":"PoolName","type":"string","jsonPath":".spec.name"}"#,
    printcolumn = r#"{"name":"ClusterDeployment","type":"string","jsonPath":".spec.clusterDeploymentRef.name"}"#,
    printcolumn = r#"{"name":"Replicas","type":"integer","jsonPath":".spec.replicas"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MachinePoolSpec {
    /// ClusterDeployment this pool belongs to
    pub cluster_deployment_ref: LocalObjectReference,

    /// Pool name within the cluster (e.g., "worker")
    pub name: String,

    /// Desired number of machines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i64>,

    /// Machine platform for the pool
    pub platform: MachinePoolPlatform,

    /// Labels applied to the pool's nodes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// Provider-specific machine configuration; exactly one is expected to be set
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct MachinePoolPlatform {
    /// AWS machine configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<aws::MachinePoolPlatform>,
    /// Azure machine configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<azure::MachinePoolPlatform>,
    /// GCP machine configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp: Option<gcp::MachinePoolPlatform>,
    /// OpenStack machine configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openstack: Option<openstack::MachinePoolPlatform>,
}

impl MachinePoolPlatform {
    /// Platform of the populated block, if exactly one is set
    pub fn platform_type(&self) -> Option<PlatformType> {
        match (
            self.aws.is_some(),
            self.azure.is_some(),
            self.gcp.is_some(),
            self.openstack.is_some(),
        ) {
            (true, false, false, false) => Some(PlatformType::Aws),
            (false, true, false, false) => Some(PlatformType::Azure),
            (false, false, true, false) => Some(PlatformType::Gcp),
            (false, false, false, true) => Some(PlatformType::OpenStack),
            _ => None,
        }
    }

    /// Instance type (or flavor) of the populated block
    pub fn instance_type(&self) -> Option<&str> {
        self.aws
            .as_ref()
            .map(|p| p.instance_type.as_str())
            .or_else(|| self.azure.as_ref().map(|p| p.instance_type.as_str()))
            .or_else(|| self.gcp.as_ref().map(|p| p.instance_type.as_str()))
            .or_else(|| self.openstack.as_ref().map(|p| p.flavor.as_str()))
    }
}
