//! OpenStack platform configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crd::LocalObjectReference;

/// OpenStack block of a ClusterDeployment
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    /// Secret holding `clouds.yaml`
    pub credentials_secret_ref: LocalObjectReference,

    /// Entry in clouds.yaml to use
    pub cloud: String,

    /// Whether the cloud supports Neutron trunk ports
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub trunk_support: bool,
}

/// OpenStack machine platform of a MachinePool
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachinePoolPlatform {
    /// Nova flavor (e.g., "m1.large")
    #[serde(rename = "type")]
    pub flavor: String,
}
