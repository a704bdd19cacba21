//! AWS platform configuration

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crd::LocalObjectReference;

/// AWS block of a ClusterDeployment
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    /// Secret holding `aws_access_key_id` and `aws_secret_access_key`
    pub credentials_secret_ref: LocalObjectReference,

    /// AWS region (e.g., "us-east-1")
    pub region: String,

    /// Tags applied to every AWS resource the installer creates
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_tags: BTreeMap<String, String>,
}

/// EC2 root volume settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct Ec2RootVolume {
    /// Provisioned IOPS (0 lets AWS pick for the volume type)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub iops: i32,
    /// Size in GiB
    pub size: i32,
    /// Volume type (e.g., "gp3")
    #[serde(rename = "type")]
    pub type_: String,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

/// AWS machine platform of a MachinePool
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachinePoolPlatform {
    /// EC2 instance type (e.g., "m5.xlarge")
    #[serde(rename = "type")]
    pub instance_type: String,

    /// Root volume for each machine
    pub root_volume: Ec2RootVolume,

    /// Availability zones; empty lets the installer choose
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<String>,
}
