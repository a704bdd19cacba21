//! Azure platform configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crd::LocalObjectReference;

/// Azure block of a ClusterDeployment
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    /// Secret holding `osServicePrincipal.json`
    pub credentials_secret_ref: LocalObjectReference,

    /// Azure region (e.g., "centralus")
    pub region: String,

    /// Resource group containing the base domain's DNS zone
    pub base_domain_resource_group_name: String,
}

/// OS disk settings for Azure machines
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct OsDisk {
    /// Disk size in GB
    #[serde(rename = "diskSizeGB")]
    pub disk_size_gb: i32,
}

/// Azure machine platform of a MachinePool
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachinePoolPlatform {
    /// VM size (e.g., "Standard_D2s_v3")
    #[serde(rename = "type")]
    pub instance_type: String,

    /// OS disk for each machine
    pub os_disk: OsDisk,

    /// Availability zones; empty lets the installer choose
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_disk_serializes_with_gb_suffix() {
        let platform = MachinePoolPlatform {
            instance_type: "Standard_D2s_v3".to_string(),
            os_disk: OsDisk { disk_size_gb: 128 },
            zones: vec!["1".to_string()],
        };
        let json = serde_json::to_value(&platform).unwrap();
        assert_eq!(json["osDisk"]["diskSizeGB"], 128);
        assert_eq!(json["zones"][0], "1");
    }
}
