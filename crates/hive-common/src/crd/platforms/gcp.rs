//! GCP platform configuration

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crd::LocalObjectReference;

/// GCP block of a ClusterDeployment
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    /// Secret holding `osServiceAccount.json`
    pub credentials_secret_ref: LocalObjectReference,

    /// GCP region (e.g., "us-east1")
    pub region: String,

    /// Project the cluster is installed into
    #[serde(rename = "projectID")]
    pub project_id: String,
}

/// GCP machine platform of a MachinePool
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachinePoolPlatform {
    /// Machine type (e.g., "n1-standard-4")
    #[serde(rename = "type")]
    pub instance_type: String,

    /// Zones; empty lets the installer choose
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub zones: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_id_keeps_installer_casing() {
        let platform = Platform {
            credentials_secret_ref: LocalObjectReference::new("c-gcp-creds"),
            region: "us-east1".to_string(),
            project_id: "my-project".to_string(),
        };
        let json = serde_json::to_value(&platform).unwrap();
        assert_eq!(json["projectID"], "my-project");
        assert_eq!(json["credentialsSecretRef"]["name"], "c-gcp-creds");
    }
}
