//! ClusterDeployment Custom Resource Definition
//!
//! A ClusterDeployment is the primary record for a cluster: it names the
//! release image set, the secrets holding installer inputs, and the cloud
//! platform the cluster runs on. An adopted cluster has `installed: true` and
//! carries the metadata of the already-running cluster.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::platforms::{aws, azure, gcp, openstack};
use super::types::{ClusterImageSetReference, LocalObjectReference, PlatformType};

/// Specification for a ClusterDeployment
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "hive.openshift.io",
    version = "v1",
    kind = "ClusterDeployment",
    plural = "clusterdeployments",
    shortname = "cd",
    namespaced,
    derive = "PartialEq",
    printcolumn = r#"{"name":"Installed","type":"boolean","jsonPath":".spec.installed"}"#,
    printcolumn = r#"{"name":"InfraID","type":"string","jsonPath":".spec.clusterMetadata.infraID"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterDeploymentSpec {
    /// Friendly name of the cluster; also the name of the installer config
    pub cluster_name: String,

    /// Base DNS domain; cluster DNS lives under `<clusterName>.<baseDomain>`
    pub base_domain: String,

    /// Cloud platform the cluster runs on
    pub platform: Platform,

    /// Secret holding the image pull secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_secret_ref: Option<LocalObjectReference>,

    /// Whether DNS zones for the cluster are managed for the user
    #[serde(default, rename = "manageDNS", skip_serializing_if = "std::ops::Not::not")]
    pub manage_dns: bool,

    /// Whether the cluster has already been installed (always true for adoption)
    #[serde(default)]
    pub installed: bool,

    /// Metadata of an installed cluster
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_metadata: Option<ClusterMetadata>,

    /// Inputs for a fresh install
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning: Option<Provisioning>,

    /// Certificate bundles available to the control plane
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certificate_bundles: Vec<CertificateBundleSpec>,

    /// Control plane configuration (serving certificates)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_config: Option<ControlPlaneConfigSpec>,
}

/// Provider-specific blocks; exactly one is expected to be set
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct Platform {
    /// AWS configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<aws::Platform>,
    /// Azure configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<azure::Platform>,
    /// GCP configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcp: Option<gcp::Platform>,
    /// OpenStack configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openstack: Option<openstack::Platform>,
}

impl Platform {
    /// Returns the configured platform types
    pub fn configured(&self) -> Vec<PlatformType> {
        let mut types = Vec::new();
        if self.aws.is_some() {
            types.push(PlatformType::Aws);
        }
        if self.azure.is_some() {
            types.push(PlatformType::Azure);
        }
        if self.gcp.is_some() {
            types.push(PlatformType::Gcp);
        }
        if self.openstack.is_some() {
            types.push(PlatformType::OpenStack);
        }
        types
    }

    /// Name of the credentials secret referenced by whichever block is set
    pub fn credentials_secret_ref(&self) -> Option<&LocalObjectReference> {
        self.aws
            .as_ref()
            .map(|p| &p.credentials_secret_ref)
            .or_else(|| self.azure.as_ref().map(|p| &p.credentials_secret_ref))
            .or_else(|| self.gcp.as_ref().map(|p| &p.credentials_secret_ref))
            .or_else(|| self.openstack.as_ref().map(|p| &p.credentials_secret_ref))
    }
}

/// Inputs needed to install a new cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Provisioning {
    /// Release image set to install
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_set_ref: Option<ClusterImageSetReference>,

    /// Secret holding `install-config.yaml`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_config_secret_ref: Option<LocalObjectReference>,

    /// Secret holding the SSH private key for node access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_private_key_secret_ref: Option<LocalObjectReference>,

    /// ConfigMap of extra manifests passed to the installer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifests_config_map_ref: Option<LocalObjectReference>,
}

/// Metadata describing an installed cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterMetadata {
    /// Cluster identifier assigned at install time
    #[serde(rename = "clusterID")]
    pub cluster_id: String,

    /// Infrastructure identifier prefixed to cloud resources
    #[serde(rename = "infraID")]
    pub infra_id: String,

    /// Secret holding the admin kubeconfig
    pub admin_kubeconfig_secret_ref: LocalObjectReference,
}

/// A named certificate bundle stored in a TLS secret
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CertificateBundleSpec {
    /// Bundle name referenced from serving certificate configuration
    pub name: String,

    /// Whether to generate the certificate instead of using the secret contents
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub generate: bool,

    /// Secret holding `tls.crt` and `tls.key`
    pub certificate_secret_ref: LocalObjectReference,
}

/// Control plane configuration
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneConfigSpec {
    /// Serving certificates for the API server
    #[serde(default)]
    pub serving_certificates: ControlPlaneServingCertificateSpec,
}

/// Serving certificate selection for the API server
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneServingCertificateSpec {
    /// Name of the certificate bundle used for the default API endpoint
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_reports_every_populated_block() {
        let mut platform = Platform::default();
        assert!(platform.configured().is_empty());
        assert!(platform.credentials_secret_ref().is_none());

        platform.gcp = Some(gcp::Platform {
            credentials_secret_ref: LocalObjectReference::new("c-gcp-creds"),
            region: "us-east1".to_string(),
            project_id: "p".to_string(),
        });
        assert_eq!(platform.configured(), vec![PlatformType::Gcp]);
        assert_eq!(
            platform.credentials_secret_ref().map(|r| r.name.as_str()),
            Some("c-gcp-creds")
        );
    }

    #[test]
    fn spec_serializes_hive_field_names() {
        let spec = ClusterDeploymentSpec {
            cluster_name: "mycluster".to_string(),
            base_domain: "example.com".to_string(),
            manage_dns: true,
            installed: true,
            cluster_metadata: Some(ClusterMetadata {
                cluster_id: "cid".to_string(),
                infra_id: "iid".to_string(),
                admin_kubeconfig_secret_ref: LocalObjectReference::new("kc"),
            }),
            provisioning: Some(Provisioning {
                ssh_private_key_secret_ref: Some(LocalObjectReference::new("ssh")),
                ..Default::default()
            }),
            ..Default::default()
        };

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["manageDNS"], true);
        assert_eq!(json["clusterMetadata"]["clusterID"], "cid");
        assert_eq!(json["clusterMetadata"]["infraID"], "iid");
        assert_eq!(json["provisioning"]["sshPrivateKeySecretRef"]["name"], "ssh");
        assert!(json.get("certificateBundles").is_none());
    }

    #[test]
    fn crd_uses_hive_group() {
        use kube::CustomResourceExt;
        let crd = ClusterDeployment::crd();
        assert_eq!(crd.spec.group, "hive.openshift.io");
        assert_eq!(crd.spec.names.kind, "ClusterDeployment");
        assert_eq!(crd.spec.scope, "Namespaced");
    }
}
