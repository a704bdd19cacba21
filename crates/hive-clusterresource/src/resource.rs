//! The flat collection of objects a build returns
//!
//! Objects are kept typed so callers can hand them to a typed client, and
//! serialize untagged so each one renders as a plain Kubernetes manifest.

use std::collections::{BTreeMap, BTreeSet};

use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use kube::ResourceExt;
use serde::Serialize;

use hive_common::crd::{ClusterDeployment, MachinePool};
use hive_common::{Error, Result};

/// One generated object
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClusterResource {
    /// Credentials, installer inputs, or admin material
    Secret(Secret),
    /// Extra installer manifests
    ConfigMap(ConfigMap),
    /// The primary cluster record
    ClusterDeployment(Box<ClusterDeployment>),
    /// A worker pool
    MachinePool(MachinePool),
}

impl ClusterResource {
    /// Kubernetes kind of the wrapped object
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Secret(_) => "Secret",
            Self::ConfigMap(_) => "ConfigMap",
            Self::ClusterDeployment(_) => "ClusterDeployment",
            Self::MachinePool(_) => "MachinePool",
        }
    }

    /// Object name
    pub fn name(&self) -> String {
        match self {
            Self::Secret(o) => o.name_any(),
            Self::ConfigMap(o) => o.name_any(),
            Self::ClusterDeployment(o) => o.name_any(),
            Self::MachinePool(o) => o.name_any(),
        }
    }

    /// Object namespace
    pub fn namespace(&self) -> Option<String> {
        match self {
            Self::Secret(o) => o.namespace(),
            Self::ConfigMap(o) => o.namespace(),
            Self::ClusterDeployment(o) => o.namespace(),
            Self::MachinePool(o) => o.namespace(),
        }
    }

    /// Serialize the object to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::serialization_for_kind(self.kind(), e.to_string()))
    }

    /// Serialize the object to a YAML document
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| Error::serialization_for_kind(self.kind(), e.to_string()))
    }
}

impl From<Secret> for ClusterResource {
    fn from(secret: Secret) -> Self {
        Self::Secret(secret)
    }
}

impl From<ConfigMap> for ClusterResource {
    fn from(config_map: ConfigMap) -> Self {
        Self::ConfigMap(config_map)
    }
}

impl From<ClusterDeployment> for ClusterResource {
    fn from(cd: ClusterDeployment) -> Self {
        Self::ClusterDeployment(Box::new(cd))
    }
}

impl From<MachinePool> for ClusterResource {
    fn from(pool: MachinePool) -> Self {
        Self::MachinePool(pool)
    }
}

/// Render a collection as a multi-document YAML stream
pub fn to_yaml_stream(resources: &[ClusterResource]) -> Result<String> {
    let docs = resources
        .iter()
        .map(ClusterResource::to_yaml)
        .collect::<Result<Vec<_>>>()?;
    Ok(docs.join("---\n"))
}

/// Find a secret by name
pub fn find_secret<'a>(resources: &'a [ClusterResource], name: &str) -> Option<&'a Secret> {
    resources.iter().find_map(|r| match r {
        ClusterResource::Secret(s) if s.metadata.name.as_deref() == Some(name) => Some(s),
        _ => None,
    })
}

/// Find a config map by name
pub fn find_config_map<'a>(resources: &'a [ClusterResource], name: &str) -> Option<&'a ConfigMap> {
    resources.iter().find_map(|r| match r {
        ClusterResource::ConfigMap(c) if c.metadata.name.as_deref() == Some(name) => Some(c),
        _ => None,
    })
}

/// Raw contents of a config map, merging `data` and `binaryData`
pub fn config_map_entries(config_map: &ConfigMap) -> BTreeMap<String, Vec<u8>> {
    let mut entries: BTreeMap<String, Vec<u8>> = config_map
        .data
        .iter()
        .flatten()
        .map(|(k, v)| (k.clone(), v.clone().into_bytes()))
        .collect();
    for (k, v) in config_map.binary_data.iter().flatten() {
        entries.insert(k.clone(), v.0.clone());
    }
    entries
}

/// Find a cluster deployment by name
pub fn find_cluster_deployment<'a>(
    resources: &'a [ClusterResource],
    name: &str,
) -> Option<&'a ClusterDeployment> {
    resources.iter().find_map(|r| match r {
        ClusterResource::ClusterDeployment(cd) if cd.metadata.name.as_deref() == Some(name) => {
            Some(cd.as_ref())
        }
        _ => None,
    })
}

/// Find a machine pool by object name (e.g., `<cluster>-worker`)
pub fn find_machine_pool<'a>(
    resources: &'a [ClusterResource],
    name: &str,
) -> Option<&'a MachinePool> {
    resources.iter().find_map(|r| match r {
        ClusterResource::MachinePool(mp) if mp.metadata.name.as_deref() == Some(name) => Some(mp),
        _ => None,
    })
}

/// Check the guarantees a store client relies on
///
/// - every `(kind, namespace, name)` key is unique
/// - every reference on a ClusterDeployment names a present object of the
///   right kind
/// - every MachinePool references a present ClusterDeployment
pub fn verify_references(resources: &[ClusterResource]) -> Result<()> {
    let mut keys = BTreeSet::new();
    for r in resources {
        let key = (r.kind(), r.namespace().unwrap_or_default(), r.name());
        if !keys.insert(key) {
            return Err(Error::build(format!(
                "duplicate {} {} in generated objects",
                r.kind(),
                r.name()
            )));
        }
    }

    for r in resources {
        match r {
            ClusterResource::ClusterDeployment(cd) => verify_deployment_references(cd, resources)?,
            ClusterResource::MachinePool(mp) => {
                let target = &mp.spec.cluster_deployment_ref.name;
                if find_cluster_deployment(resources, target).is_none() {
                    return Err(Error::build(format!(
                        "machine pool {} references missing ClusterDeployment {target}",
                        mp.name_any()
                    )));
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn verify_deployment_references(
    cd: &ClusterDeployment,
    resources: &[ClusterResource],
) -> Result<()> {
    let spec = &cd.spec;

    let mut secret_refs: Vec<(&str, &str)> = Vec::new();
    let mut config_map_refs: Vec<(&str, &str)> = Vec::new();

    if let Some(r) = &spec.pull_secret_ref {
        secret_refs.push(("pullSecretRef", &r.name));
    }
    if let Some(r) = spec.platform.credentials_secret_ref() {
        secret_refs.push(("platform.credentialsSecretRef", &r.name));
    }
    if let Some(meta) = &spec.cluster_metadata {
        secret_refs.push((
            "clusterMetadata.adminKubeconfigSecretRef",
            &meta.admin_kubeconfig_secret_ref.name,
        ));
    }
    for bundle in &spec.certificate_bundles {
        secret_refs.push((
            "certificateBundles.certificateSecretRef",
            &bundle.certificate_secret_ref.name,
        ));
    }
    if let Some(p) = &spec.provisioning {
        if let Some(r) = &p.install_config_secret_ref {
            secret_refs.push(("provisioning.installConfigSecretRef", &r.name));
        }
        if let Some(r) = &p.ssh_private_key_secret_ref {
            secret_refs.push(("provisioning.sshPrivateKeySecretRef", &r.name));
        }
        if let Some(r) = &p.manifests_config_map_ref {
            config_map_refs.push(("provisioning.manifestsConfigMapRef", &r.name));
        }
    }

    for (field, name) in secret_refs {
        if find_secret(resources, name).is_none() {
            return Err(Error::build(format!(
                "{field} references missing Secret {name}"
            )));
        }
    }
    for (field, name) in config_map_refs {
        if find_config_map(resources, name).is_none() {
            return Err(Error::build(format!(
                "{field} references missing ConfigMap {name}"
            )));
        }
    }

    if let Some(cp) = &spec.control_plane_config {
        let default = &cp.serving_certificates.default;
        if !default.is_empty() && !spec.certificate_bundles.iter().any(|b| &b.name == default) {
            return Err(Error::build(format!(
                "controlPlaneConfig.servingCertificates.default references missing bundle {default}"
            )));
        }
    }

    Ok(())
}
