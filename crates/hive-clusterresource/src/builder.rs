//! Cluster resource assembly
//!
//! A [`Builder`] is one cluster request. [`Builder::build`] validates it and
//! fans it out into every object a provisioning control plane needs:
//! credential and installer secrets, the manifests config map, the
//! ClusterDeployment, and its MachinePools. All cross-references between
//! them are derived from [`ResourceNames`], so rebuilding the same request
//! always yields the same names.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{ConfigMap, Secret};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use tracing::{debug, info};

use hive_common::crd::{
    CertificateBundleSpec, ClusterDeployment, ClusterDeploymentSpec, ClusterImageSetReference,
    ClusterMetadata, ControlPlaneConfigSpec, ControlPlaneServingCertificateSpec,
    LocalObjectReference, MachinePool, MachinePoolSpec, Platform, Provisioning,
};
use hive_common::validation::{
    parse_duration, validate_dns_label, validate_dns_subdomain, validate_label_key,
    validate_label_value,
};
use hive_common::{Error, Result, DELETE_AFTER_ANNOTATION, TRY_INSTALL_ONCE_ANNOTATION};

use crate::cloud::{CloudBuilder, InstallConfigPolicy};
use crate::install_config::{
    generate_install_config, InstallConfigInput, Networking, INSTALL_CONFIG_KEY,
};
use crate::naming::{ResourceNames, SERVING_CERT_BUNDLE_NAME, WORKER_POOL_NAME};
use crate::resource::{verify_references, ClusterResource};

/// Secret type for opaque payloads
pub const SECRET_TYPE_OPAQUE: &str = "Opaque";
/// Secret type for image pull secrets
pub const SECRET_TYPE_DOCKER_CONFIG_JSON: &str = "kubernetes.io/dockerconfigjson";
/// Secret type for TLS key pairs
pub const SECRET_TYPE_TLS: &str = "kubernetes.io/tls";

/// Key of the pull secret payload
pub const PULL_SECRET_KEY: &str = ".dockerconfigjson";
/// Key of the SSH private key payload
pub const SSH_PRIVATE_KEY_KEY: &str = "ssh-privatekey";
/// Key of the adopted admin kubeconfig payload
pub const KUBECONFIG_KEY: &str = "kubeconfig";
/// Key of the TLS certificate
pub const TLS_CERT_KEY: &str = "tls.crt";
/// Key of the TLS private key
pub const TLS_KEY_KEY: &str = "tls.key";

const MAX_CONFIG_MAP_KEY_LEN: usize = 253;

/// A worker pool beyond the default `worker` pool
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalMachinePool {
    /// Pool name; the MachinePool is named `<cluster>-<name>`
    pub name: String,
    /// Machine count
    pub replicas: i64,
    /// Instance type, falling back to the request's worker instance type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Labels applied to the pool's nodes
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// One cluster request
///
/// Fields are public so callers can fill them directly; exactly one
/// [`CloudBuilder`] must be attached before building.
#[derive(Debug, Default)]
pub struct Builder {
    /// Cluster name, also the ClusterDeployment name and the prefix of every generated name
    pub name: String,
    /// Namespace of every generated object
    pub namespace: String,
    /// Base DNS domain
    pub base_domain: String,
    /// Replica count of the default `worker` pool
    pub worker_node_count: i64,
    /// Image pull secret contents
    pub pull_secret: String,
    /// SSH private key for node access
    pub ssh_private_key: String,
    /// SSH public key installed on every node
    pub ssh_public_key: String,
    /// Labels copied onto the ClusterDeployment
    pub labels: BTreeMap<String, String>,
    /// Extra installer manifests, file name to raw contents
    pub manifests: BTreeMap<String, Vec<u8>>,
    /// Lifetime hint such as `8h`; empty for none
    pub delete_after: String,
    /// ClusterImageSet to install
    pub image_set: String,
    /// Machine network CIDR; empty for none
    pub machine_network: String,
    /// Describe an already-installed cluster instead of requesting an install
    pub adopt: bool,
    /// Infrastructure id of the adopted cluster
    pub adopt_infra_id: String,
    /// Cluster id of the adopted cluster
    pub adopt_cluster_id: String,
    /// Admin kubeconfig of the adopted cluster
    pub adopt_admin_kubeconfig: Vec<u8>,
    /// Worker instance type; the strategy default when unset
    pub worker_instance_type: Option<String>,
    /// Give up after the first failed install attempt
    pub install_once: bool,
    /// Manage DNS zones for the cluster
    pub manage_dns: bool,
    /// Serving certificate PEM for the API endpoint
    pub serving_cert: String,
    /// Private key PEM for the serving certificate
    pub serving_cert_key: String,
    /// Cluster networking
    pub networking: Networking,
    /// Worker pools beyond `worker`
    pub additional_machine_pools: Vec<AdditionalMachinePool>,
    /// Install-config emission for adopted clusters, unless the strategy overrides it
    pub install_config_policy: InstallConfigPolicy,
    /// Provider strategy
    pub cloud_builder: Option<Box<dyn CloudBuilder>>,
}

impl Builder {
    /// Create a request for the given cluster with default networking
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    /// Attach the provider strategy
    pub fn with_cloud_builder(mut self, cloud_builder: impl CloudBuilder + 'static) -> Self {
        self.cloud_builder = Some(Box::new(cloud_builder));
        self
    }

    /// The attached strategy, if any
    pub fn cloud_builder(&self) -> Option<&dyn CloudBuilder> {
        self.cloud_builder.as_deref()
    }

    fn effective_install_config_policy(&self) -> InstallConfigPolicy {
        self.cloud_builder()
            .and_then(|cloud| cloud.install_config_policy())
            .unwrap_or(self.install_config_policy)
    }

    fn serving_cert_requested(&self) -> bool {
        !self.serving_cert.is_empty() && !self.serving_cert_key.is_empty()
    }

    /// Check the request, failing on the first violation
    ///
    /// Nothing is constructed; a request that passes will build unless an
    /// internal invariant breaks.
    pub fn validate(&self) -> Result<()> {
        let cluster = self.name.as_str();
        let invalid = |field: &str, msg: String| Error::validation_for_field(cluster, field, msg);

        validate_dns_label(&self.name).map_err(|e| invalid("name", format!("cluster name {e}")))?;
        validate_dns_label(&self.namespace)
            .map_err(|e| invalid("namespace", format!("namespace {e}")))?;

        for (key, value) in &self.labels {
            validate_label_key(key).map_err(|e| invalid("labels", e))?;
            validate_label_value(value).map_err(|e| invalid("labels", e))?;
        }

        if self.base_domain.is_empty() {
            return Err(invalid("baseDomain", "base domain is required".to_string()));
        }
        validate_dns_subdomain(&self.base_domain)
            .map_err(|e| invalid("baseDomain", format!("base domain {e}")))?;

        if self.worker_node_count < 0 {
            return Err(invalid(
                "workerNodeCount",
                format!(
                    "worker node count must not be negative, got {}",
                    self.worker_node_count
                ),
            ));
        }

        if self.image_set.is_empty() {
            return Err(invalid("imageSet", "image set name is required".to_string()));
        }
        if self.pull_secret.is_empty() {
            return Err(invalid("pullSecret", "pull secret is required".to_string()));
        }
        if self.ssh_private_key.is_empty() {
            return Err(invalid(
                "sshPrivateKey",
                "SSH private key is required".to_string(),
            ));
        }

        if !self.delete_after.is_empty() {
            parse_duration(&self.delete_after).map_err(|e| invalid("deleteAfter", e))?;
        }

        let Some(cloud) = self.cloud_builder() else {
            return Err(invalid(
                "cloudBuilder",
                "a cloud platform must be configured".to_string(),
            ));
        };
        cloud.validate(cluster)?;

        for key in self.manifests.keys() {
            validate_config_map_key(key).map_err(|e| invalid("manifests", e))?;
        }

        if self.adopt {
            if self.adopt_infra_id.is_empty() {
                return Err(invalid(
                    "adopt.infraId",
                    "adopting a cluster requires its infra id".to_string(),
                ));
            }
            if self.adopt_cluster_id.is_empty() {
                return Err(invalid(
                    "adopt.clusterId",
                    "adopting a cluster requires its cluster id".to_string(),
                ));
            }
            if self.adopt_admin_kubeconfig.is_empty() {
                return Err(invalid(
                    "adopt.adminKubeconfig",
                    "adopting a cluster requires its admin kubeconfig".to_string(),
                ));
            }
        }

        if self.serving_cert.is_empty() != self.serving_cert_key.is_empty() {
            return Err(invalid(
                "servingCert",
                "serving certificate and key must be set together".to_string(),
            ));
        }

        self.networking.validate(cluster, &self.machine_network)?;

        let mut seen = vec![WORKER_POOL_NAME];
        for pool in &self.additional_machine_pools {
            validate_dns_label(&pool.name)
                .map_err(|e| invalid("additionalMachinePools.name", format!("pool name {e}")))?;
            if seen.contains(&pool.name.as_str()) {
                return Err(invalid(
                    "additionalMachinePools.name",
                    format!("duplicate machine pool {}", pool.name),
                ));
            }
            seen.push(pool.name.as_str());
            if pool.replicas < 0 {
                return Err(invalid(
                    "additionalMachinePools.replicas",
                    format!("pool {} replicas must not be negative", pool.name),
                ));
            }
            if pool.instance_type.as_deref() == Some("") {
                return Err(invalid(
                    "additionalMachinePools.instanceType",
                    format!("pool {} instance type must not be empty", pool.name),
                ));
            }
            for (key, value) in &pool.labels {
                validate_label_key(key).map_err(|e| invalid("additionalMachinePools.labels", e))?;
                validate_label_value(value)
                    .map_err(|e| invalid("additionalMachinePools.labels", e))?;
            }
        }
        if self.worker_instance_type.as_deref() == Some("") {
            return Err(invalid(
                "workerInstanceType",
                "worker instance type must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate the request and assemble every object it implies
    ///
    /// Objects are returned in apply order: secrets, install-config,
    /// manifests, ClusterDeployment, MachinePools. No partial result is
    /// returned on error.
    pub fn build(&self) -> Result<Vec<ClusterResource>> {
        self.validate()?;

        let cloud = self.cloud_builder().ok_or_else(|| {
            Error::build_for(&self.name, "no cloud platform attached after validation")
        })?;
        let names = ResourceNames::new(&self.name);
        let emit_install_config = self.effective_install_config_policy().emits(self.adopt);

        info!(
            cluster = %self.name,
            namespace = %self.namespace,
            platform = %cloud.platform_type(),
            adopt = self.adopt,
            "Building cluster resources"
        );

        let mut secrets = vec![
            self.secret(
                names.ssh_private_key(),
                SECRET_TYPE_OPAQUE,
                BTreeMap::from([(
                    SSH_PRIVATE_KEY_KEY.to_string(),
                    self.ssh_private_key.as_bytes().to_vec(),
                )]),
            ),
            self.secret(
                names.pull_secret(),
                SECRET_TYPE_DOCKER_CONFIG_JSON,
                BTreeMap::from([(
                    PULL_SECRET_KEY.to_string(),
                    self.pull_secret.as_bytes().to_vec(),
                )]),
            ),
        ];

        if self.serving_cert_requested() {
            secrets.push(self.secret(
                names.serving_cert(),
                SECRET_TYPE_TLS,
                BTreeMap::from([
                    (TLS_CERT_KEY.to_string(), self.serving_cert.as_bytes().to_vec()),
                    (TLS_KEY_KEY.to_string(), self.serving_cert_key.as_bytes().to_vec()),
                ]),
            ));
        }

        let mut platform = Platform::default();
        let mut credentials_secret = None;
        for material in cloud.credential_material() {
            if material.data.is_empty() || material.data.values().any(|v| v.is_empty()) {
                return Err(Error::build_for(
                    &self.name,
                    format!(
                        "{} strategy declared secret {} without contents",
                        cloud.platform_type(),
                        material.suffix
                    ),
                ));
            }
            let name = names.with_suffix(&material.suffix);
            credentials_secret.get_or_insert_with(|| name.clone());
            secrets.push(self.secret(name, SECRET_TYPE_OPAQUE, material.data));
        }
        let credentials_secret = credentials_secret.ok_or_else(|| {
            Error::build_for(
                &self.name,
                format!("{} strategy declared no credentials", cloud.platform_type()),
            )
        })?;
        cloud.populate_platform(&mut platform, &credentials_secret);

        let cluster_metadata = if self.adopt {
            secrets.push(self.secret(
                names.adopted_admin_kubeconfig(),
                SECRET_TYPE_OPAQUE,
                BTreeMap::from([(
                    KUBECONFIG_KEY.to_string(),
                    self.adopt_admin_kubeconfig.clone(),
                )]),
            ));
            Some(ClusterMetadata {
                cluster_id: self.adopt_cluster_id.clone(),
                infra_id: self.adopt_infra_id.clone(),
                admin_kubeconfig_secret_ref: LocalObjectReference::new(
                    names.adopted_admin_kubeconfig(),
                ),
            })
        } else {
            None
        };

        let (certificate_bundles, control_plane_config) = if self.serving_cert_requested() {
            (
                vec![CertificateBundleSpec {
                    name: SERVING_CERT_BUNDLE_NAME.to_string(),
                    generate: false,
                    certificate_secret_ref: LocalObjectReference::new(names.serving_cert()),
                }],
                Some(ControlPlaneConfigSpec {
                    serving_certificates: ControlPlaneServingCertificateSpec {
                        default: SERVING_CERT_BUNDLE_NAME.to_string(),
                    },
                }),
            )
        } else {
            (Vec::new(), None)
        };

        let mut deployment = ClusterDeployment::new(
            &self.name,
            ClusterDeploymentSpec {
                cluster_name: self.name.clone(),
                base_domain: self.base_domain.clone(),
                platform,
                pull_secret_ref: Some(LocalObjectReference::new(names.pull_secret())),
                manage_dns: self.manage_dns,
                installed: self.adopt,
                cluster_metadata,
                provisioning: Some(Provisioning {
                    image_set_ref: Some(ClusterImageSetReference {
                        name: self.image_set.clone(),
                    }),
                    install_config_secret_ref: emit_install_config
                        .then(|| LocalObjectReference::new(names.install_config())),
                    ssh_private_key_secret_ref: Some(LocalObjectReference::new(
                        names.ssh_private_key(),
                    )),
                    manifests_config_map_ref: Some(LocalObjectReference::new(names.manifests())),
                }),
                certificate_bundles,
                control_plane_config,
            },
        );
        deployment.metadata.namespace = Some(self.namespace.clone());
        deployment.metadata.labels = (!self.labels.is_empty()).then(|| self.labels.clone());
        let annotations = self.annotations();
        deployment.metadata.annotations = (!annotations.is_empty()).then_some(annotations);

        let pools = self.machine_pools(cloud, names);

        let install_config = if emit_install_config {
            let control_plane_platform =
                cloud.machine_pool_platform(&cloud.default_instance_type());
            let config = generate_install_config(InstallConfigInput {
                deployment: &deployment,
                pools: &pools,
                control_plane_platform: &control_plane_platform,
                networking: &self.networking,
                machine_network: &self.machine_network,
                ssh_key: &self.ssh_public_key,
                pull_secret: &self.pull_secret,
            })?;
            Some(self.secret(
                names.install_config(),
                SECRET_TYPE_OPAQUE,
                BTreeMap::from([(INSTALL_CONFIG_KEY.to_string(), config.to_yaml()?.into_bytes())]),
            ))
        } else {
            debug!(cluster = %self.name, "Skipping install-config for adopted cluster");
            None
        };

        let mut resources: Vec<ClusterResource> = secrets.into_iter().map(Into::into).collect();
        resources.extend(install_config.map(ClusterResource::from));
        resources.push(self.manifests_config_map(names).into());
        resources.push(deployment.into());
        resources.extend(pools.into_iter().map(ClusterResource::from));

        verify_references(&resources).map_err(|e| e.with_cluster(&self.name))?;

        for resource in &resources {
            debug!(
                cluster = %self.name,
                kind = resource.kind(),
                name = %resource.name(),
                "Generated object"
            );
        }
        info!(
            cluster = %self.name,
            objects = resources.len(),
            "Built cluster resources"
        );

        Ok(resources)
    }

    fn annotations(&self) -> BTreeMap<String, String> {
        let mut annotations = BTreeMap::new();
        if !self.delete_after.is_empty() {
            annotations.insert(DELETE_AFTER_ANNOTATION.to_string(), self.delete_after.clone());
        }
        if self.install_once {
            annotations.insert(TRY_INSTALL_ONCE_ANNOTATION.to_string(), "true".to_string());
        }
        annotations
    }

    fn machine_pools(
        &self,
        cloud: &dyn CloudBuilder,
        names: ResourceNames<'_>,
    ) -> Vec<MachinePool> {
        let worker_type = self
            .worker_instance_type
            .clone()
            .unwrap_or_else(|| cloud.default_instance_type());

        let worker = self.machine_pool(
            cloud,
            names,
            WORKER_POOL_NAME,
            self.worker_node_count,
            &worker_type,
            BTreeMap::new(),
        );
        let additional = self.additional_machine_pools.iter().map(|pool| {
            let instance_type = pool.instance_type.as_deref().unwrap_or(&worker_type);
            self.machine_pool(
                cloud,
                names,
                &pool.name,
                pool.replicas,
                instance_type,
                pool.labels.clone(),
            )
        });

        std::iter::once(worker).chain(additional).collect()
    }

    fn machine_pool(
        &self,
        cloud: &dyn CloudBuilder,
        names: ResourceNames<'_>,
        pool: &str,
        replicas: i64,
        instance_type: &str,
        labels: BTreeMap<String, String>,
    ) -> MachinePool {
        let mut machine_pool = MachinePool::new(
            &names.machine_pool(pool),
            MachinePoolSpec {
                cluster_deployment_ref: LocalObjectReference::new(names.cluster()),
                name: pool.to_string(),
                replicas: Some(replicas),
                platform: cloud.machine_pool_platform(instance_type),
                labels,
            },
        );
        machine_pool.metadata.namespace = Some(self.namespace.clone());
        machine_pool
    }

    fn manifests_config_map(&self, names: ResourceNames<'_>) -> ConfigMap {
        let mut data = BTreeMap::new();
        let mut binary_data = BTreeMap::new();
        for (key, contents) in &self.manifests {
            match std::str::from_utf8(contents) {
                Ok(text) => {
                    data.insert(key.clone(), text.to_string());
                }
                Err(_) => {
                    binary_data.insert(key.clone(), ByteString(contents.clone()));
                }
            }
        }

        ConfigMap {
            metadata: self.object_meta(names.manifests()),
            data: Some(data),
            binary_data: (!binary_data.is_empty()).then_some(binary_data),
            ..Default::default()
        }
    }

    fn secret(&self, name: String, type_: &str, data: BTreeMap<String, Vec<u8>>) -> Secret {
        Secret {
            metadata: self.object_meta(name),
            type_: Some(type_.to_string()),
            data: Some(
                data.into_iter()
                    .map(|(key, value)| (key, ByteString(value)))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    fn object_meta(&self, name: String) -> ObjectMeta {
        ObjectMeta {
            name: Some(name),
            namespace: Some(self.namespace.clone()),
            ..Default::default()
        }
    }
}

/// Config map keys: non-empty, at most 253 characters of `[-._a-zA-Z0-9]`
fn validate_config_map_key(key: &str) -> std::result::Result<(), String> {
    if key.is_empty() {
        return Err("manifest name must not be empty".to_string());
    }
    if key.len() > MAX_CONFIG_MAP_KEY_LEN {
        return Err(format!(
            "manifest name must be no more than {MAX_CONFIG_MAP_KEY_LEN} characters: {key}"
        ));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(format!(
            "manifest name must consist of alphanumerics, '-', '_' or '.': {key}"
        ));
    }
    if key == "." || key == ".." {
        return Err(format!("manifest name must not be {key}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{AwsCloudBuilder, CredentialMaterial, GcpCloudBuilder};
    use crate::resource::{find_cluster_deployment, find_secret};
    use hive_common::crd::{MachinePoolPlatform, PlatformType};
    use kube::ResourceExt;
    use rstest::rstest;

    fn valid_builder() -> Builder {
        Builder {
            base_domain: "example.com".to_string(),
            worker_node_count: 3,
            pull_secret: "fakepullsecret".to_string(),
            ssh_private_key: "fakeprivatekey".to_string(),
            ssh_public_key: "fakepublickey".to_string(),
            image_set: "fake-image-set".to_string(),
            ..Builder::new("mycluster", "mynamespace")
        }
        .with_cloud_builder(AwsCloudBuilder::new("fakeaccesskeyid", "fakesecretAccessKey"))
    }

    #[test]
    fn valid_request_passes() {
        assert!(valid_builder().validate().is_ok());
    }

    #[rstest]
    #[case::empty_name(|b: &mut Builder| b.name.clear(), "name")]
    #[case::bad_name(|b: &mut Builder| b.name = "My_Cluster".to_string(), "name")]
    #[case::empty_namespace(|b: &mut Builder| b.namespace.clear(), "namespace")]
    #[case::bad_namespace(|b: &mut Builder| b.namespace = "My_NS".to_string(), "namespace")]
    #[case::bad_label(|b: &mut Builder| { b.labels.insert("bad key".to_string(), "v".to_string()); }, "labels")]
    #[case::no_base_domain(|b: &mut Builder| b.base_domain.clear(), "baseDomain")]
    #[case::negative_workers(|b: &mut Builder| b.worker_node_count = -1, "workerNodeCount")]
    #[case::no_image_set(|b: &mut Builder| b.image_set.clear(), "imageSet")]
    #[case::no_pull_secret(|b: &mut Builder| b.pull_secret.clear(), "pullSecret")]
    #[case::no_ssh_key(|b: &mut Builder| b.ssh_private_key.clear(), "sshPrivateKey")]
    #[case::bad_delete_after(|b: &mut Builder| b.delete_after = "8 hours".to_string(), "deleteAfter")]
    #[case::no_cloud(|b: &mut Builder| b.cloud_builder = None, "cloudBuilder")]
    #[case::empty_aws_key(|b: &mut Builder| b.cloud_builder = Some(Box::new(AwsCloudBuilder::new("", "s"))), "aws.accessKeyId")]
    #[case::bad_manifest_name(|b: &mut Builder| { b.manifests.insert("dir/my.yaml".to_string(), b"x".to_vec()); }, "manifests")]
    #[case::adopt_without_infra_id(|b: &mut Builder| { b.adopt = true; b.adopt_cluster_id = "c".to_string(); b.adopt_admin_kubeconfig = b"k".to_vec(); }, "adopt.infraId")]
    #[case::adopt_without_cluster_id(|b: &mut Builder| { b.adopt = true; b.adopt_infra_id = "i".to_string(); b.adopt_admin_kubeconfig = b"k".to_vec(); }, "adopt.clusterId")]
    #[case::adopt_without_kubeconfig(|b: &mut Builder| { b.adopt = true; b.adopt_infra_id = "i".to_string(); b.adopt_cluster_id = "c".to_string(); }, "adopt.adminKubeconfig")]
    #[case::half_serving_cert(|b: &mut Builder| b.serving_cert = "cert".to_string(), "servingCert")]
    #[case::unknown_network(|b: &mut Builder| b.networking.network_type = "Calico".to_string(), "networking.networkType")]
    #[case::bad_machine_network(|b: &mut Builder| b.machine_network = "10.0.0.0/40".to_string(), "networking.machineNetwork")]
    #[case::pool_named_worker(|b: &mut Builder| b.additional_machine_pools.push(AdditionalMachinePool { name: "worker".to_string(), replicas: 1, ..Default::default() }), "additionalMachinePools.name")]
    #[case::negative_pool(|b: &mut Builder| b.additional_machine_pools.push(AdditionalMachinePool { name: "infra".to_string(), replicas: -2, ..Default::default() }), "additionalMachinePools.replicas")]
    #[case::empty_instance_type(|b: &mut Builder| b.worker_instance_type = Some(String::new()), "workerInstanceType")]
    fn rejects_invalid_requests(#[case] mutate: fn(&mut Builder), #[case] field: &str) {
        let mut builder = valid_builder();
        mutate(&mut builder);

        let err = builder.validate().unwrap_err();
        assert!(err.is_validation(), "expected validation error, got {err}");
        assert_eq!(err.field(), Some(field), "unexpected error: {err}");

        let err = builder.build().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn adopt_fields_are_ignored_without_adopt_flag() {
        let mut builder = valid_builder();
        builder.adopt_infra_id = "leftover".to_string();
        assert!(builder.validate().is_ok());

        let resources = builder.build().unwrap();
        let cd = find_cluster_deployment(&resources, "mycluster").unwrap();
        assert!(!cd.spec.installed);
        assert!(cd.spec.cluster_metadata.is_none());
    }

    #[test]
    fn annotations_follow_request() {
        let mut builder = valid_builder();
        builder.delete_after = "8h".to_string();
        builder.install_once = true;
        let resources = builder.build().unwrap();
        let cd = find_cluster_deployment(&resources, "mycluster").unwrap();
        assert_eq!(
            cd.annotations().get(DELETE_AFTER_ANNOTATION).map(String::as_str),
            Some("8h")
        );
        assert_eq!(
            cd.annotations().get(TRY_INSTALL_ONCE_ANNOTATION).map(String::as_str),
            Some("true")
        );

        let resources = valid_builder().build().unwrap();
        let cd = find_cluster_deployment(&resources, "mycluster").unwrap();
        assert!(cd.metadata.annotations.is_none());
    }

    #[test]
    fn secrets_have_typed_payloads() {
        let resources = valid_builder().build().unwrap();

        let pull = find_secret(&resources, "mycluster-pull-secret").unwrap();
        assert_eq!(pull.type_.as_deref(), Some(SECRET_TYPE_DOCKER_CONFIG_JSON));
        assert_eq!(
            pull.data.as_ref().unwrap()[PULL_SECRET_KEY],
            ByteString(b"fakepullsecret".to_vec())
        );

        let ssh = find_secret(&resources, "mycluster-ssh-private-key").unwrap();
        assert_eq!(ssh.type_.as_deref(), Some(SECRET_TYPE_OPAQUE));
        assert_eq!(
            ssh.data.as_ref().unwrap()[SSH_PRIVATE_KEY_KEY],
            ByteString(b"fakeprivatekey".to_vec())
        );
    }

    #[test]
    fn objects_come_out_in_apply_order() {
        let resources = valid_builder().build().unwrap();
        let kinds: Vec<_> = resources.iter().map(ClusterResource::kind).collect();
        assert_eq!(
            kinds,
            vec![
                "Secret",
                "Secret",
                "Secret",
                "Secret",
                "ConfigMap",
                "ClusterDeployment",
                "MachinePool"
            ]
        );
        assert_eq!(resources[0].name(), "mycluster-ssh-private-key");
        assert_eq!(resources[3].name(), "mycluster-install-config");
        assert!(resources
            .iter()
            .all(|r| r.namespace().as_deref() == Some("mynamespace")));
    }

    #[test]
    fn serving_cert_is_wired_as_default_bundle() {
        let mut builder = valid_builder();
        builder.serving_cert = "CERT".to_string();
        builder.serving_cert_key = "KEY".to_string();
        let resources = builder.build().unwrap();

        let secret = find_secret(&resources, "mycluster-serving-cert").unwrap();
        assert_eq!(secret.type_.as_deref(), Some(SECRET_TYPE_TLS));
        let data = secret.data.as_ref().unwrap();
        assert_eq!(data[TLS_CERT_KEY], ByteString(b"CERT".to_vec()));
        assert_eq!(data[TLS_KEY_KEY], ByteString(b"KEY".to_vec()));

        let cd = find_cluster_deployment(&resources, "mycluster").unwrap();
        assert_eq!(cd.spec.certificate_bundles.len(), 1);
        assert_eq!(
            cd.spec.certificate_bundles[0].certificate_secret_ref.name,
            "mycluster-serving-cert"
        );
        assert_eq!(
            cd.spec
                .control_plane_config
                .as_ref()
                .unwrap()
                .serving_certificates
                .default,
            SERVING_CERT_BUNDLE_NAME
        );
    }

    #[test]
    fn binary_manifests_go_to_binary_data() {
        let mut builder = valid_builder();
        builder
            .manifests
            .insert("blob.bin".to_string(), vec![0xff, 0xfe, 0x00]);
        builder
            .manifests
            .insert("my.yaml".to_string(), b"fakemanifest".to_vec());
        let resources = builder.build().unwrap();

        let cm = crate::resource::find_config_map(&resources, "mycluster-manifests").unwrap();
        assert_eq!(cm.data.as_ref().unwrap()["my.yaml"], "fakemanifest");
        assert_eq!(
            cm.binary_data.as_ref().unwrap()["blob.bin"],
            ByteString(vec![0xff, 0xfe, 0x00])
        );
        assert_eq!(crate::resource::config_map_entries(cm), builder.manifests);
    }

    #[derive(Debug)]
    struct EmptyCredentials;

    impl CloudBuilder for EmptyCredentials {
        fn platform_type(&self) -> PlatformType {
            PlatformType::Gcp
        }
        fn validate(&self, _cluster: &str) -> Result<()> {
            Ok(())
        }
        fn credential_material(&self) -> Vec<CredentialMaterial> {
            vec![CredentialMaterial::for_platform(PlatformType::Gcp)]
        }
        fn populate_platform(&self, platform: &mut Platform, secret: &str) {
            GcpCloudBuilder::new("sa", "p").populate_platform(platform, secret);
        }
        fn machine_pool_platform(&self, _instance_type: &str) -> MachinePoolPlatform {
            MachinePoolPlatform::default()
        }
        fn default_instance_type(&self) -> String {
            "n1-standard-4".to_string()
        }
    }

    #[test]
    fn empty_credential_material_is_build_error() {
        let mut builder = valid_builder();
        builder.cloud_builder = Some(Box::new(EmptyCredentials));
        assert!(builder.validate().is_ok());

        let err = builder.build().unwrap_err();
        assert!(err.is_build());
        assert_eq!(err.cluster(), Some("mycluster"));
        assert!(err.to_string().contains("gcp-creds"));
    }

    #[derive(Debug)]
    struct SkipOnAdopt(AwsCloudBuilder);

    impl CloudBuilder for SkipOnAdopt {
        fn platform_type(&self) -> PlatformType {
            self.0.platform_type()
        }
        fn validate(&self, cluster: &str) -> Result<()> {
            self.0.validate(cluster)
        }
        fn credential_material(&self) -> Vec<CredentialMaterial> {
            self.0.credential_material()
        }
        fn populate_platform(&self, platform: &mut Platform, secret: &str) {
            self.0.populate_platform(platform, secret)
        }
        fn machine_pool_platform(&self, instance_type: &str) -> MachinePoolPlatform {
            self.0.machine_pool_platform(instance_type)
        }
        fn default_instance_type(&self) -> String {
            self.0.default_instance_type()
        }
        fn install_config_policy(&self) -> Option<InstallConfigPolicy> {
            Some(InstallConfigPolicy::SkipWhenAdopted)
        }
    }

    #[test]
    fn strategy_policy_overrides_request_policy() {
        let mut builder = valid_builder();
        builder.cloud_builder = Some(Box::new(SkipOnAdopt(AwsCloudBuilder::new("id", "secret"))));
        builder.install_config_policy = InstallConfigPolicy::Always;
        builder.adopt = true;
        builder.adopt_infra_id = "adopted-infra-id".to_string();
        builder.adopt_cluster_id = "adopted-cluster-id".to_string();
        builder.adopt_admin_kubeconfig = b"adopted-admin-kubeconfig".to_vec();

        let resources = builder.build().unwrap();
        assert!(find_secret(&resources, "mycluster-install-config").is_none());
        let cd = find_cluster_deployment(&resources, "mycluster").unwrap();
        assert!(cd
            .spec
            .provisioning
            .as_ref()
            .unwrap()
            .install_config_secret_ref
            .is_none());
    }

    #[test]
    fn builder_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Builder>();
    }

    #[test]
    fn config_map_keys_are_checked() {
        assert!(validate_config_map_key("my.yaml").is_ok());
        assert!(validate_config_map_key("99_openshift-custom.yaml").is_ok());
        assert!(validate_config_map_key("").is_err());
        assert!(validate_config_map_key("..").is_err());
        assert!(validate_config_map_key("a b").is_err());
    }
}
