//! Deterministic names for every object a build produces
//!
//! Names are the cluster name plus a fixed suffix. Anything that looks
//! objects up by name depends on this table, so the suffixes must not change.

use hive_common::crd::PlatformType;

/// Suffix of the secret holding `install-config.yaml`
pub const INSTALL_CONFIG_SUFFIX: &str = "install-config";
/// Suffix of the secret holding the image pull secret
pub const PULL_SECRET_SUFFIX: &str = "pull-secret";
/// Suffix of the secret holding the SSH private key
pub const SSH_PRIVATE_KEY_SUFFIX: &str = "ssh-private-key";
/// Suffix of the config map holding extra installer manifests
pub const MANIFESTS_SUFFIX: &str = "manifests";
/// Suffix of the secret holding an adopted cluster's admin kubeconfig
pub const ADOPTED_ADMIN_KUBECONFIG_SUFFIX: &str = "adopted-admin-kubeconfig";
/// Suffix of the TLS secret holding the API serving certificate
pub const SERVING_CERT_SUFFIX: &str = "serving-cert";
/// Pool name of the default worker pool
pub const WORKER_POOL_NAME: &str = "worker";
/// Certificate bundle name used for the serving certificate
pub const SERVING_CERT_BUNDLE_NAME: &str = "serving-cert";

/// Suffix of the credentials secret for a platform (e.g., "aws-creds")
pub fn credentials_suffix(platform: PlatformType) -> String {
    format!("{platform}-creds")
}

/// Name allocator bound to one cluster
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceNames<'a> {
    cluster: &'a str,
}

impl<'a> ResourceNames<'a> {
    /// Create an allocator for the given cluster
    pub fn new(cluster: &'a str) -> Self {
        Self { cluster }
    }

    /// The cluster name itself (ClusterDeployment name)
    pub fn cluster(&self) -> &'a str {
        self.cluster
    }

    /// `<cluster>-<suffix>`
    pub fn with_suffix(&self, suffix: &str) -> String {
        format!("{}-{}", self.cluster, suffix)
    }

    /// `<cluster>-install-config`
    pub fn install_config(&self) -> String {
        self.with_suffix(INSTALL_CONFIG_SUFFIX)
    }

    /// `<cluster>-pull-secret`
    pub fn pull_secret(&self) -> String {
        self.with_suffix(PULL_SECRET_SUFFIX)
    }

    /// `<cluster>-ssh-private-key`
    pub fn ssh_private_key(&self) -> String {
        self.with_suffix(SSH_PRIVATE_KEY_SUFFIX)
    }

    /// `<cluster>-manifests`
    pub fn manifests(&self) -> String {
        self.with_suffix(MANIFESTS_SUFFIX)
    }

    /// `<cluster>-adopted-admin-kubeconfig`
    pub fn adopted_admin_kubeconfig(&self) -> String {
        self.with_suffix(ADOPTED_ADMIN_KUBECONFIG_SUFFIX)
    }

    /// `<cluster>-serving-cert`
    pub fn serving_cert(&self) -> String {
        self.with_suffix(SERVING_CERT_SUFFIX)
    }

    /// `<cluster>-<platform>-creds`
    pub fn credentials(&self, platform: PlatformType) -> String {
        self.with_suffix(&credentials_suffix(platform))
    }

    /// `<cluster>-<pool>` (e.g., `<cluster>-worker`)
    pub fn machine_pool(&self, pool: &str) -> String {
        self.with_suffix(pool)
    }
}
