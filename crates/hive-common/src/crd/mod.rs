//! Custom Resource Definitions produced by the cluster resource builder
//!
//! The builder emits two Hive kinds ([`ClusterDeployment`] and
//! [`MachinePool`]) alongside core `Secret` and `ConfigMap` objects.

mod cluster_deployment;
mod machine_pool;
mod platforms;
mod types;

pub use cluster_deployment::{
    CertificateBundleSpec, ClusterDeployment, ClusterDeploymentSpec, ClusterMetadata,
    ControlPlaneConfigSpec, ControlPlaneServingCertificateSpec, Platform, Provisioning,
};
pub use machine_pool::{MachinePool, MachinePoolPlatform, MachinePoolSpec};
pub use platforms::{aws, azure, gcp, openstack};
pub use types::{ClusterImageSetReference, LocalObjectReference, PlatformType};
