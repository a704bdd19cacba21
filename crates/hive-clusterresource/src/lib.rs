//! Cluster resource assembly crate
//!
//! This crate provides:
//! - [`Builder`], which turns one cluster request into the full set of
//!   provisioning objects with every cross-reference wired
//! - the [`CloudBuilder`] trait and its AWS, Azure, GCP and OpenStack strategies
//! - the ClusterDeployment to installer configuration translation
//! - YAML request documents loadable into a [`Builder`]

#![deny(missing_docs)]

pub mod builder;
pub mod cloud;
pub mod config;
pub mod install_config;
pub mod naming;
pub mod resource;

pub use builder::{AdditionalMachinePool, Builder};

pub use cloud::{
    AwsCloudBuilder, AzureCloudBuilder, CloudBuilder, CredentialMaterial, GcpCloudBuilder,
    InstallConfigPolicy, OpenStackCloudBuilder,
};

pub use config::ClusterRequestConfig;

pub use install_config::{generate_install_config, InstallConfig, NetworkType, Networking};

pub use naming::ResourceNames;

pub use resource::{to_yaml_stream, verify_references, ClusterResource};

pub use hive_common::{Error, Result};
