//! Provider-specific blocks of the ClusterDeployment and MachinePool specs.
//!
//! Each module holds the platform block for the ClusterDeployment and the
//! machine platform for its MachinePools:
//! - AWS
//! - Azure
//! - GCP
//! - OpenStack

pub mod aws;
pub mod azure;
pub mod gcp;
pub mod openstack;
