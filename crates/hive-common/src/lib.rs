//! Common types for the cluster resource builder: CRDs, errors, and validation helpers

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod validation;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// API group shared by every Hive custom resource
pub const HIVE_API_GROUP: &str = "hive.openshift.io";

/// Annotation carrying the "delete after" lifetime hint (e.g. "8h")
pub const DELETE_AFTER_ANNOTATION: &str = "hive.openshift.io/delete-after";

/// Annotation asking the installer to give up after the first failed attempt
pub const TRY_INSTALL_ONCE_ANNOTATION: &str = "hive.openshift.io/try-install-once";
