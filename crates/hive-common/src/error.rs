//! Error types for cluster resource assembly
//!
//! Errors carry the cluster name and, where known, the offending field path
//! so a caller can report exactly which part of a request needs fixing.

use thiserror::Error;

/// Default context value when no specific cluster is known
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for request validation and object assembly
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The request is structurally or semantically invalid
    ///
    /// Always detected before any object is constructed; safe to retry once
    /// the caller fixes the request.
    #[error("validation error for {cluster}: {message}")]
    Validation {
        /// Name of the cluster with invalid configuration
        cluster: String,
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "adopt.clusterId")
        field: Option<String>,
    },

    /// An internal invariant could not be satisfied while assembling objects
    #[error("build error for {cluster}: {message}")]
    Build {
        /// Name of the cluster being assembled
        cluster: String,
        /// Description of what failed
        message: String,
    },

    /// A generated payload could not be encoded
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },
}

impl Error {
    /// Create a validation error with the given message
    ///
    /// For simple validation errors without cluster context.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            cluster: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with cluster context
    pub fn validation_for(cluster: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation {
            cluster: cluster.into(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with cluster context and field path
    pub fn validation_for_field(
        cluster: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            cluster: cluster.into(),
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a build error with the given message
    pub fn build(msg: impl Into<String>) -> Self {
        Self::Build {
            cluster: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
        }
    }

    /// Create a build error with cluster context
    pub fn build_for(cluster: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Build {
            cluster: cluster.into(),
            message: msg.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Attach a cluster name to an error created without one
    ///
    /// Errors that already name a cluster are returned unchanged.
    pub fn with_cluster(self, name: &str) -> Self {
        match self {
            Self::Validation {
                cluster,
                message,
                field,
            } if cluster == UNKNOWN_CONTEXT => Self::Validation {
                cluster: name.to_string(),
                message,
                field,
            },
            Self::Build { cluster, message } if cluster == UNKNOWN_CONTEXT => Self::Build {
                cluster: name.to_string(),
                message,
            },
            other => other,
        }
    }

    /// Returns true for errors raised by request validation
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns true for errors raised while assembling objects
    ///
    /// Serialization failures happen mid-build, so they count as build errors.
    pub fn is_build(&self) -> bool {
        matches!(self, Self::Build { .. } | Self::Serialization { .. })
    }

    /// Get the cluster name if this error is associated with a specific cluster
    pub fn cluster(&self) -> Option<&str> {
        match self {
            Self::Validation { cluster, .. } | Self::Build { cluster, .. } => {
                if cluster == UNKNOWN_CONTEXT {
                    None
                } else {
                    Some(cluster)
                }
            }
            Self::Serialization { .. } => None,
        }
    }

    /// Get the invalid field path, if validation recorded one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}
