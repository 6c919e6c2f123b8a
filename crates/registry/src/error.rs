//! Error types for the manifest registry

use thiserror::Error;

/// Errors raised while naming, validating, registering or resolving
/// framework and model descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{kind} name must not be empty")]
    EmptyName { kind: &'static str },

    #[error("Version '{version}' is not in semantic version format: {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("Invalid version constraint '{constraint}': {reason}")]
    InvalidConstraint { constraint: String, reason: String },

    #[error("'{name}' has already been registered")]
    DuplicateName { name: String },

    #[error("'{name}' not found in registry")]
    NotFound { name: String },

    #[error("No framework has been registered")]
    NoFrameworkRegistered,

    #[error("No registered framework satisfies '{requirement}' required by model '{model}'")]
    NoCompatibleFramework { model: String, requirement: String },
}

impl RegistryError {
    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }
}

/// Result alias used throughout the registry crate.
pub type Result<T> = std::result::Result<T, RegistryError>;
