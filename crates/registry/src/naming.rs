//! Canonical names for frameworks and models
//!
//! A framework is addressed as `name:version` and a model as
//! `<framework canonical name>/name:version`. Both are used as registry keys
//! and, after path sanitization by the caller, as work directory names.

use crate::error::{RegistryError, Result};

/// Version used when a descriptor leaves its version empty.
pub const LATEST: &str = "latest";

/// Returns `version`, or [`LATEST`] when it is empty.
pub fn version_or_latest(version: &str) -> &str {
    if version.is_empty() {
        LATEST
    } else {
        version
    }
}

/// Canonical `name:version` key for a framework. Always lowercase.
pub fn canonical_name(name: &str, version: &str) -> Result<String> {
    if name.is_empty() {
        return Err(RegistryError::EmptyName { kind: "framework" });
    }
    Ok(format!("{}:{}", name, version_or_latest(version)).to_lowercase())
}

/// Canonical key for a model registered against the framework named
/// `framework_canonical_name`. Always lowercase, like framework names, so
/// versions differing only in case share one key.
pub fn model_canonical_name(
    framework_canonical_name: &str,
    model_name: &str,
    model_version: &str,
) -> Result<String> {
    if framework_canonical_name.is_empty() {
        return Err(RegistryError::EmptyName { kind: "framework" });
    }
    if model_name.is_empty() {
        return Err(RegistryError::EmptyName { kind: "model" });
    }
    Ok(format!(
        "{}/{}:{}",
        framework_canonical_name,
        model_name,
        version_or_latest(model_version)
    )
    .to_lowercase())
}

/// Splits a canonical model name into its framework prefix and the
/// `name:version` remainder.
pub fn split_model_canonical_name(canonical_name: &str) -> Option<(&str, &str)> {
    canonical_name
        .split_once('/')
        .filter(|(framework, model)| !framework.is_empty() && !model.is_empty())
}
