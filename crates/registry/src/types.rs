//! Framework and model descriptors
//!
//! Descriptors are the immutable metadata records that framework and model
//! plugins register at startup. They deserialize from the YAML manifests
//! described in [`crate::manifest`].

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::error::{RegistryError, Result};
use crate::naming;
use crate::version::{Version, VersionRequirement};

/// Accepts unquoted YAML versions such as `version: 1.0`, which would
/// otherwise arrive as numbers. Quote versions like `1.10` to keep the
/// trailing zero.
fn version_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Integer(u64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(n) => format!("{:?}", n),
    })
}

/// Container images for one hardware kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerHardware {
    /// Image used on CPU-only hosts
    #[serde(default)]
    pub cpu: String,
    /// Image used on GPU hosts
    #[serde(default)]
    pub gpu: String,
}

/// A framework that can run models, e.g. `TensorRT 5.1.5`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkDescriptor {
    /// Framework name, case-insensitive
    pub name: String,
    /// Semantic version or `latest`; empty means `latest`
    #[serde(default, deserialize_with = "version_string")]
    pub version: String,
    /// Container images keyed by hardware kind (e.g. `amd64`, `ppc64le`)
    #[serde(default, rename = "container")]
    pub container_info: BTreeMap<String, ContainerHardware>,
}

impl FrameworkDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            container_info: BTreeMap::new(),
        }
    }

    pub fn with_container(mut self, kind: impl Into<String>, hardware: ContainerHardware) -> Self {
        self.container_info.insert(kind.into(), hardware);
        self
    }

    pub fn canonical_name(&self) -> Result<String> {
        naming::canonical_name(&self.name, &self.version)
    }

    pub fn parsed_version(&self) -> Result<Version> {
        Version::parse(naming::version_or_latest(&self.version))
    }
}

/// The framework family and version range a model needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkRequirement {
    /// Framework name; empty matches any framework family
    #[serde(default)]
    pub name: String,
    /// Version constraint such as `>=1.0.0 <2.0.0`, or `latest`
    #[serde(default, deserialize_with = "version_string")]
    pub version: String,
}

impl FrameworkRequirement {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    pub fn requirement(&self) -> Result<VersionRequirement> {
        VersionRequirement::parse(&self.version)
    }

    /// Whether `framework` belongs to the required family.
    pub fn accepts_family(&self, framework: &FrameworkDescriptor) -> bool {
        self.name.is_empty() || self.name.eq_ignore_ascii_case(&framework.name)
    }
}

/// Shape of a model input or output. Not interpreted by the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IoSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

/// A model and the framework range it runs on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    /// Semantic version or `latest`; empty means `latest`
    #[serde(default, deserialize_with = "version_string")]
    pub version: String,
    pub framework: FrameworkRequirement,
    #[serde(default)]
    pub container: BTreeMap<String, ContainerHardware>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub inputs: Vec<IoSpec>,
    #[serde(default)]
    pub output: Option<IoSpec>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Hidden models are registered but left out of default listings
    #[serde(default)]
    pub hidden: bool,
}

impl ModelDescriptor {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        framework: FrameworkRequirement,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            framework,
            ..Default::default()
        }
    }

    /// Check the descriptor before registration.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::EmptyName`] when the name is empty
    /// - [`RegistryError::InvalidVersion`] when the version is neither
    ///   `latest` nor a semantic version
    /// - [`RegistryError::InvalidConstraint`] when the framework requirement
    ///   cannot be parsed
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(RegistryError::EmptyName { kind: "model" });
        }
        self.parsed_version()?;
        self.framework.requirement()?;
        Ok(())
    }

    pub fn parsed_version(&self) -> Result<Version> {
        Version::parse(naming::version_or_latest(&self.version))
    }

    pub fn framework_requirement(&self) -> Result<VersionRequirement> {
        self.framework.requirement()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(version: &str) -> ModelDescriptor {
        ModelDescriptor::new("ResNet50", version, FrameworkRequirement::new("TensorRT", ">=5.0.0"))
    }

    #[test]
    fn test_validate_accepts_latest_and_semver() {
        assert!(model("latest").validate().is_ok());
        assert!(model("1.2.3").validate().is_ok());
        assert!(model("").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_malformed_version() {
        let err = model("not-a-version").validate().unwrap_err();
        assert!(matches!(err, RegistryError::InvalidVersion { .. }));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut descriptor = model("1.0.0");
        descriptor.name.clear();
        assert_eq!(
            descriptor.validate(),
            Err(RegistryError::EmptyName { kind: "model" })
        );
    }

    #[test]
    fn test_validate_rejects_bad_requirement() {
        let mut descriptor = model("1.0.0");
        descriptor.framework.version = ">= >=".to_string();
        assert!(matches!(
            descriptor.validate(),
            Err(RegistryError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn test_framework_family_match() {
        let requirement = FrameworkRequirement::new("TensorRT", "latest");
        assert!(requirement.accepts_family(&FrameworkDescriptor::new("tensorrt", "5.0.0")));
        assert!(!requirement.accepts_family(&FrameworkDescriptor::new("onnx", "1.0.0")));
        assert!(FrameworkRequirement::default()
            .accepts_family(&FrameworkDescriptor::new("onnx", "1.0.0")));
    }

    #[test]
    fn test_framework_defaults_to_latest() {
        let framework = FrameworkDescriptor::new("TensorRT", "");
        assert_eq!(framework.canonical_name().unwrap(), "tensorrt:latest");
        assert_eq!(framework.parsed_version().unwrap(), Version::Latest);
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let yaml = r#"
name: TensorRT
version: 5.1.5
container:
  amd64:
    gpu: raiproject/carml-tensorrt:amd64-gpu
"#;
        let framework: FrameworkDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(framework.canonical_name().unwrap(), "tensorrt:5.1.5");
        assert_eq!(
            framework.container_info["amd64"].gpu,
            "raiproject/carml-tensorrt:amd64-gpu"
        );
        assert!(framework.container_info["amd64"].cpu.is_empty());
    }

    #[test]
    fn test_unquoted_numeric_versions() {
        let yaml = r#"
name: AlexNet
version: 1.0
framework:
  name: TensorRT
  version: 5
"#;
        let model: ModelDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(model.version, "1.0");
        assert_eq!(model.framework.version, "5");
        assert!(model.validate().is_ok());
    }
}
