//! YAML manifests declaring frameworks and models
//!
//! A manifest file lists the frameworks and models a plugin provides:
//!
//! ```yaml
//! frameworks:
//!   - name: TensorRT
//!     version: 5.1.5
//!     container:
//!       amd64:
//!         gpu: carml/tensorrt:amd64-gpu-latest
//! models:
//!   - name: ResNet50
//!     version: "1.0"
//!     framework:
//!       name: TensorRT
//!       version: ">=5.0.0 <6.0.0"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::RegistryError;
use crate::registry::ManifestRegistry;
use crate::types::{FrameworkDescriptor, ModelDescriptor};

/// Errors reading manifest files
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {origin}: {message}")]
    Parse { origin: String, message: String },
}

/// Frameworks and models declared together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestBundle {
    #[serde(default)]
    pub frameworks: Vec<FrameworkDescriptor>,
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

/// Outcome of registering a bundle. Failures do not stop the remaining
/// entries from being registered.
#[derive(Debug, Default)]
pub struct RegistrationReport {
    pub frameworks: Vec<String>,
    pub models: Vec<String>,
    pub failures: Vec<RegistrationFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationFailure {
    /// `framework <name>` or `model <name>`
    pub entry: String,
    pub error: RegistryError,
}

impl RegistrationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: RegistrationReport) {
        self.frameworks.extend(other.frameworks);
        self.models.extend(other.models);
        self.failures.extend(other.failures);
    }
}

impl ManifestBundle {
    pub fn from_yaml_str(content: &str) -> Result<Self, ManifestError> {
        Self::parse(content, "<inline>")
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Load every `*.yml` / `*.yaml` file in `dir`, in file name order, into
    /// one bundle.
    pub fn load_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ManifestError> {
        let dir = dir.as_ref();
        let io_error = |source: std::io::Error| ManifestError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(io_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_error)?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_manifest_file(path))
            .collect();
        paths.sort();

        let mut bundle = Self::default();
        for path in paths {
            tracing::debug!(manifest = %path.display(), "loading manifest");
            bundle.extend(Self::from_file(&path)?);
        }
        Ok(bundle)
    }

    /// Load a manifest file or a directory of manifest files.
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        if path.is_dir() {
            Self::load_dir(path)
        } else {
            Self::from_file(path)
        }
    }

    pub fn extend(&mut self, other: ManifestBundle) {
        self.frameworks.extend(other.frameworks);
        self.models.extend(other.models);
    }

    pub fn is_empty(&self) -> bool {
        self.frameworks.is_empty() && self.models.is_empty()
    }

    /// Register every framework, then every model.
    pub fn register_into(&self, registry: &ManifestRegistry) -> RegistrationReport {
        let mut report = RegistrationReport::default();

        for framework in &self.frameworks {
            match registry.register_framework(framework.clone()) {
                Ok(name) => report.frameworks.push(name),
                Err(error) => {
                    tracing::warn!(framework = %framework.name, %error, "framework registration failed");
                    report.failures.push(RegistrationFailure {
                        entry: format!("framework {}", framework.name),
                        error,
                    });
                }
            }
        }

        for model in &self.models {
            match registry.register_model(model.clone()) {
                Ok(name) => report.models.push(name),
                Err(error) => {
                    tracing::warn!(model = %model.name, %error, "model registration failed");
                    report.failures.push(RegistrationFailure {
                        entry: format!("model {}", model.name),
                        error,
                    });
                }
            }
        }

        report
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ManifestError> {
        serde_yaml::from_str(content).map_err(|e| ManifestError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })
    }
}

fn is_manifest_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yml") | Some("yaml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TENSORRT: &str = r#"
frameworks:
  - name: TensorRT
    version: 5.1.5
models:
  - name: ResNet50
    version: "1.0"
    framework:
      name: TensorRT
      version: ">=5.0.0 <6.0.0"
    inputs:
      - type: image
        parameters:
          dimensions: [3, 224, 224]
    output:
      type: classification
"#;

    #[test]
    fn test_parse_bundle() {
        let bundle = ManifestBundle::from_yaml_str(TENSORRT).unwrap();
        assert_eq!(bundle.frameworks.len(), 1);
        assert_eq!(bundle.models.len(), 1);
        assert_eq!(bundle.models[0].inputs[0].kind, "image");
        assert_eq!(
            bundle.models[0].output.as_ref().map(|o| o.kind.as_str()),
            Some("classification")
        );
    }

    #[test]
    fn test_parse_error_names_origin() {
        let err = ManifestBundle::from_yaml_str("frameworks: [").unwrap_err();
        assert!(err.to_string().contains("<inline>"));
    }

    #[test]
    fn test_register_into() {
        let registry = ManifestRegistry::new();
        let report = ManifestBundle::from_yaml_str(TENSORRT)
            .unwrap()
            .register_into(&registry);

        assert!(report.is_clean());
        assert_eq!(report.frameworks, vec!["tensorrt:5.1.5"]);
        assert_eq!(report.models, vec!["tensorrt:5.1.5/resnet50:1.0"]);
    }

    #[test]
    fn test_duplicate_only_fails_offending_entry() {
        let registry = ManifestRegistry::new();
        let bundle = ManifestBundle::from_yaml_str(TENSORRT).unwrap();
        bundle.register_into(&registry);

        let mut again = bundle.clone();
        again.frameworks.push(FrameworkDescriptor::new("TensorRT", "6.0.0"));
        let report = again.register_into(&registry);

        assert_eq!(report.frameworks, vec!["tensorrt:6.0.0"]);
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| matches!(f.error, RegistryError::DuplicateName { .. })));
    }

    #[test]
    fn test_load_dir_reads_yaml_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("10-tensorrt.yml"), TENSORRT).unwrap();
        fs::write(
            dir.path().join("20-onnx.yaml"),
            "frameworks:\n  - name: onnxruntime\n    version: 1.4.0\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not a manifest").unwrap();

        let bundle = ManifestBundle::load_dir(dir.path()).unwrap();
        let names: Vec<&str> = bundle.frameworks.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["TensorRT", "onnxruntime"]);
    }

    #[test]
    fn test_missing_file() {
        let err = ManifestBundle::from_file("/nonexistent/manifest.yml").unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
    }
}
