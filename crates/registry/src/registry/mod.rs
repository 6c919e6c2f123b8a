//! Framework and model registries
//!
//! [`ManifestRegistry`] owns one [`FrameworkRegistry`] and one
//! [`ModelRegistry`] and hosts the resolution engine that binds models to
//! concrete framework versions. It replaces process-wide global state: build
//! one per process (or per test), register every plugin's descriptors during
//! startup, then share it behind an `Arc` or by cloning the handle.
//!
//! # Usage
//!
//! ```rust
//! use inferd_registry::{FrameworkDescriptor, FrameworkRequirement, ManifestRegistry, ModelDescriptor};
//!
//! # fn example() -> Result<(), inferd_registry::RegistryError> {
//! let registry = ManifestRegistry::new();
//! registry.register_framework(FrameworkDescriptor::new("TensorRT", "5.1.5"))?;
//!
//! let model = ModelDescriptor::new(
//!     "ResNet50",
//!     "1.0.0",
//!     FrameworkRequirement::new("TensorRT", ">=5.0.0 <6.0.0"),
//! );
//! let key = registry.register_model(model.clone())?;
//! assert_eq!(key, "tensorrt:5.1.5/resnet50:1.0.0");
//!
//! let framework = registry.resolve_framework_for_model(&model)?;
//! assert_eq!(framework.version, "5.1.5");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod framework;
pub mod model;
mod resolve;

pub use framework::FrameworkRegistry;
pub use model::ModelRegistry;

use crate::error::{RegistryError, Result};
use crate::naming;
use crate::types::{FrameworkDescriptor, ModelDescriptor};

/// The framework and model catalog of one serving process.
#[derive(Debug, Clone, Default)]
pub struct ManifestRegistry {
    frameworks: FrameworkRegistry,
    models: ModelRegistry,
}

impl ManifestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frameworks(&self) -> &FrameworkRegistry {
        &self.frameworks
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Register a framework; returns its canonical name.
    pub fn register_framework(&self, framework: FrameworkDescriptor) -> Result<String> {
        self.frameworks.register(framework)
    }

    /// Validate and register a model; returns its canonical name.
    ///
    /// The canonical name embeds the framework the model currently resolves
    /// to, so the frameworks a model depends on must be registered first.
    pub fn register_model(&self, model: ModelDescriptor) -> Result<String> {
        model.validate()?;
        let name = self.resolved_model_name(&model)?;
        self.models.register_named(&name, model)?;
        Ok(name)
    }

    /// `<framework canonical name>/<model>:<version>`.
    ///
    /// A registered model keeps the name it was registered under, even after
    /// a newer compatible framework shows up. For a model not registered yet
    /// this is the name it would get now.
    pub fn model_canonical_name(&self, model: &ModelDescriptor) -> Result<String> {
        match self.models.key_of(model) {
            Some(name) => Ok(name),
            None => self.resolved_model_name(model),
        }
    }

    /// The framework `model` is bound to: the one it was registered against,
    /// or for an unregistered model the one it resolves to now.
    pub fn framework_for_model(&self, model: &ModelDescriptor) -> Result<FrameworkDescriptor> {
        let Some(name) = self.models.key_of(model) else {
            return self.resolve_framework_for_model(model);
        };
        // framework names may contain '/', so match the longest registered
        // prefix rather than splitting at the first separator
        let framework = self
            .frameworks
            .names()
            .into_iter()
            .filter(|framework| {
                name.strip_prefix(framework.as_str())
                    .map_or(false, |rest| rest.starts_with('/'))
            })
            .max_by_key(String::len)
            .ok_or_else(|| RegistryError::not_found(name.clone()))?;
        self.frameworks.find(&framework)
    }

    fn resolved_model_name(&self, model: &ModelDescriptor) -> Result<String> {
        let framework = self.resolve_framework_for_model(model)?;
        let framework_name = framework.canonical_name()?;
        naming::model_canonical_name(&framework_name, &model.name, &model.version)
    }

    pub fn framework_names(&self) -> Vec<String> {
        self.frameworks.names()
    }

    pub fn find_framework(&self, canonical_name: &str) -> Result<FrameworkDescriptor> {
        self.frameworks.find(canonical_name)
    }

    pub fn list_frameworks(&self) -> Result<Vec<FrameworkDescriptor>> {
        self.frameworks.list()
    }

    pub fn model_names(&self) -> Vec<String> {
        self.models.names()
    }

    pub fn find_model(&self, canonical_name: &str) -> Result<ModelDescriptor> {
        self.models.find(canonical_name)
    }

    pub fn list_models(&self) -> Result<Vec<ModelDescriptor>> {
        self.models.list()
    }
}
