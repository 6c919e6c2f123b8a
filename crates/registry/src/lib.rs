//! Framework and model manifest registry
//!
//! Inference plugins declare the frameworks they provide (TensorRT 5.1.5,
//! onnxruntime 1.4.0, ...) and the models they serve together with a
//! semantic-version constraint on the framework each model needs. This crate
//! keeps both catalogs, gives every descriptor a deterministic canonical
//! name, and resolves each model to the best registered framework version.

pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod naming;
pub mod registry;
pub mod types;
pub mod version;
pub mod workdir;

pub use config::{AgentConfig, ConfigError, ConfigOverrides, LogFormat};
pub use error::{RegistryError, Result};
pub use manifest::{ManifestBundle, ManifestError, RegistrationFailure, RegistrationReport};
pub use naming::{canonical_name, model_canonical_name, split_model_canonical_name};
pub use registry::{FrameworkRegistry, ManifestRegistry, ModelRegistry};
pub use types::{ContainerHardware, FrameworkDescriptor, FrameworkRequirement, IoSpec, ModelDescriptor};
pub use version::{Constraint, Version, VersionRequirement};
pub use workdir::{framework_work_dir, model_work_dir, WorkDirError};
