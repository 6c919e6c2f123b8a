//! Framework registry

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::error::{RegistryError, Result};
use crate::types::FrameworkDescriptor;

/// Thread-safe, append-only store of framework descriptors keyed by
/// canonical name. Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct FrameworkRegistry {
    frameworks: Arc<DashMap<String, FrameworkDescriptor>>,
}

impl FrameworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a framework under its canonical name.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EmptyName`] for an unnamed framework and
    /// [`RegistryError::DuplicateName`] when the canonical name is taken. A
    /// failed registration leaves the registry unchanged.
    pub fn register(&self, framework: FrameworkDescriptor) -> Result<String> {
        let name = framework.canonical_name()?;
        match self.frameworks.entry(name.clone()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateName { name }),
            Entry::Vacant(slot) => {
                slot.insert(framework);
                tracing::info!(framework = %name, "registered framework");
                Ok(name)
            }
        }
    }

    /// Snapshot of the registered canonical names, in no particular order.
    pub fn names(&self) -> Vec<String> {
        self.frameworks
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Exact lookup by canonical name.
    pub fn find(&self, canonical_name: &str) -> Result<FrameworkDescriptor> {
        self.frameworks
            .get(&canonical_name.to_lowercase())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistryError::not_found(canonical_name))
    }

    /// Every registered framework, ordered by canonical name.
    pub fn list(&self) -> Result<Vec<FrameworkDescriptor>> {
        let mut names = self.names();
        names.sort();
        names.iter().map(|name| self.find(name)).collect()
    }

    pub fn contains(&self, canonical_name: &str) -> bool {
        self.frameworks.contains_key(&canonical_name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.frameworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frameworks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_find() {
        let registry = FrameworkRegistry::new();
        let name = registry
            .register(FrameworkDescriptor::new("TensorRT", "5.1.5"))
            .unwrap();

        assert_eq!(name, "tensorrt:5.1.5");
        assert_eq!(registry.find("tensorrt:5.1.5").unwrap().name, "TensorRT");
        assert_eq!(registry.find("TensorRT:5.1.5").unwrap().version, "5.1.5");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let registry = FrameworkRegistry::new();
        let first = FrameworkDescriptor::new("TensorRT", "5.1.5");
        let mut second = FrameworkDescriptor::new("tensorrt", "5.1.5");
        second
            .container_info
            .insert("amd64".to_string(), Default::default());

        registry.register(first.clone()).unwrap();
        let err = registry.register(second).unwrap_err();

        assert_eq!(
            err,
            RegistryError::DuplicateName {
                name: "tensorrt:5.1.5".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.find("tensorrt:5.1.5").unwrap(), first);
    }

    #[test]
    fn test_find_is_exact() {
        let registry = FrameworkRegistry::new();
        registry
            .register(FrameworkDescriptor::new("TensorRT", "5.1.5"))
            .unwrap();

        assert!(matches!(
            registry.find("tensorrt"),
            Err(RegistryError::NotFound { .. })
        ));
        assert!(registry.find("tensorrt:5.1").is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let registry = FrameworkRegistry::new();
        assert!(matches!(
            registry.register(FrameworkDescriptor::new("", "1.0.0")),
            Err(RegistryError::EmptyName { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_list_and_names_agree() {
        let registry = FrameworkRegistry::new();
        for version in ["1.0.0", "1.5.0", "2.0.0"] {
            registry
                .register(FrameworkDescriptor::new("fw", version))
                .unwrap();
        }

        let mut names = registry.names();
        names.sort();
        assert_eq!(names, vec!["fw:1.0.0", "fw:1.5.0", "fw:2.0.0"]);
        assert_eq!(registry.list().unwrap().len(), 3);
    }

    #[test]
    fn test_clones_share_state() {
        let registry = FrameworkRegistry::new();
        let handle = registry.clone();
        handle
            .register(FrameworkDescriptor::new("onnx", "1.0.0"))
            .unwrap();
        assert!(registry.contains("onnx:1.0.0"));
    }
}
