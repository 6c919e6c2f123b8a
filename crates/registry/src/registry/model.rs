//! Model registry

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::error::{RegistryError, Result};
use crate::types::ModelDescriptor;

/// Thread-safe, append-only store of model descriptors keyed by canonical
/// model name (`<framework>/<model>:<version>`).
///
/// Canonical model names depend on which framework a model resolves to, so
/// models are normally registered through
/// [`ManifestRegistry::register_model`](super::ManifestRegistry::register_model).
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Arc<DashMap<String, ModelDescriptor>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `model` under an already computed canonical name.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateName`] when the name is taken; the first
    /// registration is kept.
    pub fn register_named(&self, canonical_name: &str, model: ModelDescriptor) -> Result<()> {
        let name = canonical_name.to_lowercase();
        match self.models.entry(name) {
            Entry::Occupied(slot) => Err(RegistryError::DuplicateName {
                name: slot.key().clone(),
            }),
            Entry::Vacant(slot) => {
                tracing::info!(model = %slot.key(), "registered model");
                slot.insert(model);
                Ok(())
            }
        }
    }

    /// Snapshot of the registered canonical names, in no particular order.
    pub fn names(&self) -> Vec<String> {
        self.models.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Exact lookup by canonical name.
    pub fn find(&self, canonical_name: &str) -> Result<ModelDescriptor> {
        self.models
            .get(&canonical_name.to_lowercase())
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistryError::not_found(canonical_name))
    }

    /// The canonical name `model` is registered under. When the same
    /// descriptor was registered against several frameworks, the smallest
    /// name is returned.
    pub fn key_of(&self, model: &ModelDescriptor) -> Option<String> {
        self.models
            .iter()
            .filter(|entry| entry.value() == model)
            .map(|entry| entry.key().clone())
            .min()
    }

    /// Every registered model, ordered by model name.
    ///
    /// Models sharing a name (different versions or frameworks) are ordered
    /// by canonical name so the listing is stable between calls.
    pub fn list(&self) -> Result<Vec<ModelDescriptor>> {
        let mut names = self.names();
        names.sort();
        let mut models = names
            .iter()
            .map(|name| self.find(name))
            .collect::<Result<Vec<_>>>()?;
        models.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(models)
    }

    /// Every `(canonical name, descriptor)` pair, ordered by canonical name.
    pub fn entries(&self) -> Vec<(String, ModelDescriptor)> {
        let mut entries: Vec<_> = self
            .models
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
