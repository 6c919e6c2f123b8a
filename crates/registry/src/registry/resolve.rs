//! Resolution between models and framework versions

use super::ManifestRegistry;
use crate::error::{RegistryError, Result};
use crate::types::{FrameworkDescriptor, ModelDescriptor};
use crate::version::Version;

impl ManifestRegistry {
    /// Choose the registered framework a model should run on.
    ///
    /// Candidates are the frameworks of the model's required family whose
    /// version satisfies the model's constraint; the highest version wins.
    /// A `latest` requirement accepts every version. Frameworks whose version
    /// does not parse are skipped.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NoFrameworkRegistered`] when no framework exists
    /// - [`RegistryError::InvalidConstraint`] when the model's requirement
    ///   does not parse
    /// - [`RegistryError::NoCompatibleFramework`] when nothing satisfies it
    pub fn resolve_framework_for_model(
        &self,
        model: &ModelDescriptor,
    ) -> Result<FrameworkDescriptor> {
        let names = self.frameworks.names();
        if names.is_empty() {
            return Err(RegistryError::NoFrameworkRegistered);
        }

        let requirement = model.framework_requirement()?;

        let mut best: Option<(Version, String, FrameworkDescriptor)> = None;
        for name in names {
            let framework = self.frameworks.find(&name)?;
            if !model.framework.accepts_family(&framework) {
                continue;
            }
            let version = match framework.parsed_version() {
                Ok(version) => version,
                Err(e) => {
                    tracing::warn!(framework = %name, error = %e, "skipping framework with unparseable version");
                    continue;
                }
            };
            if !requirement.is_satisfied_by(&version) {
                continue;
            }
            let better = match &best {
                None => true,
                Some((best_version, best_name, _)) => {
                    version > *best_version || (version == *best_version && name < *best_name)
                }
            };
            if better {
                best = Some((version, name, framework));
            }
        }

        match best {
            Some((_, name, framework)) => {
                tracing::debug!(model = %model.name, framework = %name, "resolved framework for model");
                Ok(framework)
            }
            None => Err(RegistryError::NoCompatibleFramework {
                model: model.name.clone(),
                requirement: format!("{} {}", model.framework.name, requirement)
                    .trim()
                    .to_string(),
            }),
        }
    }

    /// Find a model registered against `framework`.
    ///
    /// `model_name` is either `name`, matching every version of the model, or
    /// `name:version`, matching one version exactly; both case-insensitive.
    /// Models whose framework requirement rejects `framework`'s version are
    /// skipped. When several models match, the highest model version wins,
    /// then the smallest canonical name.
    ///
    /// # Errors
    ///
    /// [`RegistryError::EmptyName`] or [`RegistryError::InvalidVersion`] for
    /// a malformed framework, [`RegistryError::NotFound`] when nothing matches.
    pub fn find_model_for_framework(
        &self,
        framework: &FrameworkDescriptor,
        model_name: &str,
    ) -> Result<ModelDescriptor> {
        let framework_name = framework.canonical_name()?;
        let framework_version = framework.parsed_version()?;
        let prefix = format!("{}/", framework_name);
        let query = model_name.trim().to_lowercase();

        let mut best: Option<(Version, String, ModelDescriptor)> = None;
        for (name, model) in self.models.entries() {
            let Some(model_part) = name.strip_prefix(&prefix) else {
                continue;
            };
            if !matches_query(model_part, &query) {
                continue;
            }
            let compatible = model
                .framework_requirement()
                .map(|requirement| requirement.is_satisfied_by(&framework_version))
                .unwrap_or(false);
            if !compatible {
                tracing::debug!(model = %name, framework = %framework_name, "model rejects framework version");
                continue;
            }
            let Ok(version) = model.parsed_version() else {
                continue;
            };
            let better = match &best {
                None => true,
                Some((best_version, best_name, _)) => {
                    version > *best_version || (version == *best_version && name < *best_name)
                }
            };
            if better {
                best = Some((version, name, model));
            }
        }

        best.map(|(_, _, model)| model)
            .ok_or_else(|| RegistryError::not_found(format!("{}{}", prefix, query)))
    }

    /// Every model usable with `framework`, ordered by model name.
    /// Models that fail to match are skipped silently.
    pub fn list_models_for_framework(&self, framework: &FrameworkDescriptor) -> Vec<ModelDescriptor> {
        let Ok(framework_name) = framework.canonical_name() else {
            return Vec::new();
        };
        let prefix = format!("{}/", framework_name);

        let mut models: Vec<ModelDescriptor> = self
            .models
            .names()
            .iter()
            .filter_map(|name| name.strip_prefix(&prefix))
            .filter_map(|model_part| self.find_model_for_framework(framework, model_part).ok())
            .collect();
        models.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));
        models
    }
}

/// `model_part` is the `name:version` tail of a canonical model name.
fn matches_query(model_part: &str, query: &str) -> bool {
    let model_part = model_part.to_lowercase();
    if query.contains(':') {
        return model_part == query;
    }
    model_part
        .rsplit_once(':')
        .map(|(name, _)| name == query)
        .unwrap_or(false)
}
