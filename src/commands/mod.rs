pub mod check;
pub mod list;
pub mod resolve;
pub mod workdir;

use anyhow::{anyhow, Context, Result};

use inferd_registry::config::AgentConfig;
use inferd_registry::{ManifestBundle, ManifestRegistry, ModelDescriptor, RegistrationReport, Version};

/// Load every configured manifest into a fresh registry.
///
/// Manifests are merged before registering so a model may depend on a
/// framework declared in another file.
pub fn load_registry(config: &AgentConfig) -> Result<(ManifestRegistry, RegistrationReport)> {
    let paths = config.manifest_paths();
    if paths.is_empty() {
        tracing::warn!("no manifest paths configured; the registry is empty");
    }

    let mut bundle = ManifestBundle::default();
    for path in &paths {
        let loaded = ManifestBundle::load_path(path)
            .with_context(|| format!("loading manifests from {}", path.display()))?;
        bundle.extend(loaded);
    }

    let registry = ManifestRegistry::new();
    let report = bundle.register_into(&registry);
    tracing::debug!(
        frameworks = report.frameworks.len(),
        models = report.models.len(),
        failures = report.failures.len(),
        "manifests registered"
    );
    Ok((registry, report))
}

/// Pick a registered model by name, case-insensitively. Without a version
/// the highest registered version is chosen.
pub fn select_model(
    registry: &ManifestRegistry,
    name: &str,
    version: Option<&str>,
) -> Result<ModelDescriptor> {
    let candidates = registry
        .list_models()?
        .into_iter()
        .filter(|model| model.name.eq_ignore_ascii_case(name))
        .filter(|model| version.map_or(true, |v| model.version.eq_ignore_ascii_case(v)));

    candidates
        .filter_map(|model| model.parsed_version().ok().map(|v| (v, model)))
        .max_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(_, model): (Version, ModelDescriptor)| model)
        .ok_or_else(|| match version {
            Some(v) => anyhow!("model {}:{} is not registered", name, v),
            None => anyhow!("model {} is not registered", name),
        })
}
