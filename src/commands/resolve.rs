use anyhow::Result;
use serde::Serialize;

use inferd_registry::config::AgentConfig;

use super::{load_registry, select_model};

#[derive(Serialize)]
struct Resolution {
    model: String,
    requirement: String,
    framework: String,
}

pub fn run(config: &AgentConfig, model: &str, version: Option<&str>, json: bool) -> Result<()> {
    let (registry, _) = load_registry(config)?;
    let model = select_model(&registry, model, version)?;
    let framework = registry.framework_for_model(&model)?;

    let resolution = Resolution {
        model: registry.model_canonical_name(&model)?,
        requirement: format!("{} {}", model.framework.name, model.framework_requirement()?),
        framework: framework.canonical_name()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&resolution)?);
    } else {
        println!("✓ {} ({}) -> {}", resolution.model, resolution.requirement, resolution.framework);
    }
    Ok(())
}
