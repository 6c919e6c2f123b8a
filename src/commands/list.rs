use anyhow::Result;

use inferd_registry::config::AgentConfig;

use super::load_registry;

pub fn frameworks(config: &AgentConfig, json: bool) -> Result<()> {
    let (registry, _) = load_registry(config)?;
    let frameworks = registry.list_frameworks()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&frameworks)?);
        return Ok(());
    }

    println!("🧩 Frameworks\n");
    if frameworks.is_empty() {
        println!("  (none)");
    }
    for framework in &frameworks {
        println!("  • {}", framework.canonical_name()?);
        for (kind, hardware) in &framework.container_info {
            if !hardware.cpu.is_empty() {
                println!("      {} cpu: {}", kind, hardware.cpu);
            }
            if !hardware.gpu.is_empty() {
                println!("      {} gpu: {}", kind, hardware.gpu);
            }
        }
    }
    Ok(())
}

pub fn models(config: &AgentConfig, framework: Option<&str>, all: bool, json: bool) -> Result<()> {
    let (registry, _) = load_registry(config)?;
    let mut models = match framework {
        Some(name) => {
            let framework = registry.find_framework(name)?;
            registry.list_models_for_framework(&framework)
        }
        None => registry.list_models()?,
    };
    if !all {
        models.retain(|model| !model.hidden);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    println!("🤖 Models\n");
    if models.is_empty() {
        println!("  (none)");
    }
    for model in &models {
        let framework = registry
            .framework_for_model(model)
            .and_then(|framework| framework.canonical_name())
            .unwrap_or_else(|_| "unresolved".to_string());
        let hidden = if model.hidden { " (hidden)" } else { "" };
        println!("  • {} {} on {}{}", model.name, model.version, framework, hidden);
    }
    Ok(())
}
