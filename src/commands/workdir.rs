use anyhow::Result;

use inferd_registry::config::AgentConfig;
use inferd_registry::{framework_work_dir, model_work_dir};

use super::{load_registry, select_model};

pub fn run(config: &AgentConfig, model: &str, version: Option<&str>) -> Result<()> {
    let (registry, _) = load_registry(config)?;
    let model = select_model(&registry, model, version)?;
    let framework = registry.framework_for_model(&model)?;
    let root = config.resolved_temp_dir();

    println!("framework: {}", framework_work_dir(&root, &framework)?.display());
    println!("model:     {}", model_work_dir(&root, &registry, &model)?.display());
    Ok(())
}
