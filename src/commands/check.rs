use anyhow::Result;

use inferd_registry::config::AgentConfig;

use super::load_registry;

/// Returns `false` when any manifest entry failed to register.
pub fn run(config: &AgentConfig) -> Result<bool> {
    println!("🔍 Checking manifests...\n");

    let paths = config.manifest_paths();
    if paths.is_empty() {
        println!("○ No manifest paths configured (use --manifests or INFERD_MANIFEST_PATH)");
    }
    for path in &paths {
        println!("• {}", path.display());
    }

    let (_, report) = load_registry(config)?;
    println!();
    println!("✓ {} framework(s) registered", report.frameworks.len());
    println!("✓ {} model(s) registered", report.models.len());

    if report.is_clean() {
        println!("\n✅ All manifest entries registered");
        return Ok(true);
    }

    for failure in &report.failures {
        println!("✗ {}: {}", failure.entry, failure.error);
    }
    println!("\n⚠️  {} failure(s); fix the manifests above", report.failures.len());
    Ok(false)
}
