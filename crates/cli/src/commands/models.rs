//! `algoviz models` — List models offered by the configured provider.

use std::path::Path;

use algoviz_core::Provider;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config =
        super::load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    let provider = algoviz_providers::build_from_config(&config)
        .ok_or("No usable API key configured. Run `algoviz doctor` for details.")?;

    let models = provider.list_models().await?;

    println!("🤖 Models from {}", provider.name());
    println!("==================");
    if models.is_empty() {
        println!("  (provider returned no models)");
    }
    for model in &models {
        let marker = if *model == config.model { "▶" } else { " " };
        println!("  {marker} {model}");
    }

    Ok(())
}
