//! `algoviz init` — Write a default config file.

use std::path::Path;

use algoviz_config::AppConfig;

pub async fn run(config_path: Option<&Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_file(config_path);

    if path.exists() && !force {
        println!("  Config already exists: {}", path.display());
        println!("  Re-run with --force to overwrite it.");
        return Ok(());
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, AppConfig::default_toml())?;

    println!("✅ Wrote {}", path.display());
    println!();
    println!("  Next: set your key, either in the file (api_key = \"...\")");
    println!("  or via MISTRAL_API_KEY / ALGOVIZ_API_KEY.");
    println!("  Get a Mistral key at: https://console.mistral.ai/");

    Ok(())
}
