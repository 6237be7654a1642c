//! `algoviz doctor` — Diagnose configuration and credentials.

use std::path::Path;

use algoviz_core::Provider;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 AlgoViz Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let path = super::config_file(config_path);
    if path.exists() {
        println!("  ✅ Config file found: {}", path.display());
    } else {
        println!("  ⚠️  No config file at {} — using defaults (run `algoviz init`)", path.display());
    }

    let config = match super::load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    println!("  ✅ Provider: {} / model {}", config.provider, config.model);

    if config.usable_api_key().is_some() {
        println!("  ✅ API key configured");
    } else if config.has_credentials() {
        println!("  ✅ Provider needs no API key");
    } else {
        if config.api_key.is_some() {
            println!("  ❌ API key looks like a placeholder or is too short");
        } else {
            println!("  ❌ No API key — set MISTRAL_API_KEY or api_key in the config file");
        }
        println!("     Queries will get the fallback demo until this is fixed.");
        issues += 1;
    }

    if let Some(provider) = algoviz_providers::build_from_config(&config) {
        match provider.health_check().await {
            Ok(true) => println!("  ✅ Provider reachable"),
            Ok(false) => {
                println!("  ⚠️  Provider answered but rejected the request (check the key)");
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Provider unreachable: {e}");
                issues += 1;
            }
        }
    }

    if let Some(log) = &config.diagnostics.error_log {
        println!("  ✅ Failures are logged to {}", log.display());
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
