//! `algoviz ask` — Run a single query through the pipeline.
//!
//! The result JSON goes to stdout; how the pass ended goes to stderr, so the
//! output can be piped straight into a file or another tool.

use std::path::Path;

use algoviz_core::ConversationTurn;
use algoviz_pipeline::{Disposition, Pipeline};
use tracing::debug;

pub async fn run(
    config_path: Option<&Path>,
    query: &str,
    history_path: Option<&Path>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config =
        super::load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;
    debug!(config = ?config, "Loaded configuration");

    let history: Vec<ConversationTurn> = match history_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read history {}: {e}", path.display()))?;
            serde_json::from_str(&raw)
                .map_err(|e| format!("History {} is not a list of turns: {e}", path.display()))?
        }
        None => Vec::new(),
    };

    let provider = algoviz_providers::build_from_config(&config);
    let pipeline = Pipeline::from_config(&config, provider);

    let outcome = pipeline.run(query, &history).await;

    let json = if pretty {
        serde_json::to_string_pretty(&outcome.result)?
    } else {
        serde_json::to_string(&outcome.result)?
    };
    println!("{json}");

    match &outcome.disposition {
        Disposition::Success => {
            eprintln!(
                "✅ {} visualization, {} steps",
                outcome.result.visualization.kind,
                outcome.result.visualization.steps.len()
            );
            for warning in &outcome.warnings {
                eprintln!("   ⚠️  {warning}");
            }
        }
        Disposition::Fallback { stage, error } => {
            eprintln!("⚠️  Fallback returned (failed while {stage}): {error}");
        }
    }

    Ok(())
}
