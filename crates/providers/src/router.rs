//! Provider selection — builds the configured backend from config.

use std::sync::Arc;
use std::time::Duration;

use algoviz_config::AppConfig;
use algoviz_core::provider::Provider;
use tracing::{info, warn};

use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider named in the configuration.
///
/// Returns `None` when the provider needs a credential and no usable one is
/// configured; the pipeline then answers every query with the fallback.
pub fn build_from_config(config: &AppConfig) -> Option<Arc<dyn Provider>> {
    if !config.has_credentials() {
        warn!(
            provider = %config.provider,
            "No usable API key configured; queries will receive the fallback visualization"
        );
        return None;
    }

    let base_url = config
        .api_url
        .clone()
        .unwrap_or_else(|| default_base_url(&config.provider));
    let api_key = config.usable_api_key().unwrap_or(config.provider.as_str());

    info!(provider = %config.provider, base_url = %base_url, "Provider configured");

    let provider = OpenAiCompatProvider::new(&config.provider, base_url, api_key)
        .with_timeout(Duration::from_secs(config.request_timeout_secs));
    Some(Arc::new(provider))
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "mistral" => "https://api.mistral.ai/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("mistral").contains("api.mistral.ai"));
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn no_provider_without_key() {
        let config = AppConfig::default();
        assert!(build_from_config(&config).is_none());

        let config = AppConfig {
            api_key: Some("your_api_key_here".into()),
            ..AppConfig::default()
        };
        assert!(build_from_config(&config).is_none());
    }

    #[test]
    fn builds_named_provider() {
        let config = AppConfig {
            api_key: Some("mk-0123456789abcdef".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "mistral");
    }

    #[test]
    fn keyless_provider_is_built() {
        let config = AppConfig {
            provider: "ollama".into(),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
    }
}
