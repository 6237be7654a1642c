//! Configuration loading, validation, and management for AlgoViz.
//!
//! Loads configuration from `~/.algoviz/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Keys that ship in `.env` templates and must never be sent upstream.
const PLACEHOLDER_KEYS: [&str; 2] = ["your_api_key_here", "YOUR_MISTRAL_API_KEY_HERE"];

/// Anything this short is a typo or a placeholder, not a real key.
const MIN_KEY_LEN: usize = 11;

/// Providers that accept requests without a credential.
const KEYLESS_PROVIDERS: [&str; 1] = ["ollama"];

/// The root configuration structure.
///
/// Maps directly to `~/.algoviz/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the LLM provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Which LLM provider to talk to
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Override the provider's base URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Max tokens per response (provider default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Upper bound on a single model call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How many trailing history turns are forwarded to the model
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Failure diagnostics
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

fn default_provider() -> String {
    "mistral".into()
}
fn default_model() -> String {
    "mistral-large-latest".into()
}
fn default_temperature() -> f64 {
    0.2
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_history_window() -> usize {
    5
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("history_window", &self.history_window)
            .field("gateway", &self.gateway)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Allowed CORS origins. Empty = any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Maximum accepted request body size
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            cors_origins: vec![],
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Append a record here every time a query falls back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_log: Option<PathBuf>,

    /// How much of an unparseable model response to keep in errors
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

fn default_excerpt_chars() -> usize {
    200
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            error_log: None,
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.algoviz/config.toml).
    ///
    /// Environment overrides:
    /// - `ALGOVIZ_API_KEY`, then `MISTRAL_API_KEY` (only if no key in the file)
    /// - `ALGOVIZ_PROVIDER`, `ALGOVIZ_MODEL`
    /// - `PORT` for the gateway
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"), |key| {
            std::env::var(key).ok()
        })
    }

    /// Load from `path`, resolving environment overrides through `env`.
    pub fn load_with_env(
        path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(env)?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if self.api_key.is_none() {
            self.api_key = env("ALGOVIZ_API_KEY").or_else(|| env("MISTRAL_API_KEY"));
        }

        if let Some(provider) = env("ALGOVIZ_PROVIDER") {
            self.provider = provider;
        }

        if let Some(model) = env("ALGOVIZ_MODEL") {
            self.model = model;
        }

        if let Some(port) = env("PORT") {
            self.gateway.port = port.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!("PORT must be a port number, got '{port}'"))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".algoviz")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        Ok(())
    }

    /// The API key, if it is one worth sending.
    ///
    /// Placeholder values copied from templates and implausibly short keys
    /// count as missing.
    pub fn usable_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| key.len() >= MIN_KEY_LEN && !PLACEHOLDER_KEYS.contains(key))
    }

    /// Whether the configured provider can be called at all.
    pub fn has_credentials(&self) -> bool {
        self.usable_api_key().is_some() || KEYLESS_PROVIDERS.contains(&self.provider.as_str())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            api_url: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            request_timeout_secs: default_request_timeout_secs(),
            history_window: default_history_window(),
            gateway: GatewayConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "mistral");
        assert_eq!(config.model, "mistral-large-latest");
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.history_window, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider, config.provider);
        assert_eq!(parsed.gateway.port, config.gateway.port);
        assert_eq!(parsed.diagnostics.excerpt_chars, 200);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = AppConfig {
            request_timeout_secs: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().provider, "mistral");
    }

    #[test]
    fn loads_file_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
model = "open-mixtral-8x22b"
temperature = 0.5
history_window = 3

[gateway]
port = 8088

[diagnostics]
error_log = "/tmp/algoviz-errors.log"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "open-mixtral-8x22b");
        assert_eq!(config.history_window, 3);
        assert_eq!(config.gateway.port, 8088);
        assert_eq!(config.gateway.host, "127.0.0.1");
        assert_eq!(
            config.diagnostics.error_log,
            Some(PathBuf::from("/tmp/algoviz-errors.log"))
        );

        std::fs::write(&path, "temperature = 9.0\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ValidationError(_))
        ));

        std::fs::write(&path, "temperature = [\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_apply() {
        let config = AppConfig::load_with_env(
            Path::new("/nonexistent/config.toml"),
            env_of(&[
                ("MISTRAL_API_KEY", "mk-1234567890abcdef"),
                ("ALGOVIZ_MODEL", "mistral-small-latest"),
                ("PORT", "7000"),
            ]),
        )
        .unwrap();

        assert_eq!(config.usable_api_key(), Some("mk-1234567890abcdef"));
        assert_eq!(config.model, "mistral-small-latest");
        assert_eq!(config.gateway.port, 7000);
    }

    #[test]
    fn generic_key_wins_over_mistral_key() {
        let config = AppConfig::load_with_env(
            Path::new("/nonexistent/config.toml"),
            env_of(&[
                ("ALGOVIZ_API_KEY", "generic-key-0123456789"),
                ("MISTRAL_API_KEY", "mistral-key-0123456789"),
            ]),
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("generic-key-0123456789"));
    }

    #[test]
    fn bad_port_env_rejected() {
        let result = AppConfig::load_with_env(
            Path::new("/nonexistent/config.toml"),
            env_of(&[("PORT", "eighty")]),
        );
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn placeholder_and_short_keys_are_unusable() {
        for key in ["your_api_key_here", "YOUR_MISTRAL_API_KEY_HERE", "short", "  "] {
            let config = AppConfig {
                api_key: Some(key.into()),
                ..AppConfig::default()
            };
            assert!(config.usable_api_key().is_none(), "{key} should be unusable");
            assert!(!config.has_credentials());
        }
    }

    #[test]
    fn keyless_provider_needs_no_key() {
        let config = AppConfig {
            provider: "ollama".into(),
            ..AppConfig::default()
        };
        assert!(config.usable_api_key().is_none());
        assert!(config.has_credentials());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("super-secret-key-value".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
