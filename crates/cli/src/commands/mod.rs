//! Subcommand implementations.

pub mod ask;
pub mod doctor;
pub mod init;
pub mod models;
pub mod serve;

use std::path::{Path, PathBuf};

use algoviz_config::{AppConfig, ConfigError};

/// The config file a command works with.
pub fn config_file(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

/// Load config from `explicit` or the default location, with env overrides.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match explicit {
        Some(path) => AppConfig::load_with_env(path, |key| std::env::var(key).ok()),
        None => AppConfig::load(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_file_wins() {
        let path = Path::new("/tmp/algoviz-test/config.toml");
        assert_eq!(config_file(Some(path)), path);
        assert!(config_file(None).ends_with(".algoviz/config.toml"));
    }

    #[tokio::test]
    async fn init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        init::run(Some(&path), false).await.unwrap();
        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "mistral-large-latest");
        assert_eq!(config.gateway.port, 5000);

        std::fs::write(&path, "model = \"custom\"\n").unwrap();
        init::run(Some(&path), false).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "model = \"custom\"\n");

        init::run(Some(&path), true).await.unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("mistral-large-latest"));
    }
}
