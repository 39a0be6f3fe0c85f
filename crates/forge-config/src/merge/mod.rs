//! Configuration layering: defaults, forge.toml, environment, command line

use std::collections::HashMap;
use camino::{Utf8Path, Utf8PathBuf};
use forge_core::error::ForgeError;
use tracing::debug;
use crate::toml::{ArchiveMode, ForgeConfig};
use crate::{ConfigResult, CONFIG_FILE_NAME};

/// Prefix of the environment variables that override configuration
pub const ENV_PREFIX: &str = "FORGE_";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Directory the search for forge.toml starts from
    cwd: Utf8PathBuf,
}

/// Configuration layering and merging
pub struct ConfigLayering;

/// Where the file layer of the configuration came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// No file found; built-in defaults
    Defaults,
    /// forge.toml located by walking up from the working directory
    Discovered(Utf8PathBuf),
    /// File passed explicitly with --config
    Explicit(Utf8PathBuf),
}

/// Values given on the command line; `None` leaves the lower layers alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub max_items: Option<u32>,
    pub tag: Option<String>,
    pub no_ssl_verify: bool,
    pub archive_mode: Option<ArchiveMode>,
    pub archive_path: Option<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd }
    }

    /// Find forge.toml in the working directory or one of its parents
    pub fn find_config_file(&self) -> Option<Utf8PathBuf> {
        let mut current = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }

        None
    }

    /// Load the file layer, preferring an explicit path over discovery
    pub async fn load_file_config(
        &self,
        explicit: Option<&Utf8Path>,
    ) -> ConfigResult<(Option<ForgeConfig>, ConfigSource)> {
        if let Some(path) = explicit {
            let config = crate::toml::load_from_file(path).await?;
            return Ok((Some(config), ConfigSource::Explicit(path.to_path_buf())));
        }

        match self.find_config_file() {
            Some(path) => {
                debug!("Using configuration file {}", path);
                let config = crate::toml::load_from_file(&path).await?;
                Ok((Some(config), ConfigSource::Discovered(path)))
            }
            None => Ok((None, ConfigSource::Defaults)),
        }
    }

    /// Load the complete configuration with every layer applied
    pub async fn load(
        &self,
        explicit: Option<&Utf8Path>,
        cli: &CliOverrides,
    ) -> ConfigResult<(ForgeConfig, ConfigSource)> {
        let (file_config, source) = self.load_file_config(explicit).await?;
        let env = ConfigLayering::env_overrides();
        let config = ConfigLayering::merge_configs(file_config, &env, cli)?;
        Ok((config, source))
    }
}

impl ConfigLayering {
    /// Collect the FORGE_* variables of the current process
    pub fn env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect()
    }

    /// Merge the configuration layers; later layers win
    pub fn merge_configs(
        file_config: Option<ForgeConfig>,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &CliOverrides,
    ) -> ConfigResult<ForgeConfig> {
        let mut merged = file_config.unwrap_or_default();

        Self::apply_env_overrides(&mut merged, env_overrides)?;
        Self::apply_cli_overrides(&mut merged, cli_overrides);

        crate::toml::validate_config(&merged)?;

        Ok(merged)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(config: &mut ForgeConfig, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "FORGE_BASE_URL" => {
                    config.base_url = value.clone();
                }
                "FORGE_MAX_ITEMS" => {
                    config.max_items = parse_env(key, value)?;
                }
                "FORGE_TAG" => {
                    config.tag = Some(value.clone());
                }
                "FORGE_SSL_VERIFY" => {
                    config.ssl_verify = parse_env(key, value)?;
                }
                "FORGE_TIMEOUT_SECS" => {
                    config.timeout_secs = parse_env(key, value)?;
                }
                "FORGE_ARCHIVE_PATH" => {
                    config.archive.path = Some(Utf8PathBuf::from(value));
                }
                _ => {
                    // Unknown environment variable, ignore
                }
            }
        }

        Ok(())
    }

    /// Apply command line overrides (highest priority)
    fn apply_cli_overrides(config: &mut ForgeConfig, overrides: &CliOverrides) {
        if let Some(max_items) = overrides.max_items {
            config.max_items = max_items;
        }
        if let Some(tag) = &overrides.tag {
            config.tag = Some(tag.clone());
        }
        if overrides.no_ssl_verify {
            config.ssl_verify = false;
        }
        if let Some(mode) = overrides.archive_mode {
            config.archive.mode = mode;
        }
        if let Some(path) = &overrides.archive_path {
            config.archive.path = Some(path.clone());
        }
    }
}

fn parse_env<T>(key: &str, value: &str) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ForgeError::ConfigValidation {
        field: key.to_string(),
        reason: format!("'{}': {}", value, e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_merge_defaults_only() {
        let config = ConfigLayering::merge_configs(None, &HashMap::new(), &CliOverrides::default()).unwrap();
        assert_eq!(config, ForgeConfig::default());
    }

    #[test]
    fn test_layer_precedence() {
        let file = ForgeConfig {
            max_items: 10,
            tag: Some("file".to_string()),
            ..ForgeConfig::default()
        };
        let env = env(&[("FORGE_MAX_ITEMS", "20"), ("FORGE_TAG", "env"), ("FORGE_SSL_VERIFY", "true")]);
        let cli = CliOverrides {
            max_items: Some(30),
            no_ssl_verify: true,
            ..CliOverrides::default()
        };

        let config = ConfigLayering::merge_configs(Some(file), &env, &cli).unwrap();
        assert_eq!(config.max_items, 30);
        assert_eq!(config.tag.as_deref(), Some("env"));
        assert!(!config.ssl_verify);
    }

    #[test]
    fn test_invalid_env_value() {
        let env = env(&[("FORGE_MAX_ITEMS", "lots")]);
        let result = ConfigLayering::merge_configs(None, &env, &CliOverrides::default());

        match result {
            Err(ForgeError::ConfigValidation { field, .. }) => assert_eq!(field, "FORGE_MAX_ITEMS"),
            other => panic!("Expected ConfigValidation error, got {:?}", other),
        }
    }

    #[test]
    fn test_merged_config_is_validated() {
        let cli = CliOverrides {
            max_items: Some(0),
            ..CliOverrides::default()
        };
        assert!(ConfigLayering::merge_configs(None, &HashMap::new(), &cli).is_err());
    }

    #[test]
    fn test_archive_overrides() {
        let cli = CliOverrides {
            archive_mode: Some(ArchiveMode::Replay),
            archive_path: Some(Utf8PathBuf::from("/srv/archive")),
            ..CliOverrides::default()
        };

        let config = ConfigLayering::merge_configs(None, &HashMap::new(), &cli).unwrap();
        assert_eq!(config.archive.mode, ArchiveMode::Replay);
        assert_eq!(config.archive.resolved_path().unwrap(), Utf8PathBuf::from("/srv/archive"));
    }

    #[tokio::test]
    async fn test_discovers_config_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let nested = root.join("a").join("b");
        tokio::fs::create_dir_all(&nested).await.unwrap();
        tokio::fs::write(root.join("forge.toml"), "max_items = 3\n").await.unwrap();

        let loader = ConfigLoader::new(nested);
        let (config, source) = loader.load_file_config(None).await.unwrap();

        assert_eq!(config.unwrap().max_items, 3);
        assert_eq!(source, ConfigSource::Discovered(root.join("forge.toml")));
    }

    #[tokio::test]
    async fn test_explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        let loader = ConfigLoader::new(root.clone());

        let missing = root.join("missing.toml");
        let result = loader.load_file_config(Some(&missing)).await;
        assert!(matches!(result, Err(ForgeError::Io { .. })));
    }
}
