//! forge.toml configuration parsing and validation

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use forge_core::error::ForgeError;
use crate::{ConfigResult, MAX_ITEMS, PUPPET_FORGE_URL};

/// Complete collector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Registry URL; resource paths are resolved against it
    pub base_url: String,

    /// Maximum number of items requested per page
    pub max_items: u32,

    /// Label attached to every item; defaults to the origin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Verify TLS certificates
    pub ssl_verify: bool,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Response archive settings
    pub archive: ArchiveSection,

    /// Transport retry settings
    pub retry: RetrySection,
}

/// `[archive]` section
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveSection {
    pub mode: ArchiveMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Utf8PathBuf>,
}

/// How the response archive is used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveMode {
    /// Talk to the registry only
    #[default]
    Off,
    /// Talk to the registry and store every response
    Record,
    /// Answer every request from the archive
    Replay,
}

/// `[retry]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySection {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            base_url: PUPPET_FORGE_URL.to_string(),
            max_items: MAX_ITEMS,
            tag: None,
            ssl_verify: true,
            timeout_secs: 30,
            archive: ArchiveSection::default(),
            retry: RetrySection::default(),
        }
    }
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 10_000,
            multiplier: 2.0,
        }
    }
}

impl ArchiveSection {
    /// Archive directory, falling back to `~/.forge/archives`
    pub fn resolved_path(&self) -> ConfigResult<Utf8PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }

        let home_dir = dirs::home_dir().ok_or_else(|| ForgeError::ConfigValidation {
            field: "archive.path".to_string(),
            reason: "Could not determine home directory".to_string(),
        })?;

        let home = Utf8PathBuf::try_from(home_dir).map_err(|e| ForgeError::ConfigValidation {
            field: "archive.path".to_string(),
            reason: format!("Invalid home directory path: {}", e),
        })?;

        Ok(home.join(".forge").join("archives"))
    }
}

/// Parse forge.toml content
pub fn parse_forge_toml(content: &str) -> ConfigResult<ForgeConfig> {
    let config: ForgeConfig = toml::from_str(content).map_err(|e| ForgeError::TomlParse {
        message: e.to_string(),
    })?;

    validate_config(&config)?;

    Ok(config)
}

/// Load and parse a forge.toml file
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<ForgeConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ForgeError::io(format!("Failed to read {}", path), e))?;

    parse_forge_toml(&content).map_err(|e| match e {
        ForgeError::TomlParse { message } => ForgeError::TomlParse {
            message: format!("In file {}: {}", path, message),
        },
        other => other,
    })
}

/// Validate a complete configuration
pub fn validate_config(config: &ForgeConfig) -> ConfigResult<()> {
    if config.max_items == 0 {
        return Err(ForgeError::ConfigValidation {
            field: "max_items".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    if config.timeout_secs == 0 {
        return Err(ForgeError::ConfigValidation {
            field: "timeout_secs".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let url = url::Url::parse(&config.base_url).map_err(|e| ForgeError::ConfigValidation {
        field: "base_url".to_string(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ForgeError::ConfigValidation {
            field: "base_url".to_string(),
            reason: format!("'{}' cannot be used as a base URL", config.base_url),
        });
    }

    if config.retry.multiplier < 1.0 {
        return Err(ForgeError::ConfigValidation {
            field: "retry.multiplier".to_string(),
            reason: "must be at least 1.0".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_forge_toml("").unwrap();
        assert_eq!(config, ForgeConfig::default());
        assert_eq!(config.base_url, "https://forge.puppet.com/");
        assert_eq!(config.max_items, 100);
        assert!(config.ssl_verify);
        assert_eq!(config.archive.mode, ArchiveMode::Off);
    }

    #[test]
    fn test_parse_full_file() {
        let content = r#"
            base_url = "https://forge.example.com/"
            max_items = 5
            tag = "test"
            ssl_verify = false

            [archive]
            mode = "record"
            path = "/tmp/forge-archive"

            [retry]
            max_retries = 0
        "#;

        let config = parse_forge_toml(content).unwrap();
        assert_eq!(config.base_url, "https://forge.example.com/");
        assert_eq!(config.max_items, 5);
        assert_eq!(config.tag.as_deref(), Some("test"));
        assert!(!config.ssl_verify);
        assert_eq!(config.archive.mode, ArchiveMode::Record);
        assert_eq!(config.archive.path, Some(Utf8PathBuf::from("/tmp/forge-archive")));
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.retry.initial_delay_ms, 100);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            parse_forge_toml("max_items = 0"),
            Err(ForgeError::ConfigValidation { field, .. }) if field == "max_items"
        ));
        assert!(matches!(
            parse_forge_toml("base_url = \"not a url\""),
            Err(ForgeError::ConfigValidation { field, .. }) if field == "base_url"
        ));
        assert!(matches!(
            parse_forge_toml("max_items = \"many\""),
            Err(ForgeError::TomlParse { .. })
        ));
    }

    #[test]
    fn test_explicit_archive_path() {
        let section = ArchiveSection {
            mode: ArchiveMode::Replay,
            path: Some(Utf8PathBuf::from("/data/archive")),
        };
        assert_eq!(section.resolved_path().unwrap(), Utf8PathBuf::from("/data/archive"));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().join("forge.toml")).unwrap();
        tokio::fs::write(&path, "max_items = 7\n").await.unwrap();

        let config = load_from_file(&path).await.unwrap();
        assert_eq!(config.max_items, 7);
    }

    #[tokio::test]
    async fn test_load_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().join("forge.toml")).unwrap();
        tokio::fs::write(&path, "max_items = [").await.unwrap();

        match load_from_file(&path).await {
            Err(ForgeError::TomlParse { message }) => assert!(message.contains("forge.toml")),
            other => panic!("Expected TomlParse error, got {:?}", other),
        }
    }
}
