//! Configuration for the `si` tool.
//!
//! Reads `~/.si/config.toml` (or `--config PATH`) and merges it with
//! command-line flags and environment variables.
//!
//! Precedence: flag → environment → config file → default.

use serde::{Deserialize, Serialize};
use si_protocol::defaults::{
    DEFAULT_BASE_URL, DEFAULT_SCHEMA_CATEGORY, DEFAULT_SCHEMA_COLOR, DEFAULT_TIMEOUT_SECS,
    ENV_API_KEY, ENV_BASE_URL,
};
use si_protocol::paths::default_config_path;
use si_protocol::{ClientConfig, ConfigError};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::key::{ApiToken, TokenError, TokenInputs};
use crate::workflow::companion::{CompanionPreset, CompanionRule, CompanionTable};
use crate::workflow::credential::{CredentialDetector, SECRET_DEFINITION_MARKER};
use crate::workflow::upload::SchemaConventions;

#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config file {}: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },
}

/// On-disk configuration. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Relative paths are resolved against the config file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Substring that marks a schema source as a credential schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential_marker: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_color: Option<String>,

    /// Replaces the built-in companion table when non-empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub companions: Vec<CompanionRule>,
}

impl ConfigFile {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_secs == Some(0) {
            return Err("timeout_secs must be at least 1".to_string());
        }
        Ok(())
    }

    /// Load `path`; `None` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigFileError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&content).map_err(|source| ConfigFileError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .validate()
            .map_err(|message| ConfigFileError::Invalid {
                path: path.to_path_buf(),
                message,
            })?;
        if let (Some(key_file), Some(dir)) = (&config.key_file, path.parent()) {
            if key_file.is_relative() {
                config.key_file = Some(dir.join(key_file));
            }
        }
        Ok(Some(config))
    }
}

/// Values from global command-line flags.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub key_file: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub preset: Option<CompanionPreset>,
}

/// Process environment captured once, so resolution stays testable.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub working_dir: PathBuf,
    pub default_config_path: PathBuf,
}

impl Environment {
    pub fn capture() -> Self {
        Self {
            api_key: non_empty_var(ENV_API_KEY),
            base_url: non_empty_var(ENV_BASE_URL),
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            default_config_path: default_config_path(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Where the base URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Flag,
    Environment,
    ConfigFile,
    Default,
}

/// Fully merged settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub config_loaded: bool,
    pub base_url: String,
    pub base_url_origin: Origin,
    pub timeout: Duration,
    pub conventions: SchemaConventions,
    pub token_inputs: TokenInputs,
}

impl Settings {
    pub fn resolve(overrides: &Overrides, env: &Environment) -> Result<Self, ConfigFileError> {
        let config_path = overrides
            .config
            .clone()
            .unwrap_or_else(|| env.default_config_path.clone());
        let file = ConfigFile::load(&config_path)?;
        if file.is_none() && overrides.config.is_some() {
            return Err(ConfigFileError::NotFound(config_path));
        }
        let config_loaded = file.is_some();
        let file = file.unwrap_or_default();

        let (base_url, base_url_origin) = if let Some(url) = &overrides.base_url {
            (url.clone(), Origin::Flag)
        } else if let Some(url) = &env.base_url {
            (url.clone(), Origin::Environment)
        } else if let Some(url) = &file.base_url {
            (url.clone(), Origin::ConfigFile)
        } else {
            (DEFAULT_BASE_URL.to_string(), Origin::Default)
        };

        let companions = match overrides.preset {
            Some(preset) => CompanionTable::preset(preset),
            None if !file.companions.is_empty() => CompanionTable::new(file.companions.clone()),
            None => CompanionTable::default(),
        };

        let conventions = SchemaConventions {
            detector: CredentialDetector::new(
                file.credential_marker
                    .clone()
                    .unwrap_or_else(|| SECRET_DEFINITION_MARKER.to_string()),
            ),
            companions,
            default_category: file
                .default_category
                .clone()
                .unwrap_or_else(|| DEFAULT_SCHEMA_CATEGORY.to_string()),
            default_color: file
                .default_color
                .clone()
                .unwrap_or_else(|| DEFAULT_SCHEMA_COLOR.to_string()),
        };

        let token_inputs = TokenInputs {
            explicit_key_file: overrides.key_file.clone(),
            env_token: env.api_key.clone(),
            working_dir: env.working_dir.clone(),
            config_key_file: file.key_file.clone(),
        };

        Ok(Self {
            config_path,
            config_loaded,
            base_url,
            base_url_origin,
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            conventions,
            token_inputs,
        })
    }

    pub fn token(&self) -> Result<ApiToken, TokenError> {
        self.token_inputs.resolve()
    }

    pub fn client_config(&self, token: &ApiToken) -> Result<ClientConfig, ConfigError> {
        Ok(ClientConfig::new(&self.base_url, token.value())?.with_timeout(self.timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_protocol::FuncRole;
    use std::fs;
    use tempfile::TempDir;

    fn env_in(dir: &TempDir) -> Environment {
        Environment {
            api_key: None,
            base_url: None,
            working_dir: dir.path().to_path_buf(),
            default_config_path: dir.path().join("config.toml"),
        }
    }

    #[test]
    fn test_defaults_without_config_file() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::resolve(&Overrides::default(), &env_in(&dir)).unwrap();
        assert!(!settings.config_loaded);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.base_url_origin, Origin::Default);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.conventions, SchemaConventions::default());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "timeout_secs = 0\n").unwrap();

        let err = Settings::resolve(&Overrides::default(), &env_in(&dir)).unwrap_err();
        assert!(matches!(err, ConfigFileError::Invalid { .. }));
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_base_url_precedence() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "base_url = \"https://config.example.test\"\n",
        )
        .unwrap();
        let mut env = env_in(&dir);

        let settings = Settings::resolve(&Overrides::default(), &env).unwrap();
        assert_eq!(settings.base_url, "https://config.example.test");
        assert_eq!(settings.base_url_origin, Origin::ConfigFile);

        env.base_url = Some("https://env.example.test".to_string());
        let settings = Settings::resolve(&Overrides::default(), &env).unwrap();
        assert_eq!(settings.base_url_origin, Origin::Environment);

        let overrides = Overrides {
            base_url: Some("https://flag.example.test".to_string()),
            ..Overrides::default()
        };
        let settings = Settings::resolve(&overrides, &env).unwrap();
        assert_eq!(settings.base_url, "https://flag.example.test");
        assert_eq!(settings.base_url_origin, Origin::Flag);
    }

    #[test]
    fn test_config_file_conventions() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            r##"
timeout_secs = 5
credential_marker = "CredentialBuilder"
default_category = "DigitalOcean"
default_color = "#0080FF"
key_file = "api.key"

[[companions]]
role = "authentication"
suffix = "-cred"
replacement = "-store"
name = "store"
display_name = "Store"
"##,
        )
        .unwrap();

        let settings = Settings::resolve(&Overrides::default(), &env_in(&dir)).unwrap();
        assert!(settings.config_loaded);
        assert_eq!(settings.timeout, Duration::from_secs(5));
        assert_eq!(settings.conventions.detector.marker(), "CredentialBuilder");
        assert_eq!(settings.conventions.default_category, "DigitalOcean");
        assert_eq!(settings.conventions.default_color, "#0080FF");
        assert_eq!(settings.conventions.companions.len(), 1);
        assert_eq!(
            settings.conventions.companions.rules[0].role,
            FuncRole::Authentication
        );
        assert_eq!(
            settings.token_inputs.config_key_file,
            Some(dir.path().join("api.key"))
        );

        // A preset flag wins over the configured table.
        let overrides = Overrides {
            preset: Some(CompanionPreset::Short),
            ..Overrides::default()
        };
        let settings = Settings::resolve(&overrides, &env_in(&dir)).unwrap();
        assert_eq!(settings.conventions.companions.len(), 2);
        assert_eq!(settings.conventions.companions.rules[0].replacement, "-auth");
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let dir = TempDir::new().unwrap();
        let overrides = Overrides {
            config: Some(dir.path().join("missing.toml")),
            ..Overrides::default()
        };
        let err = Settings::resolve(&overrides, &env_in(&dir)).unwrap_err();
        assert!(matches!(err, ConfigFileError::NotFound(_)));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_ur = \"typo\"\n").unwrap();
        let err = ConfigFile::load(&path).unwrap_err();
        assert!(matches!(err, ConfigFileError::Toml { .. }));
    }

    #[test]
    fn test_client_config_carries_timeout() {
        let dir = TempDir::new().unwrap();
        let mut env = env_in(&dir);
        env.api_key = Some("secret-token-value".to_string());
        env.base_url = Some("https://api.example.test/".to_string());

        let settings = Settings::resolve(&Overrides::default(), &env).unwrap();
        let token = settings.token().unwrap();
        let config = settings.client_config(&token).unwrap();
        assert_eq!(config.base_url(), "https://api.example.test");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.token(), "secret-token-value");
    }
}
