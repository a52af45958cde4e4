//! API token loading.
//!
//! Resolution order: explicit `--key-file`, `SI_API_KEY`, a `key` file in the
//! working directory, then the config file's `key_file`.

use serde::Serialize;
use si_protocol::config::redact;
use si_protocol::defaults::DEFAULT_KEY_FILE;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no API token found")]
    Missing,
    #[error("key file not found: {}", .0.display())]
    KeyFileNotFound(PathBuf),
    #[error("key file is empty: {}", .0.display())]
    KeyFileEmpty(PathBuf),
    #[error("cannot read key file {}: {source}", .path.display())]
    KeyFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the token came from; shown by `si config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum TokenSource {
    KeyFile(PathBuf),
    Environment,
    WorkingDirKeyFile(PathBuf),
    ConfigKeyFile(PathBuf),
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::KeyFile(path) => write!(f, "--key-file {}", path.display()),
            TokenSource::Environment => write!(f, "SI_API_KEY"),
            TokenSource::WorkingDirKeyFile(path) => write!(f, "key file {}", path.display()),
            TokenSource::ConfigKeyFile(path) => {
                write!(f, "config key_file {}", path.display())
            }
        }
    }
}

/// A bearer token plus its origin. `Debug` never prints the secret.
#[derive(Clone)]
pub struct ApiToken {
    value: String,
    source: TokenSource,
}

impl ApiToken {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn source(&self) -> &TokenSource {
        &self.source
    }

    pub fn redacted(&self) -> String {
        redact(&self.value)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiToken")
            .field("value", &self.redacted())
            .field("source", &self.source)
            .finish()
    }
}

/// Read a bearer token from a file, trimming surrounding whitespace.
pub fn read_api_key_from_file(path: &Path) -> Result<String, TokenError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            TokenError::KeyFileNotFound(path.to_path_buf())
        } else {
            TokenError::KeyFileUnreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let token = content.trim();
    if token.is_empty() {
        return Err(TokenError::KeyFileEmpty(path.to_path_buf()));
    }
    Ok(token.to_string())
}

/// Inputs to token resolution, captured once at startup.
#[derive(Debug, Clone, Default)]
pub struct TokenInputs {
    pub explicit_key_file: Option<PathBuf>,
    pub env_token: Option<String>,
    pub working_dir: PathBuf,
    pub config_key_file: Option<PathBuf>,
}

impl TokenInputs {
    pub fn resolve(&self) -> Result<ApiToken, TokenError> {
        if let Some(path) = &self.explicit_key_file {
            return Ok(ApiToken {
                value: read_api_key_from_file(path)?,
                source: TokenSource::KeyFile(path.clone()),
            });
        }

        if let Some(token) = self.env_token.as_deref().map(str::trim) {
            if !token.is_empty() {
                return Ok(ApiToken {
                    value: token.to_string(),
                    source: TokenSource::Environment,
                });
            }
        }

        let local = self.working_dir.join(DEFAULT_KEY_FILE);
        if local.is_file() {
            return Ok(ApiToken {
                value: read_api_key_from_file(&local)?,
                source: TokenSource::WorkingDirKeyFile(local),
            });
        }

        if let Some(path) = &self.config_key_file {
            return Ok(ApiToken {
                value: read_api_key_from_file(path)?,
                source: TokenSource::ConfigKeyFile(path.clone()),
            });
        }

        Err(TokenError::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_key_file_is_trimmed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("key");
        fs::write(&path, "  token-abc\n\n").unwrap();
        assert_eq!(read_api_key_from_file(&path).unwrap(), "token-abc");
    }

    #[test]
    fn test_key_file_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            read_api_key_from_file(&missing),
            Err(TokenError::KeyFileNotFound(_))
        ));

        let empty = dir.path().join("empty");
        fs::write(&empty, " \n").unwrap();
        assert!(matches!(
            read_api_key_from_file(&empty),
            Err(TokenError::KeyFileEmpty(_))
        ));
    }

    #[test]
    fn test_resolution_order() {
        let dir = TempDir::new().unwrap();
        let explicit = dir.path().join("explicit");
        fs::write(&explicit, "from-flag").unwrap();
        fs::write(dir.path().join("key"), "from-cwd").unwrap();

        let mut inputs = TokenInputs {
            explicit_key_file: Some(explicit),
            env_token: Some("from-env".to_string()),
            working_dir: dir.path().to_path_buf(),
            config_key_file: None,
        };
        assert_eq!(inputs.resolve().unwrap().value(), "from-flag");

        inputs.explicit_key_file = None;
        let token = inputs.resolve().unwrap();
        assert_eq!(token.value(), "from-env");
        assert_eq!(token.source(), &TokenSource::Environment);

        inputs.env_token = Some("   ".to_string());
        let token = inputs.resolve().unwrap();
        assert_eq!(token.value(), "from-cwd");
        assert!(matches!(token.source(), TokenSource::WorkingDirKeyFile(_)));
    }

    #[test]
    fn test_config_key_file_and_missing() {
        let dir = TempDir::new().unwrap();
        let configured = dir.path().join("configured");
        fs::write(&configured, "from-config").unwrap();

        let mut inputs = TokenInputs {
            working_dir: dir.path().to_path_buf(),
            config_key_file: Some(configured),
            ..TokenInputs::default()
        };
        assert_eq!(inputs.resolve().unwrap().value(), "from-config");

        inputs.config_key_file = None;
        assert!(matches!(inputs.resolve(), Err(TokenError::Missing)));
    }

    #[test]
    fn test_debug_hides_secret() {
        let token = ApiToken {
            value: "a-very-secret-token-1234".to_string(),
            source: TokenSource::Environment,
        };
        let debug = format!("{:?}", token);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("****1234"));
    }
}
