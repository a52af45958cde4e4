//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use si::{ConfigFileError, MetadataError, TokenError, UploadError};
use si_client::ClientError;
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// No token from any source
    pub fn missing_token() -> Self {
        Self::new("Set SI_API_KEY environment variable or create a 'key' file")
            .with_context("No API token was found on the command line, in the environment, in ./key or in the config file")
            .with_suggestions([
                "TRY: export SI_API_KEY=<your token>",
                "TRY: Save the token to ./key",
                "TRY: Point at a token file: si --key-file PATH <command>",
            ])
    }

    pub fn key_file_not_found(path: &Path) -> Self {
        Self::new(format!("Key file not found: {}", path.display()))
            .with_context("The key file named on the command line or in the config does not exist")
            .with_suggestions([
                format!("TRY: Check that the file exists: ls -la {}", path.display()),
                "TRY: Use SI_API_KEY instead of a key file".to_string(),
            ])
    }

    pub fn key_file_empty(path: &Path) -> Self {
        Self::new(format!("Key file is empty: {}", path.display()))
            .with_suggestion("TRY: Write your API token into the file")
    }

    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The specified file does not exist")
            .with_suggestions([
                format!("TRY: Check if the file exists: ls -la {}", path.display()),
                format!(
                    "TRY: Look for similar files: ls {}",
                    path.parent()
                        .filter(|p| !p.as_os_str().is_empty())
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| ".".to_string())
                ),
            ])
    }

    pub fn cannot_read_file(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot read file: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestion(format!("TRY: Check file permissions: ls -la {}", path.display()))
    }

    pub fn invalid_metadata(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid schema metadata: {}", details))
            .with_context(format!("Failed to parse metadata file: {}", path.display()))
            .with_suggestions([
                "TRY: Metadata needs string fields \"name\", \"description\" and \"link\"",
                "TRY: Optional fields: \"category\", \"color\"",
            ])
    }

    pub fn invalid_json(what: &str, details: &str) -> Self {
        Self::new(format!("Invalid JSON for {}: {}", what, details))
            .with_suggestion("TRY: Quote the payload for your shell, e.g. '{\"key\": \"value\"}'")
    }

    pub fn invalid_id(kind: &str, value: &str, details: &str) -> Self {
        Self::new(format!("Invalid {} '{}': {}", kind, value, details))
            .with_suggestion("TRY: Copy the id from `si change-set list` or `si schema search`")
    }

    pub fn no_change_set(operation: &str) -> Self {
        Self::new(format!("Cannot {}: no change set selected", operation))
            .with_context("Schema, function and component operations run inside a change set")
            .with_suggestion("TRY: Add --change-set NAME (created if it does not exist)")
    }

    pub fn invalid_config(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid config file: {}", details))
            .with_context(format!("While reading {}", path.display()))
            .with_suggestion("TRY: Show the resolved configuration: si config")
    }
}

impl From<TokenError> for HelpfulError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => Self::missing_token(),
            TokenError::KeyFileNotFound(path) => Self::key_file_not_found(&path),
            TokenError::KeyFileEmpty(path) => Self::key_file_empty(&path),
            TokenError::KeyFileUnreadable { path, source } => {
                Self::cannot_read_file(&path, &source.to_string())
            }
        }
    }
}

impl From<MetadataError> for HelpfulError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::Read { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                Self::file_not_found(&path)
            }
            MetadataError::Read { path, source } => Self::cannot_read_file(&path, &source.to_string()),
            MetadataError::Parse { path, source } => Self::invalid_metadata(&path, &source.to_string()),
        }
    }
}

impl From<ConfigFileError> for HelpfulError {
    fn from(err: ConfigFileError) -> Self {
        match err {
            ConfigFileError::NotFound(path) => Self::file_not_found(&path),
            ConfigFileError::Io { path, source } => Self::cannot_read_file(&path, &source.to_string()),
            ConfigFileError::Toml { path, source } => Self::invalid_config(&path, &source.to_string()),
            ConfigFileError::Invalid { path, message } => Self::invalid_config(&path, &message),
        }
    }
}

/// Turn an upload failure into something printable.
///
/// Local file problems become `HelpfulError`; service errors keep their
/// status and body.
pub fn upload_error(err: UploadError) -> anyhow::Error {
    match err {
        UploadError::Source { path, source } | UploadError::Companion { path, source, .. }
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            HelpfulError::file_not_found(&path).into()
        }
        UploadError::Source { path, source } | UploadError::Companion { path, source, .. } => {
            HelpfulError::cannot_read_file(&path, &source.to_string()).into()
        }
        UploadError::Metadata(err) => HelpfulError::from(err).into(),
        UploadError::Client(err) => client_error(err),
    }
}

pub fn client_error(err: ClientError) -> anyhow::Error {
    let missing_change_set = err.is_missing_change_set();
    match err {
        ClientError::Precondition { operation, .. } if missing_change_set => {
            HelpfulError::no_change_set(operation).into()
        }
        ClientError::Precondition { operation, reason } => {
            HelpfulError::new(format!("Cannot {}: {}", operation, reason)).into()
        }
        other => other.into(),
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_helpful_error_display() {
        let err = HelpfulError::new("Something went wrong")
            .with_context("While uploading")
            .with_suggestion("Try again");

        let display = format!("{}", err);
        assert!(display.contains("ERROR: Something went wrong"));
        assert!(display.contains("CONTEXT: While uploading"));
        assert!(display.contains("Try again"));
    }

    #[test]
    fn test_missing_token_mentions_env_var() {
        let display = HelpfulError::from(TokenError::Missing).to_string();
        assert!(display.contains("Set SI_API_KEY"));
        assert!(display.contains("TRY:"));
    }

    #[test]
    fn test_missing_source_file() {
        let err = upload_error(UploadError::Source {
            path: PathBuf::from("schemas/foo.js"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        let display = err.to_string();
        assert!(display.contains("File not found: schemas/foo.js"));
    }

    #[test]
    fn test_precondition_suggests_change_set_flag() {
        let err = client_error(ClientError::no_change_set("search schemas"));
        assert!(err.to_string().contains("--change-set"));
    }

    #[test]
    fn test_request_errors_pass_through() {
        let err = client_error(ClientError::Request {
            operation: "create schema",
            status: 500,
            body: "boom".to_string(),
        });
        assert_eq!(err.to_string(), "Failed to create schema: 500 - boom");
    }
}
