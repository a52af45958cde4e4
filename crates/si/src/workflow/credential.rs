//! Credential-schema detection.
//!
//! A schema "needs credentials" when its source text contains the secret
//! definition marker. The match is a plain substring test; nothing parses the
//! source.

/// Marker emitted by asset functions that declare a secret definition.
pub const SECRET_DEFINITION_MARKER: &str = "SecretDefinitionBuilder";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDetector {
    marker: String,
}

impl CredentialDetector {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// True when `source` declares a secret/credential definition.
    pub fn declares_credentials(&self, source: &str) -> bool {
        !self.marker.is_empty() && source.contains(&self.marker)
    }
}

impl Default for CredentialDetector {
    fn default() -> Self {
        Self::new(SECRET_DEFINITION_MARKER)
    }
}
