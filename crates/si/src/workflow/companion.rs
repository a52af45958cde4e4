//! Companion-file derivation for credential schemas.
//!
//! A credential schema `foo-credential-schema.js` ships its authentication
//! and qualification functions as sibling files. Each [`CompanionRule`] maps
//! the main file name to one sibling by literal suffix replacement on the
//! file stem; the rules live in a [`CompanionTable`] so the naming
//! convention can change without code changes.

use serde::{Deserialize, Serialize};
use si_protocol::FuncRole;
use std::path::{Path, PathBuf};

pub const CREDENTIAL_SCHEMA_SUFFIX: &str = "-credential-schema";

/// One sibling file and the function it becomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionRule {
    pub role: FuncRole,
    /// Stem suffix of the main file that gets replaced.
    pub suffix: String,
    /// Replacement stem suffix for the companion file.
    pub replacement: String,
    /// Function name registered on the variant.
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
}

impl CompanionRule {
    /// Path of the companion file for `main`.
    ///
    /// When the stem does not end with `suffix` the replacement is appended
    /// instead, which yields a name that normally does not exist; callers
    /// report that as "not found".
    pub fn companion_path(&self, main: &Path) -> PathBuf {
        let stem = main
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base = stem.strip_suffix(self.suffix.as_str()).unwrap_or(stem.as_str());
        let mut file_name = format!("{}{}", base, self.replacement);
        if let Some(ext) = main.extension() {
            file_name.push('.');
            file_name.push_str(&ext.to_string_lossy());
        }
        main.with_file_name(file_name)
    }
}

/// Built-in naming conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CompanionPreset {
    /// `-auth-func` / `-qualification-func`
    Func,
    /// `-auth` / `-qualification`
    Short,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionTable {
    pub rules: Vec<CompanionRule>,
}

impl CompanionTable {
    pub fn new(rules: Vec<CompanionRule>) -> Self {
        Self { rules }
    }

    pub fn preset(preset: CompanionPreset) -> Self {
        match preset {
            CompanionPreset::Func => Self::with_replacements("-auth-func", "-qualification-func"),
            CompanionPreset::Short => Self::with_replacements("-auth", "-qualification"),
        }
    }

    fn with_replacements(auth: &str, qualification: &str) -> Self {
        Self::new(vec![
            CompanionRule {
                role: FuncRole::Authentication,
                suffix: CREDENTIAL_SCHEMA_SUFFIX.to_string(),
                replacement: auth.to_string(),
                name: "digitalOceanStoreCreds".to_string(),
                display_name: "Store DigitalOcean Credentials".to_string(),
                description: "Stores the DigitalOcean API token for use by other functions"
                    .to_string(),
            },
            CompanionRule {
                role: FuncRole::Qualification,
                suffix: CREDENTIAL_SCHEMA_SUFFIX.to_string(),
                replacement: qualification.to_string(),
                name: "digitalOceanCheckCreds".to_string(),
                display_name: "Check DigitalOcean Credentials".to_string(),
                description: "Verifies the DigitalOcean API token".to_string(),
            },
        ])
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every rule paired with its derived path, in table order.
    pub fn derive_all<'a>(&'a self, main: &Path) -> Vec<(&'a CompanionRule, PathBuf)> {
        self.rules
            .iter()
            .map(|rule| (rule, rule.companion_path(main)))
            .collect()
    }
}

impl Default for CompanionTable {
    fn default() -> Self {
        Self::preset(CompanionPreset::Func)
    }
}
