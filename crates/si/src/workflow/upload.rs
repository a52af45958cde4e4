//! Schema upload: change set → schema → companion functions.
//!
//! The schema is created first. Companion functions are only looked up when
//! the source declares credentials; a missing companion is recorded in the
//! report and logged, never raised, because the schema is already
//! committed to the change set by then.

use serde::Serialize;
use si_client::{ClientError, SiClient, Transport};
use si_ids::{ChangeSetId, FuncId, SchemaId, SchemaVariantId};
use si_protocol::defaults::{DEFAULT_SCHEMA_CATEGORY, DEFAULT_SCHEMA_COLOR};
use si_protocol::{CreateSchemaRequest, CreateVariantFuncRequest, FuncRole};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::metadata::{MetadataError, SchemaMetadata};
use crate::workflow::companion::{CompanionRule, CompanionTable};
use crate::workflow::credential::CredentialDetector;

pub const DEFAULT_UPLOAD_CHANGE_SET: &str = "Add schema";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("cannot read schema source {}: {source}", .path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error("cannot read {role} function file {}: {source}", .path.display())]
    Companion {
        role: FuncRole,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Naming and defaults that shape an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConventions {
    pub detector: CredentialDetector,
    pub companions: CompanionTable,
    pub default_category: String,
    pub default_color: String,
}

impl Default for SchemaConventions {
    fn default() -> Self {
        Self {
            detector: CredentialDetector::default(),
            companions: CompanionTable::default(),
            default_category: DEFAULT_SCHEMA_CATEGORY.to_string(),
            default_color: DEFAULT_SCHEMA_COLOR.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub source_path: PathBuf,
    pub metadata_path: PathBuf,
    pub change_set_name: String,
    /// Overrides metadata and convention defaults.
    pub category: Option<String>,
    pub color: Option<String>,
}

impl UploadRequest {
    pub fn new(source_path: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            metadata_path: metadata_path.into(),
            change_set_name: DEFAULT_UPLOAD_CHANGE_SET.to_string(),
            category: None,
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompanionOutcome {
    Attached {
        role: FuncRole,
        name: String,
        path: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        func_id: Option<FuncId>,
    },
    Missing {
        role: FuncRole,
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub change_set_id: ChangeSetId,
    pub change_set_name: String,
    pub schema_name: String,
    pub schema_id: SchemaId,
    pub default_variant_id: SchemaVariantId,
    pub credentials_declared: bool,
    pub companions: Vec<CompanionOutcome>,
}

impl UploadReport {
    pub fn missing(&self) -> impl Iterator<Item = &CompanionOutcome> {
        self.companions
            .iter()
            .filter(|c| matches!(c, CompanionOutcome::Missing { .. }))
    }

    pub fn attached(&self) -> impl Iterator<Item = &CompanionOutcome> {
        self.companions
            .iter()
            .filter(|c| matches!(c, CompanionOutcome::Attached { .. }))
    }
}

/// Companion files to look for: one per rule when the source declares
/// credentials, none otherwise.
pub fn companion_lookups<'a>(
    detector: &CredentialDetector,
    table: &'a CompanionTable,
    source_path: &Path,
    source: &str,
) -> Vec<(&'a CompanionRule, PathBuf)> {
    if detector.declares_credentials(source) {
        table.derive_all(source_path)
    } else {
        Vec::new()
    }
}

/// Run the full upload against `client`, selecting or creating the change
/// set named in `request`.
pub fn upload_schema<T: Transport>(
    client: &mut SiClient<T>,
    request: &UploadRequest,
    conventions: &SchemaConventions,
) -> Result<UploadReport, UploadError> {
    let source = std::fs::read_to_string(&request.source_path).map_err(|source| {
        UploadError::Source {
            path: request.source_path.clone(),
            source,
        }
    })?;
    let metadata = SchemaMetadata::load(&request.metadata_path)?;

    let change_set_id = client.create_or_use_change_set(&request.change_set_name)?;

    let category = request
        .category
        .clone()
        .or_else(|| metadata.category.clone())
        .unwrap_or_else(|| conventions.default_category.clone());
    let color = request
        .color
        .clone()
        .or_else(|| metadata.color.clone())
        .unwrap_or_else(|| conventions.default_color.clone());

    let schema = CreateSchemaRequest::new(
        category,
        source.as_str(),
        metadata.name.as_str(),
        metadata.description.as_str(),
    )
    .with_color(color)
    .with_link(metadata.link.as_str());
    let created = client.create_schema(&schema)?;

    let lookups = companion_lookups(
        &conventions.detector,
        &conventions.companions,
        &request.source_path,
        &source,
    );
    if lookups.is_empty() {
        tracing::debug!("Schema does not declare credentials; no companion functions");
    }

    let mut companions = Vec::with_capacity(lookups.len());
    for (rule, path) in lookups {
        if !path.is_file() {
            tracing::warn!("{} function file not found: {}", rule.role, path.display());
            companions.push(CompanionOutcome::Missing {
                role: rule.role,
                path,
            });
            continue;
        }

        let code = std::fs::read_to_string(&path).map_err(|source| UploadError::Companion {
            role: rule.role,
            path: path.clone(),
            source,
        })?;
        let func = CreateVariantFuncRequest {
            name: rule.name.clone(),
            display_name: rule.display_name.clone(),
            description: rule.description.clone(),
            code,
        };
        let attached = client.create_schema_variant_func(
            rule.role,
            &created.schema_id,
            &created.default_variant_id,
            &func,
        )?;
        companions.push(CompanionOutcome::Attached {
            role: rule.role,
            name: rule.name.clone(),
            path,
            func_id: attached.func_id,
        });
    }

    Ok(UploadReport {
        change_set_id,
        change_set_name: request.change_set_name.clone(),
        schema_name: metadata.name,
        schema_id: created.schema_id,
        default_variant_id: created.default_variant_id,
        credentials_declared: conventions.detector.declares_credentials(&source),
        companions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookups_only_for_credential_sources() {
        let detector = CredentialDetector::default();
        let table = CompanionTable::default();
        let path = Path::new("foo-credential-schema.js");

        let with_marker = companion_lookups(
            &detector,
            &table,
            path,
            "const s = new SecretDefinitionBuilder();",
        );
        assert_eq!(with_marker.len(), 2);
        assert_eq!(with_marker[0].1, PathBuf::from("foo-auth-func.js"));
        assert_eq!(with_marker[1].1, PathBuf::from("foo-qualification-func.js"));

        let without = companion_lookups(&detector, &table, path, "new AssetBuilder()");
        assert!(without.is_empty());
    }

    #[test]
    fn test_outcome_serialization() {
        let missing = CompanionOutcome::Missing {
            role: FuncRole::Authentication,
            path: PathBuf::from("foo-auth-func.js"),
        };
        let json = serde_json::to_value(&missing).unwrap();
        assert_eq!(json["outcome"], "missing");
        assert_eq!(json["role"], "authentication");
    }
}
