//! HTTP API types for the System Initiative public API.
//!
//! Only the fields the tooling reads are modelled; unknown fields are ignored
//! on the way in so server-side additions do not break decoding.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use si_ids::{ChangeSetId, FuncId, JobStateId, SchemaId, SchemaVariantId, WorkspaceId};

use crate::defaults::{
    DEFAULT_SCHEMA_COLOR, SCHEMA_GENERATING_MESSAGE, SCHEMA_GENERATING_STATUS,
};

// ============================================================================
// Session
// ============================================================================

/// Response from `GET /whoami`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WhoamiResponse {
    pub user_id: String,
    pub user_email: String,
    pub workspace_id: WorkspaceId,
    pub token: WhoamiToken,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhoamiToken {
    pub role: String,
}

// ============================================================================
// Change sets
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChangeSetRequest {
    pub change_set_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChangeSetResponse {
    pub change_set: ChangeSetSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSetSummary {
    pub id: ChangeSetId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChangeSetsResponse {
    #[serde(default)]
    pub change_sets: Vec<ChangeSetSummary>,
}

impl ListChangeSetsResponse {
    /// First change set whose name equals `name` exactly.
    pub fn find_by_name(&self, name: &str) -> Option<&ChangeSetSummary> {
        self.change_sets.iter().find(|cs| cs.name == name)
    }
}

// ============================================================================
// Schemas
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSchemasRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSummary {
    pub schema_id: SchemaId,
    pub schema_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSchemasResponse {
    #[serde(default)]
    pub schemas: Vec<SchemaSummary>,
}

impl SearchSchemasResponse {
    pub fn find_by_name(&self, name: &str) -> Option<&SchemaSummary> {
        self.schemas.iter().find(|s| s.schema_name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchemaRequest {
    pub name: String,
    pub category: String,
    pub description: String,
    pub link: String,
    pub color: String,
    pub code: String,
}

impl CreateSchemaRequest {
    /// Request with the default color and an empty link.
    pub fn new(
        category: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            description: description.into(),
            link: String::new(),
            color: DEFAULT_SCHEMA_COLOR.to_string(),
            code: code.into(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchemaResponse {
    pub schema_id: SchemaId,
    pub default_variant_id: SchemaVariantId,
}

/// Outcome of `GET .../schemas/{id}`.
///
/// The service answers 202 while it materialises schema data from cached
/// modules; that is a third outcome, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDetail {
    Ready(Value),
    Generating { message: String },
}

impl SchemaDetail {
    pub fn generating() -> Self {
        SchemaDetail::Generating {
            message: SCHEMA_GENERATING_MESSAGE.to_string(),
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, SchemaDetail::Generating { .. })
    }

    /// JSON rendering; the generating case carries a `status` field.
    pub fn to_json(&self) -> Value {
        match self {
            SchemaDetail::Ready(value) => value.clone(),
            SchemaDetail::Generating { message } => serde_json::json!({
                "status": SCHEMA_GENERATING_STATUS,
                "message": message,
            }),
        }
    }
}

/// Response from `GET .../schemas/{id}/variant/default`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaVariantDefault {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<SchemaVariantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_func_id: Option<FuncId>,
    #[serde(default)]
    pub variant_func_ids: Vec<FuncId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSchemaVariantRequest {
    pub name: String,
    pub description: String,
    pub link: String,
    pub category: String,
    pub color: String,
    pub code: String,
}

// ============================================================================
// Funcs
// ============================================================================

/// Response from `GET .../funcs/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FuncDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: String,
}

/// Role a function plays when attached to a schema variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuncRole {
    Authentication,
    Qualification,
}

impl FuncRole {
    /// Trailing path segment of the attach endpoint.
    pub fn path_segment(&self) -> &'static str {
        match self {
            FuncRole::Authentication => "authentication",
            FuncRole::Qualification => "qualification",
        }
    }
}

impl fmt::Display for FuncRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path_segment())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariantFuncRequest {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariantFuncResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub func_id: Option<FuncId>,
}

// ============================================================================
// Components
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteManagementFunctionRequest {
    pub management_function: ManagementFunctionRef,
}

impl ExecuteManagementFunctionRequest {
    pub fn named(function: impl Into<String>) -> Self {
        Self {
            management_function: ManagementFunctionRef {
                function: function.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagementFunctionRef {
    pub function: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteManagementFunctionResponse {
    pub management_func_job_state_id: JobStateId,
}
