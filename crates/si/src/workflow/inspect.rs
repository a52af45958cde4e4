//! Read-only walk over one schema: search, detail, default variant and the
//! functions attached to it.

use serde::Serialize;
use serde_json::Value;
use si_client::{ClientError, SiClient, Transport};
use si_ids::{ChangeSetId, FuncId, SchemaId};
use si_protocol::{FuncDetail, SchemaDetail, SchemaSummary, SchemaVariantDefault};

pub const DEFAULT_SCHEMA_NAME: &str = "AWS::EC2::Instance";
pub const DEFAULT_INSPECT_CHANGE_SET: &str = "test-schema-lookup";

/// Search category for a qualified schema name: its first two `::` segments.
pub fn search_category(schema_name: &str) -> String {
    schema_name
        .splitn(3, "::")
        .take(2)
        .collect::<Vec<_>>()
        .join("::")
}

/// One function lookup; a failure is kept instead of aborting the walk.
#[derive(Debug, Clone, Serialize)]
pub struct FuncFetch {
    pub func_id: FuncId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub func: Option<FuncDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FuncFetch {
    fn fetch<T: Transport>(client: &SiClient<T>, func_id: &FuncId) -> Self {
        match client.get_func(func_id) {
            Ok(func) => Self {
                func_id: func_id.clone(),
                func: Some(func),
                error: None,
            },
            Err(e) => {
                tracing::warn!(func = %func_id, "Failed to fetch func: {}", e);
                Self {
                    func_id: func_id.clone(),
                    func: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaInspection {
    pub schema_id: SchemaId,
    pub detail: Value,
    pub generating: bool,
    pub variant: SchemaVariantDefault,
    pub variant_funcs: Vec<FuncFetch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_func: Option<FuncFetch>,
}

impl SchemaInspection {
    /// Code of the asset function, when it was fetched.
    pub fn asset_code(&self) -> Option<&str> {
        self.asset_func
            .as_ref()
            .and_then(|f| f.func.as_ref())
            .map(|f| f.code.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum InspectOutcome {
    Found(Box<SchemaInspection>),
    NotFound { available: Vec<SchemaSummary> },
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub change_set_id: ChangeSetId,
    pub schema_name: String,
    pub category: String,
    pub outcome: InspectOutcome,
}

/// Search for `schema_name` in its category and walk what is found.
///
/// Schema-level failures (search, detail, variant) propagate; single
/// function lookups are recorded in the report.
pub fn inspect_schema<T: Transport>(
    client: &mut SiClient<T>,
    change_set_name: &str,
    schema_name: &str,
) -> Result<InspectReport, ClientError> {
    let change_set_id = client.create_or_use_change_set(change_set_name)?;
    let category = search_category(schema_name);
    tracing::info!("Searching for '{}' in category '{}'", schema_name, category);

    let search = client.search_schemas(Some(&category))?;
    let Some(summary) = search.find_by_name(schema_name).cloned() else {
        tracing::info!("Schema '{}' not found", schema_name);
        return Ok(InspectReport {
            change_set_id,
            schema_name: schema_name.to_string(),
            category,
            outcome: InspectOutcome::NotFound {
                available: search.schemas,
            },
        });
    };

    let detail = client.get_schema(&summary.schema_id)?;
    let generating = matches!(detail, SchemaDetail::Generating { .. });
    let variant = client.get_schema_variant_default(&summary.schema_id)?;

    let variant_funcs = variant
        .variant_func_ids
        .iter()
        .map(|id| FuncFetch::fetch(client, id))
        .collect();
    let asset_func = variant
        .asset_func_id
        .as_ref()
        .map(|id| FuncFetch::fetch(client, id));

    Ok(InspectReport {
        change_set_id,
        schema_name: schema_name.to_string(),
        category,
        outcome: InspectOutcome::Found(Box::new(SchemaInspection {
            schema_id: summary.schema_id,
            detail: detail.to_json(),
            generating,
            variant,
            variant_funcs,
            asset_func,
        })),
    })
}
