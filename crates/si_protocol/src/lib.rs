//! System Initiative public API protocol
//!
//! Request and response bodies for the `/whoami` and `/v1/w/{workspace}`
//! endpoints, plus the client configuration and local path conventions shared
//! by the client library and the CLI.
//!
//! All JSON on the wire is camelCase.

pub mod config;
pub mod defaults;
pub mod http_types;
pub mod paths;

pub use config::{ClientConfig, ConfigError};
pub use http_types::{
    ChangeSetSummary, CreateChangeSetRequest, CreateChangeSetResponse, CreateSchemaRequest,
    CreateSchemaResponse, CreateVariantFuncRequest, CreateVariantFuncResponse,
    ExecuteManagementFunctionRequest, ExecuteManagementFunctionResponse, FuncDetail, FuncRole,
    ListChangeSetsResponse, ManagementFunctionRef, SchemaDetail, SchemaSummary,
    SchemaVariantDefault, SearchSchemasRequest, SearchSchemasResponse, UpdateSchemaVariantRequest,
    WhoamiResponse, WhoamiToken,
};
pub use si_ids::{
    ChangeSetId, ComponentId, FuncId, IdParseError, JobStateId, SchemaId, SchemaVariantId,
    WorkspaceId,
};
