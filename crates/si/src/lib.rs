//! System Initiative schema tooling - core library
//!
//! Configuration resolution, key loading and the schema workflows shared by
//! the `si` binary and its tests.

pub mod config;
pub mod key;
pub mod metadata;
pub mod workflow;

pub use config::{ConfigFile, ConfigFileError, Environment, Origin, Overrides, Settings};
pub use key::{ApiToken, TokenError, TokenInputs, TokenSource};
pub use metadata::{MetadataError, SchemaMetadata};
pub use workflow::companion::{CompanionPreset, CompanionRule, CompanionTable};
pub use workflow::credential::CredentialDetector;
pub use workflow::inspect::{inspect_schema, FuncFetch, InspectOutcome, InspectReport};
pub use workflow::upload::{
    upload_schema, CompanionOutcome, SchemaConventions, UploadError, UploadReport, UploadRequest,
};
pub use workflow::variant::{update_default_variant, VariantUpdate, VariantUpdateReport};
