//! `si create-schema`: upload a schema and, for credential schemas, its
//! authentication and qualification functions.

use si::workflow::upload::DEFAULT_UPLOAD_CHANGE_SET;
use si::{upload_schema, CompanionOutcome, CompanionPreset, Settings, UploadReport, UploadRequest};
use std::path::PathBuf;

use crate::cli::context;
use crate::cli::error::{upload_error, HelpfulError};
use crate::cli::output::{print_json, print_table};

#[derive(Debug, clap::Args)]
pub struct CreateSchemaArgs {
    /// Schema source file (asset function code)
    pub source: PathBuf,

    /// Metadata JSON with name, description and link
    pub metadata: PathBuf,

    /// Change set to create the schema in (reused if it exists)
    #[arg(long, default_value = DEFAULT_UPLOAD_CHANGE_SET)]
    pub change_set: String,

    /// Category override
    #[arg(long)]
    pub category: Option<String>,

    /// Color override, e.g. #0080FF
    #[arg(long)]
    pub color: Option<String>,

    /// Companion file naming (overrides the config file's table)
    #[arg(long, value_enum)]
    pub preset: Option<CompanionPreset>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: CreateSchemaArgs, settings: &Settings) -> anyhow::Result<()> {
    let request = UploadRequest {
        source_path: args.source,
        metadata_path: args.metadata,
        change_set_name: args.change_set,
        category: args.category,
        color: args.color,
    };

    // Local files are checked before any network traffic.
    for path in [&request.source_path, &request.metadata_path] {
        if !path.is_file() {
            return Err(HelpfulError::file_not_found(path).into());
        }
    }

    let mut client = context::connect(settings)?;
    let report =
        upload_schema(&mut client, &request, &settings.conventions).map_err(upload_error)?;

    if args.json {
        return print_json(&report);
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &UploadReport) {
    println!(
        "Created schema '{}' in change set '{}' ({})",
        report.schema_name, report.change_set_name, report.change_set_id
    );
    println!("  Schema ID:          {}", report.schema_id);
    println!("  Default variant ID: {}", report.default_variant_id);

    if !report.credentials_declared {
        return;
    }

    let rows = report
        .companions
        .iter()
        .map(|outcome| match outcome {
            CompanionOutcome::Attached {
                role,
                name,
                path,
                func_id,
            } => vec![
                role.to_string(),
                name.clone(),
                path.display().to_string(),
                func_id
                    .as_ref()
                    .map(|id| format!("attached ({})", id))
                    .unwrap_or_else(|| "attached".to_string()),
            ],
            CompanionOutcome::Missing { role, path } => vec![
                role.to_string(),
                "-".to_string(),
                path.display().to_string(),
                "not found".to_string(),
            ],
        })
        .collect();
    println!();
    print_table(&["ROLE", "FUNCTION", "FILE", "STATUS"], rows);
}
