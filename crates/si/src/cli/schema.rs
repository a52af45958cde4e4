//! `si schema`: search schemas and read schema, variant and function detail.

use clap::Subcommand;
use si::{update_default_variant, Settings, VariantUpdate};
use si_ids::{FuncId, SchemaId};
use si_protocol::SchemaDetail;
use std::path::PathBuf;

use crate::cli::context;
use crate::cli::error::{client_error, upload_error, HelpfulError};
use crate::cli::output::{print_json, print_table};

#[derive(Debug, clap::Args)]
pub struct SchemaArgs {
    /// Change set to work in (created if it does not exist)
    #[arg(long, global = true)]
    pub change_set: Option<String>,

    #[command(subcommand)]
    pub action: SchemaAction,
}

#[derive(Subcommand, Debug)]
pub enum SchemaAction {
    /// Search schemas, optionally within a category
    Search {
        /// Category, e.g. AWS::EC2
        #[arg(long)]
        category: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show schema detail
    Get {
        /// Schema ID
        id: String,
    },
    /// Show the default variant of a schema
    Variant {
        /// Schema ID
        id: String,
    },
    /// Show a function and its code
    Func {
        /// Function ID
        id: String,
    },
    /// Replace the default variant's code and metadata
    UpdateVariant {
        /// Schema ID
        id: String,

        /// New schema source file
        source: PathBuf,

        /// Metadata JSON with name, description and link
        metadata: PathBuf,

        /// Category override
        #[arg(long)]
        category: Option<String>,

        /// Color override
        #[arg(long)]
        color: Option<String>,
    },
}

pub fn run(args: SchemaArgs, settings: &Settings) -> anyhow::Result<()> {
    if let SchemaAction::UpdateVariant {
        source, metadata, ..
    } = &args.action
    {
        for path in [source, metadata] {
            if !path.is_file() {
                return Err(HelpfulError::file_not_found(path).into());
            }
        }
    }

    let client = context::connect_in(settings, args.change_set.as_deref())?;
    match args.action {
        SchemaAction::Search { category, json } => {
            let found = client
                .search_schemas(category.as_deref())
                .map_err(client_error)?;
            if json {
                return print_json(&found);
            }
            if found.schemas.is_empty() {
                println!("No schemas found.");
                return Ok(());
            }
            let rows = found
                .schemas
                .into_iter()
                .map(|s| {
                    vec![
                        s.schema_name,
                        s.schema_id.to_string(),
                        s.category.unwrap_or_default(),
                        s.installed.map(|i| i.to_string()).unwrap_or_default(),
                    ]
                })
                .collect();
            print_table(&["NAME", "ID", "CATEGORY", "INSTALLED"], rows);
        }
        SchemaAction::Get { id } => {
            let schema_id = parse_schema_id(&id)?;
            let detail = client.get_schema(&schema_id).map_err(client_error)?;
            if let SchemaDetail::Generating { message } = &detail {
                eprintln!("{}", message);
            }
            print_json(&detail.to_json())?;
        }
        SchemaAction::Variant { id } => {
            let schema_id = parse_schema_id(&id)?;
            let variant = client
                .get_schema_variant_default(&schema_id)
                .map_err(client_error)?;
            print_json(&variant)?;
        }
        SchemaAction::Func { id } => {
            let func_id = FuncId::parse(&id)
                .map_err(|e| HelpfulError::invalid_id("function id", &id, &e.to_string()))?;
            let func = client.get_func(&func_id).map_err(client_error)?;
            print_json(&func)?;
        }
        SchemaAction::UpdateVariant {
            id,
            source,
            metadata,
            category,
            color,
        } => {
            let update = VariantUpdate {
                schema_id: parse_schema_id(&id)?,
                source_path: source,
                metadata_path: metadata,
                category,
                color,
            };
            let report = update_default_variant(&client, &update, &settings.conventions)
                .map_err(upload_error)?;
            println!(
                "Updated schema {} variant {}",
                report.schema_id, report.variant_id
            );
        }
    }
    Ok(())
}

fn parse_schema_id(id: &str) -> anyhow::Result<SchemaId> {
    SchemaId::parse(id)
        .map_err(|e| HelpfulError::invalid_id("schema id", id, &e.to_string()).into())
}
