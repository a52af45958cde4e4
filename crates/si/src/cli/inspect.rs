//! `si inspect`: look a schema up by name and print its default variant and
//! functions.

use si::workflow::inspect::{
    inspect_schema, FuncFetch, InspectOutcome, SchemaInspection, DEFAULT_INSPECT_CHANGE_SET,
    DEFAULT_SCHEMA_NAME,
};
use si::Settings;

use crate::cli::context;
use crate::cli::error::client_error;
use crate::cli::output::{first_line, print_json, print_table};

#[derive(Debug, clap::Args)]
pub struct InspectArgs {
    /// Fully qualified schema name
    #[arg(default_value = DEFAULT_SCHEMA_NAME)]
    pub schema_name: String,

    /// Change set to inspect in (reused if it exists)
    #[arg(long, default_value = DEFAULT_INSPECT_CHANGE_SET)]
    pub change_set: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: InspectArgs, settings: &Settings) -> anyhow::Result<()> {
    let mut client = context::connect(settings)?;
    if !args.json {
        println!("{}", client.session());
    }

    let report =
        inspect_schema(&mut client, &args.change_set, &args.schema_name).map_err(client_error)?;

    if args.json {
        return print_json(&report);
    }

    println!(
        "Change set: {} ({})",
        args.change_set, report.change_set_id
    );
    match &report.outcome {
        InspectOutcome::NotFound { available } => {
            println!(
                "Schema '{}' not found in category '{}'",
                report.schema_name, report.category
            );
            if available.is_empty() {
                println!("No schemas available in this category.");
            } else {
                println!("Available schemas:");
                let rows = available
                    .iter()
                    .map(|s| vec![s.schema_name.clone(), s.schema_id.to_string()])
                    .collect();
                print_table(&["NAME", "ID"], rows);
            }
        }
        InspectOutcome::Found(inspection) => print_inspection(&report.schema_name, inspection),
    }
    Ok(())
}

fn print_inspection(name: &str, inspection: &SchemaInspection) {
    println!("Schema '{}' ({})", name, inspection.schema_id);
    if inspection.generating {
        println!("  Schema data is still being generated; detail may be incomplete.");
    }

    let variant = &inspection.variant;
    if let Some(id) = &variant.variant_id {
        println!("  Default variant: {}", id);
    }
    if let Some(display_name) = &variant.display_name {
        println!("  Display name:    {}", display_name);
    }
    if let Some(category) = &variant.category {
        println!("  Category:        {}", category);
    }

    if !inspection.variant_funcs.is_empty() {
        println!();
        let rows = inspection.variant_funcs.iter().map(func_row).collect();
        print_table(&["FUNC ID", "NAME", "KIND", "STATUS"], rows);
    }

    match (&inspection.asset_func, inspection.asset_code()) {
        (_, Some(code)) => {
            println!();
            println!("Asset function code:");
            println!("{}", code);
        }
        (Some(FuncFetch { error: Some(e), .. }), None) => {
            println!();
            println!("Asset function could not be fetched: {}", e);
        }
        _ => {}
    }
}

fn func_row(fetch: &FuncFetch) -> Vec<String> {
    match (&fetch.func, &fetch.error) {
        (Some(func), _) => vec![
            fetch.func_id.to_string(),
            func.name.clone().unwrap_or_default(),
            func.kind.clone().unwrap_or_default(),
            "ok".to_string(),
        ],
        (None, error) => vec![
            fetch.func_id.to_string(),
            String::new(),
            String::new(),
            first_line(error.as_deref().unwrap_or("failed"), 60),
        ],
    }
}
