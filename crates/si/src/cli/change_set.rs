//! `si change-set`: list, create and abandon change sets.

use clap::Subcommand;
use si::Settings;

use crate::cli::context;
use crate::cli::error::client_error;
use crate::cli::output::{print_json, print_table};

#[derive(Subcommand, Debug)]
pub enum ChangeSetAction {
    /// List change sets in the workspace
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a change set (reuses one with the same name)
    Create {
        /// Change set name
        name: String,
    },
    /// Delete the change set with this name
    Abandon {
        /// Change set name
        name: Option<String>,
    },
}

pub fn run(action: ChangeSetAction, settings: &Settings) -> anyhow::Result<()> {
    let mut client = context::connect(settings)?;
    match action {
        ChangeSetAction::List { json } => {
            let change_sets = client.list_change_sets().map_err(client_error)?;
            if json {
                return print_json(&change_sets);
            }
            if change_sets.is_empty() {
                println!("No change sets.");
                return Ok(());
            }
            let rows = change_sets
                .into_iter()
                .map(|cs| {
                    vec![
                        cs.id.to_string(),
                        cs.name,
                        cs.status.unwrap_or_default(),
                    ]
                })
                .collect();
            print_table(&["ID", "NAME", "STATUS"], rows);
        }
        ChangeSetAction::Create { name } => {
            let id = client
                .create_or_use_change_set(&name)
                .map_err(client_error)?;
            println!("Change set '{}': {}", name, id);
        }
        ChangeSetAction::Abandon { name } => {
            match client
                .abandon_change_set(name.as_deref())
                .map_err(client_error)?
            {
                Some(id) => println!("Abandoned change set {}", id),
                None => {
                    anyhow::bail!(
                        "No change set named '{}'",
                        name.as_deref().unwrap_or_default()
                    )
                }
            }
        }
    }
    Ok(())
}
