//! `si whoami`: confirm the token and show the bound workspace.

use si::Settings;

use crate::cli::context;
use crate::cli::output::{print_fields, print_json};

#[derive(Debug, clap::Args)]
pub struct WhoamiArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: WhoamiArgs, settings: &Settings) -> anyhow::Result<()> {
    let client = context::connect(settings)?;
    let session = client.session();

    if args.json {
        return print_json(&serde_json::json!({
            "userId": session.user_id,
            "userEmail": session.user_email,
            "workspaceId": session.workspace_id,
            "role": session.role,
        }));
    }

    print_fields(&[
        ("User ID", session.user_id.clone()),
        ("User Email", session.user_email.clone()),
        ("Workspace ID", session.workspace_id.to_string()),
        ("Role", session.role.clone()),
    ]);
    Ok(())
}
