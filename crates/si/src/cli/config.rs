//! `si config`: show the resolved configuration.

use serde_json::json;
use si::Settings;
use si_protocol::paths::{default_logs_dir, si_home};

use crate::cli::output::{print_fields, print_json, print_table};

/// Arguments for the config command
#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Show resolved settings in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the config command. Never touches the network; the token is shown
/// redacted.
pub fn run(args: ConfigArgs, settings: &Settings) -> anyhow::Result<()> {
    let token = settings.token();
    let conventions = &settings.conventions;

    if args.json {
        let token_json = match &token {
            Ok(token) => json!({
                "source": token.source(),
                "value": token.redacted(),
            }),
            Err(e) => json!({ "error": e.to_string() }),
        };
        return print_json(&json!({
            "home": si_home().to_string_lossy(),
            "config_file": {
                "path": settings.config_path.to_string_lossy(),
                "loaded": settings.config_loaded,
            },
            "base_url": {
                "value": settings.base_url,
                "origin": settings.base_url_origin,
            },
            "timeout_secs": settings.timeout.as_secs(),
            "token": token_json,
            "credential_marker": conventions.detector.marker(),
            "default_category": conventions.default_category,
            "default_color": conventions.default_color,
            "companions": conventions.companions.rules,
            "logs": default_logs_dir().to_string_lossy(),
        }));
    }

    let token_line = match &token {
        Ok(token) => format!("{} (from {})", token.redacted(), token.source()),
        Err(e) => format!("not available: {}", e),
    };
    let config_line = if settings.config_loaded {
        settings.config_path.display().to_string()
    } else {
        format!("{} (not present)", settings.config_path.display())
    };

    print_fields(&[
        ("Home", si_home().display().to_string()),
        ("Config file", config_line),
        (
            "Base URL",
            format!("{} ({:?})", settings.base_url, settings.base_url_origin),
        ),
        ("Timeout", format!("{}s", settings.timeout.as_secs())),
        ("API token", token_line),
        ("Credential marker", conventions.detector.marker().to_string()),
        ("Default category", conventions.default_category.clone()),
        ("Default color", conventions.default_color.clone()),
        ("Logs", default_logs_dir().display().to_string()),
    ]);

    println!();
    let rows = conventions
        .companions
        .rules
        .iter()
        .map(|rule| {
            vec![
                rule.role.to_string(),
                format!("{} → {}", rule.suffix, rule.replacement),
                rule.name.clone(),
            ]
        })
        .collect();
    print_table(&["ROLE", "SUFFIX", "FUNCTION"], rows);
    Ok(())
}
