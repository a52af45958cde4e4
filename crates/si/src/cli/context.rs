//! Per-invocation context: merged settings and the connected client.

use anyhow::Context as _;
use si::{Environment, Overrides, Settings};
use si_client::SiClient;

use crate::cli::error::{client_error, HelpfulError};

/// Resolve settings from global flags and the process environment.
pub fn load_settings(overrides: &Overrides) -> anyhow::Result<Settings> {
    Settings::resolve(overrides, &Environment::capture()).map_err(|e| HelpfulError::from(e).into())
}

/// Resolve the token, build the client config and confirm the session.
pub fn connect(settings: &Settings) -> anyhow::Result<SiClient> {
    let token = settings.token().map_err(HelpfulError::from)?;
    tracing::debug!("Using API token from {}", token.source());
    let config = settings
        .client_config(&token)
        .with_context(|| format!("Invalid base URL: {}", settings.base_url))?;
    SiClient::connect(config).map_err(client_error)
}

/// Connect and, when `change_set` is given, select or create it.
pub fn connect_in(settings: &Settings, change_set: Option<&str>) -> anyhow::Result<SiClient> {
    let mut client = connect(settings)?;
    if let Some(name) = change_set {
        client
            .create_or_use_change_set(name)
            .map_err(client_error)?;
    }
    Ok(client)
}
