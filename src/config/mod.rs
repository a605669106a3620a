//! Per-project configuration: fetched once per embed, immutable afterwards.

mod client;
mod types;


pub use client::{ConfigApi, ConfigClient, PROJECT_TOKEN_HEADER};
pub use types::{Category, ProjectConfig, PublicKeyResponse, Severity};

use crate::crypto::ProjectKey;
use crate::error::ConfigFetchError;

/// Fetch configuration and import the project public key.
///
/// Nothing can be submitted before this resolves; a failure here disables
/// the widget for the rest of the page's lifetime.
pub async fn load_config(
    api: &impl ConfigApi,
    token: &str,
) -> Result<ProjectConfig, ConfigFetchError> {
    let response = api.fetch(token).await?;
    let public_key = ProjectKey::from_pem(&response.public_key)?;
    Ok(ProjectConfig {
        block_console_logs: response.block_console_logs,
        block_network_logs: response.block_network_logs,
        block_replay_logs: response.block_replay_logs,
        categories: response.categories,
        severities: response.severities,
        public_key,
    })
}

/// Read the project token from embed attributes (`data-project-token`),
/// falling back to the empty string.
pub fn project_token_from_attrs<'a, I>(attrs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    attrs
        .into_iter()
        .find(|(key, _)| *key == "data-project-token")
        .map(|(_, value)| value.to_string())
        .unwrap_or_default()
}
