//! Per-project configuration types

use serde::{Deserialize, Serialize};

use crate::crypto::ProjectKey;

/// Report category offered in the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Report severity offered in the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Severity {
    pub id: String,
    pub name: String,
}

/// Wire shape of the public-key endpoint response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    /// RSA public key, PEM
    pub public_key: String,
    #[serde(default)]
    pub block_console_logs: bool,
    #[serde(default)]
    pub block_network_logs: bool,
    #[serde(default)]
    pub block_replay_logs: bool,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub severities: Vec<Severity>,
}

/// Immutable per-project configuration, fetched once per embed.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub block_console_logs: bool,
    pub block_network_logs: bool,
    pub block_replay_logs: bool,
    pub categories: Vec<Category>,
    pub severities: Vec<Severity>,
    /// Imported encrypt-only key handle
    pub public_key: ProjectKey,
}
