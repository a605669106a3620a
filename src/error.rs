//! Error taxonomy for the report pipeline.

use thiserror::Error;

/// Failure loading per-project configuration or importing the public key.
///
/// Fatal to submission: without a usable public key nothing can be sealed,
/// so no widget is constructed at all.
#[derive(Debug, Error)]
pub enum ConfigFetchError {
    #[error("config endpoint returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("config request failed: {0}")]
    Connectivity(String),

    #[error("malformed config body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid public key material: {0}")]
    Key(String),
}

/// A submission rejected before any cryptographic or network work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a category must be selected")]
    MissingCategory,

    #[error("a severity must be selected")]
    MissingSeverity,
}

/// Failure in any step of the envelope encryption pipeline. No partial
/// envelope ever leaves the process when this is returned.
#[derive(Debug, Error)]
#[error("encryption failed: {reason}")]
pub struct EncryptionError {
    pub(crate) reason: String,
}

impl EncryptionError {
    pub(crate) fn step(step: &str, source: impl std::fmt::Display) -> Self {
        Self {
            reason: format!("{step}: {source}"),
        }
    }
}

/// Failure delivering a sealed envelope.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The backend answered with a non-2xx status; `detail` carries its
    /// response body verbatim.
    #[error("ingestion rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// The request never produced an HTTP response.
    #[error("could not reach ingestion endpoint: {0}")]
    Connectivity(String),
}

/// Union of everything the submit boundary can catch. Converted into a
/// displayable outcome there; never propagated to the host.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error(transparent)]
    Config(#[from] ConfigFetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Encryption(#[from] EncryptionError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
