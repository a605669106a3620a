//! Public-key/config endpoint client

use std::future::Future;
use std::time::Duration;

use crate::error::ConfigFetchError;
use crate::http::{HttpTransport, OutboundRequest, ReqwestTransport};

use super::types::PublicKeyResponse;

/// Header carrying the project token on every backend call
pub const PROJECT_TOKEN_HEADER: &str = "projectToken";

const CONFIG_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for config endpoint operations (enables mocking in tests)
pub trait ConfigApi: Send + Sync {
    /// Fetch the project's public key and widget configuration
    fn fetch(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<PublicKeyResponse, ConfigFetchError>> + Send;
}

/// Backend config client
pub struct ConfigClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    base_url: String,
}

impl ConfigClient<ReqwestTransport> {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigFetchError> {
        let transport = ReqwestTransport::new(CONFIG_TIMEOUT)
            .map_err(|err| ConfigFetchError::Connectivity(err.to_string()))?;
        Ok(Self::with_transport(transport, base_url))
    }
}

impl<T: HttpTransport> ConfigClient<T> {
    pub fn with_transport(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }
}

impl<T: HttpTransport> ConfigApi for ConfigClient<T> {
    async fn fetch(&self, token: &str) -> Result<PublicKeyResponse, ConfigFetchError> {
        let request = OutboundRequest::get(format!("{}/report/public-key", self.base_url))
            .header(PROJECT_TOKEN_HEADER, token);

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|err| ConfigFetchError::Connectivity(err.to_string()))?;

        if !response.is_success() {
            return Err(ConfigFetchError::Http {
                status: response.status,
                body: response.body_text(),
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }
}
