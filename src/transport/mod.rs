//! Delivery of sealed envelopes to the ingestion endpoint.


use std::future::Future;
use std::time::Duration;

use crate::config::PROJECT_TOKEN_HEADER;
use crate::crypto::EncryptedEnvelope;
use crate::error::TransportError;
use crate::http::{HttpTransport, OutboundRequest, ReqwestTransport};

const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Trait for ingestion operations (enables mocking in tests)
pub trait IngestApi: Send + Sync {
    /// Deliver a sealed envelope. The token rides in a header, never the body.
    fn send(
        &self,
        envelope: &EncryptedEnvelope,
        token: &str,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// Backend ingestion client.
///
/// Deliberately not routed through the recording proxy: the widget's own
/// submission traffic stays out of the HTTP ring it manages.
pub struct IngestClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    base_url: String,
}

impl IngestClient<ReqwestTransport> {
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(SUBMIT_TIMEOUT)
            .map_err(|err| TransportError::Connectivity(err.to_string()))?;
        Ok(Self::with_transport(transport, base_url))
    }
}

impl<T: HttpTransport> IngestClient<T> {
    pub fn with_transport(transport: T, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }
}

impl<T: HttpTransport> IngestApi for IngestClient<T> {
    async fn send(&self, envelope: &EncryptedEnvelope, token: &str) -> Result<(), TransportError> {
        let body = serde_json::to_vec(envelope)
            .map_err(|err| TransportError::Connectivity(err.to_string()))?;

        let request = OutboundRequest::post(format!("{}/report/log", self.base_url), body)
            .header("content-type", "application/json")
            .header(PROJECT_TOKEN_HEADER, token);

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|err| TransportError::Connectivity(err.to_string()))?;

        if !response.is_success() {
            return Err(TransportError::Rejected {
                status: response.status,
                detail: response.body_text(),
            });
        }
        Ok(())
    }
}
