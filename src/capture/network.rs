//! HTTP capture: a recording proxy over the transport seam.
//!
//! The proxy must be invisible to its caller: identical statuses, headers,
//! bodies, and errors, with recording as the only side effect. Failures are
//! logged and then re-raised, never swallowed.

use chrono::Utc;
use std::sync::Arc;

use crate::http::{HttpFailure, HttpTransport, OutboundRequest, WireResponse};

use super::types::{HeaderEntry, HttpKind, HttpLogEntry};
use super::CaptureSession;

/// Recording proxy over an [`HttpTransport`].
pub struct RecordedClient<T: HttpTransport> {
    inner: T,
    session: Arc<CaptureSession>,
}

impl<T: HttpTransport> RecordedClient<T> {
    pub(crate) fn new(inner: T, session: Arc<CaptureSession>) -> Self {
        Self { inner, session }
    }

    /// Execute a request, recording the exchange. The returned result is
    /// exactly what the inner transport produced.
    pub async fn execute(&self, request: OutboundRequest) -> Result<WireResponse, HttpFailure> {
        let method = request.method.clone();
        let url = request.url.clone();
        let request_headers = header_entries(&request.headers);

        match self.inner.execute(request).await {
            Ok(response) => {
                self.session
                    .push_http(success_entry(&method, &url, request_headers, &response));
                Ok(response)
            }
            Err(err) => {
                self.session
                    .push_http(failure_entry(&method, &url, request_headers));
                Err(err)
            }
        }
    }
}

fn header_entries(headers: &[(String, String)]) -> Vec<HeaderEntry> {
    headers
        .iter()
        .map(|(key, value)| HeaderEntry {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

/// Best-effort body decode: JSON when parseable, raw text otherwise
fn decode_body(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()))
}

pub(crate) fn success_entry(
    method: &str,
    url: &str,
    request_headers: Vec<HeaderEntry>,
    response: &WireResponse,
) -> HttpLogEntry {
    HttpLogEntry {
        kind: HttpKind::Fetch,
        method: method.to_string(),
        url: url.to_string(),
        status: response.status,
        status_text: response.status_text.clone(),
        timestamp: Utc::now(),
        request_headers,
        response_headers: header_entries(&response.headers),
        response_body: decode_body(&response.body),
    }
}

pub(crate) fn failure_entry(
    method: &str,
    url: &str,
    request_headers: Vec<HeaderEntry>,
) -> HttpLogEntry {
    HttpLogEntry {
        kind: HttpKind::Fetch,
        method: method.to_string(),
        url: url.to_string(),
        status: 0,
        status_text: "Network Error".to_string(),
        timestamp: Utc::now(),
        request_headers,
        response_headers: Vec::new(),
        response_body: serde_json::Value::Null,
    }
}
