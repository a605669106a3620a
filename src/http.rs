//! Minimal HTTP seam shared by the config, capture, and ingest clients.
//!
//! Requests and responses are fully buffered, wire-neutral values so that
//! the recording proxy can observe an exchange without consuming anything
//! the caller still needs, and so tests can substitute canned transports.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

const USER_AGENT: &str = concat!("owl-report/", env!("CARGO_PKG_VERSION"));

/// An outbound HTTP request.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl OutboundRequest {
    /// Build a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Build a POST request with a raw body
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: "POST".to_string(),
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Append a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl WireResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Response body decoded as text, lossily
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Transport-level failure: the request never produced an HTTP response.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HttpFailure {
    pub message: String,
}

impl HttpFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Trait for HTTP execution (enables canned transports in tests)
pub trait HttpTransport: Send + Sync {
    /// Execute a request, buffering the full response
    fn execute(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<WireResponse, HttpFailure>> + Send;
}

/// reqwest-backed transport used outside of tests
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, HttpFailure> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| HttpFailure::new(err.to_string()))?;
        Ok(Self { http })
    }
}

impl HttpTransport for ReqwestTransport {
    #[cfg(not(tarpaulin_include))]
    async fn execute(&self, request: OutboundRequest) -> Result<WireResponse, HttpFailure> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|err| HttpFailure::new(err.to_string()))?;

        let mut builder = self.http.request(method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| HttpFailure::new(err.to_string()))?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let headers = response
            .headers()
            .iter()
            .map(|(key, value)| {
                (
                    key.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|err| HttpFailure::new(err.to_string()))?
            .to_vec();

        Ok(WireResponse {
            status: status.as_u16(),
            status_text,
            headers,
            body,
        })
    }
}
