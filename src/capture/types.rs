//! Captured diagnostic entry types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a captured log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Log,
    Warn,
    Error,
    Info,
}

/// One captured log event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleLogEntry {
    /// Severity
    pub level: LogLevel,
    /// Rendered message text
    pub message: String,
    /// Structured fields attached to the event, beyond the message
    pub raw_args: Vec<serde_json::Value>,
    /// Capture time
    pub timestamp: DateTime<Utc>,
}

/// Which client primitive produced a captured request.
///
/// Both tags exist on the wire; this client issues everything through one
/// primitive and tags it `fetch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpKind {
    Xhr,
    Fetch,
}

/// Header pair as the backend expects it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

/// One captured HTTP exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpLogEntry {
    #[serde(rename = "type")]
    pub kind: HttpKind,
    pub method: String,
    pub url: String,
    /// HTTP status, or 0 when no response was produced
    pub status: u16,
    pub status_text: String,
    pub timestamp: DateTime<Utc>,
    pub request_headers: Vec<HeaderEntry>,
    pub response_headers: Vec<HeaderEntry>,
    /// Parsed JSON when the body is valid JSON, raw text otherwise
    pub response_body: serde_json::Value,
}
