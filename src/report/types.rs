//! Report envelope types

use serde::{Deserialize, Serialize};

use crate::capture::{ConsoleLogEntry, HttpLogEntry};
use crate::replay::ReplayEvent;

/// User-entered form state at submission
#[derive(Debug, Clone, Default)]
pub struct SubmitFields {
    pub comment: String,
    pub category_id: String,
    pub severity_id: String,
}

/// Host-page context captured at submission
#[derive(Debug, Clone)]
pub struct PageContext {
    pub page_url: String,
    pub user_agent: String,
}

/// One contiguous stretch of replay events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySegment {
    pub events: Vec<ReplayEvent>,
}

/// Captured diagnostics bundled into a report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPayload {
    pub replay: Vec<ReplaySegment>,
    pub console_logs: Vec<ConsoleLogEntry>,
    pub http_logs: Vec<HttpLogEntry>,
}

/// The pre-encryption report envelope. Lives only in memory, for the
/// duration of the seal-and-send sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub token: String,
    pub page_url: String,
    pub user_comment: String,
    pub user_agent: String,
    pub category_id: String,
    pub severity_id: String,
    pub raw_payload: RawPayload,
}
