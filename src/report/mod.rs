//! Report assembly: validation, composition, size capping.

mod types;


pub use types::{PageContext, RawPayload, ReplaySegment, ReportRequest, SubmitFields};

use crate::capture::{ConsoleLogEntry, HttpLogEntry};
use crate::error::ValidationError;
use crate::replay::ReplayEvent;

/// Serialized reports above this size shed replay events, oldest first.
/// Replay is the only unbounded channel; the log rings cap themselves.
pub const MAX_REPORT_BYTES: usize = 2 * 1024 * 1024;

/// Buffers collected for one submission. Channels blocked by project
/// configuration arrive as empty lists.
#[derive(Debug, Clone, Default)]
pub struct CollectedBuffers {
    pub replay_events: Vec<ReplayEvent>,
    pub console_logs: Vec<ConsoleLogEntry>,
    pub http_logs: Vec<HttpLogEntry>,
}

/// Assemble a report.
///
/// Validation runs first: a missing category or severity is returned as a
/// [`ValidationError`] before any cryptographic work can start. The comment
/// and every buffer may be empty.
pub fn compose(
    token: &str,
    fields: &SubmitFields,
    context: &PageContext,
    buffers: CollectedBuffers,
) -> Result<ReportRequest, ValidationError> {
    if fields.category_id.trim().is_empty() {
        return Err(ValidationError::MissingCategory);
    }
    if fields.severity_id.trim().is_empty() {
        return Err(ValidationError::MissingSeverity);
    }

    let replay = if buffers.replay_events.is_empty() {
        Vec::new()
    } else {
        vec![ReplaySegment {
            events: buffers.replay_events,
        }]
    };

    let report = ReportRequest {
        token: token.to_string(),
        page_url: context.page_url.clone(),
        user_comment: fields.comment.clone(),
        user_agent: context.user_agent.clone(),
        category_id: fields.category_id.clone(),
        severity_id: fields.severity_id.clone(),
        raw_payload: RawPayload {
            replay,
            console_logs: buffers.console_logs,
            http_logs: buffers.http_logs,
        },
    };

    Ok(enforce_size_cap(report))
}

fn serialized_len(report: &ReportRequest) -> usize {
    serde_json::to_vec(report).map(|bytes| bytes.len()).unwrap_or(0)
}

/// Drop oldest replay events until the serialized report fits the cap.
fn enforce_size_cap(mut report: ReportRequest) -> ReportRequest {
    loop {
        let size = serialized_len(&report);
        if size <= MAX_REPORT_BYTES {
            break;
        }
        let Some(segment) = report.raw_payload.replay.first_mut() else {
            break;
        };
        if segment.events.is_empty() {
            report.raw_payload.replay.clear();
            continue;
        }

        let overshoot = size - MAX_REPORT_BYTES;
        let mut reclaimed = 0;
        let mut drop_count = 0;
        for event in &segment.events {
            if reclaimed >= overshoot {
                break;
            }
            reclaimed += serde_json::to_vec(event).map(|bytes| bytes.len() + 1).unwrap_or(1);
            drop_count += 1;
        }
        segment.events.drain(..drop_count);
        if segment.events.is_empty() {
            report.raw_payload.replay.clear();
        }
    }
    report
}
