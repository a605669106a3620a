//! The submit boundary: wires capture, composition, encryption, delivery.
//!
//! Every failure of a user-triggered submission is caught here and turned
//! into a displayable outcome. Nothing propagates to the host's own error
//! machinery, which would otherwise feed back into the very hooks this
//! crate installs.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::capture::CaptureSession;
use crate::config::{self, ConfigApi, ProjectConfig};
use crate::crypto;
use crate::error::{ConfigFetchError, ValidationError, WidgetError};
use crate::replay::{RecordOptions, ReplaySource, SessionRecorder};
use crate::report::{self, CollectedBuffers, PageContext, SubmitFields};
use crate::transport::IngestApi;

/// Construction parameters for an embedded widget.
pub struct WidgetOptions {
    /// Project token, typically read off the embed tag
    pub project_token: String,
    /// Host-page context attached to every report
    pub page: PageContext,
    /// Masking options forwarded to the replay engine
    pub record_options: RecordOptions,
}

/// Outcome of a submission attempt, ready for display.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Accepted by the backend; the form can reset and close.
    Accepted,
    /// Rejected before any crypto or network work; shown inline.
    Invalid(ValidationError),
    /// Encryption or delivery failed; the form stays populated for a
    /// user-initiated retry.
    Failed { message: String },
}

/// A live embed: loaded configuration plus the capture machinery.
///
/// Construction is the gate. When config loading fails no `Widget` exists,
/// so no submission path exists either; the capture session keeps
/// buffering harmlessly and the page is otherwise unaffected.
pub struct Widget<I: IngestApi> {
    options: WidgetOptions,
    config: ProjectConfig,
    session: Arc<CaptureSession>,
    recorder: SessionRecorder,
    ingest: I,
}

impl<I: IngestApi> Widget<I> {
    /// Load configuration, import the key, and start replay capture.
    ///
    /// The capture session is created by the host at bootstrap and handed
    /// in, so console/network hooks run independently of (and concurrently
    /// with) this config fetch.
    pub async fn init(
        options: WidgetOptions,
        session: Arc<CaptureSession>,
        config_api: &impl ConfigApi,
        ingest: I,
        replay_source: &dyn ReplaySource,
    ) -> Result<Self, ConfigFetchError> {
        let config = config::load_config(config_api, &options.project_token).await?;
        let recorder = SessionRecorder::new(config.block_replay_logs);
        if let Err(err) = recorder.start(replay_source, &options.record_options).await {
            // replay is one channel of several; losing it must not take
            // down the widget
            tracing::warn!(error = %err, "replay capture unavailable");
        }
        Ok(Self {
            options,
            config,
            session,
            recorder,
            ingest,
        })
    }

    /// Loaded project configuration (categories and severities feed the form)
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn capture(&self) -> &Arc<CaptureSession> {
        &self.session
    }

    pub fn recorder(&self) -> &SessionRecorder {
        &self.recorder
    }

    /// Handle a user-triggered submission.
    pub async fn submit(&self, fields: &SubmitFields) -> SubmitOutcome {
        match self.try_submit(fields).await {
            Ok(()) => SubmitOutcome::Accepted,
            Err(WidgetError::Validation(err)) => SubmitOutcome::Invalid(err),
            Err(err) => SubmitOutcome::Failed {
                message: err.to_string(),
            },
        }
    }

    async fn try_submit(&self, fields: &SubmitFields) -> Result<(), WidgetError> {
        self.recorder.stop();
        let buffers = self.collect_buffers();
        let report = report::compose(
            &self.options.project_token,
            fields,
            &self.options.page,
            buffers,
        )?;
        let envelope = crypto::seal(&report, &self.config.public_key)?;
        self.ingest
            .send(&envelope, &self.options.project_token)
            .await?;
        Ok(())
    }

    /// Snapshot the capture channels, honoring the project's block flags.
    fn collect_buffers(&self) -> CollectedBuffers {
        CollectedBuffers {
            replay_events: if self.config.block_replay_logs {
                Vec::new()
            } else {
                self.recorder.events()
            },
            console_logs: if self.config.block_console_logs {
                Vec::new()
            } else {
                self.session.console_snapshot()
            },
            http_logs: if self.config.block_network_logs {
                Vec::new()
            } else {
                self.session.http_snapshot()
            },
        }
    }
}
