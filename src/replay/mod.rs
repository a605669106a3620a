//! Interaction replay: collects events from an external capture engine
//! between `start` and `stop`.
//!
//! The engine itself (dynamically loaded in the embedded setting) stays
//! behind the [`ReplaySource`] seam; this module only depends on its
//! load-then-record shape.


use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// The capture engine could not be loaded or initialized.
#[derive(Debug, Clone, Error)]
#[error("replay engine failed to load: {0}")]
pub struct ReplayLoadError(pub String);

/// Opaque event emitted by the capture engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayEvent(pub serde_json::Value);

/// Input-masking options forwarded to the capture engine.
#[derive(Debug, Clone)]
pub struct MaskInputOptions {
    pub password: bool,
}

/// Options forwarded to the capture engine's `record` call.
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub mask_all_inputs: bool,
    pub mask_input_options: MaskInputOptions,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            mask_all_inputs: false,
            mask_input_options: MaskInputOptions { password: true },
        }
    }
}

/// Callback the engine invokes for each captured event.
pub type EmitFn = Box<dyn Fn(ReplayEvent) + Send + Sync>;

/// Handle that stops the engine's event stream when invoked.
pub type StopFn = Box<dyn FnOnce() + Send>;

/// Seam for the third-party capture engine.
#[async_trait]
pub trait ReplaySource: Send + Sync {
    /// Load the engine. Completes (ready or failed) before any recording.
    async fn load(&self) -> Result<(), ReplayLoadError>;

    /// Begin emitting events through `emit`; the returned handle stops the
    /// stream.
    fn record(&self, emit: EmitFn, options: &RecordOptions) -> StopFn;
}

/// Collects replay events from `start` until `stop`.
///
/// Blocked sessions (per project configuration) never load the engine and
/// never hold events. `stop` is safe to call at any time, any number of
/// times; events emitted after it are dropped.
pub struct SessionRecorder {
    events: Arc<Mutex<Vec<ReplayEvent>>>,
    recording: Arc<AtomicBool>,
    stop: Mutex<Option<StopFn>>,
    blocked: bool,
}

impl SessionRecorder {
    pub fn new(blocked: bool) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            recording: Arc::new(AtomicBool::new(false)),
            stop: Mutex::new(None),
            blocked,
        }
    }

    /// Load the engine and begin capture. A no-op when replay is blocked or
    /// capture is already running.
    pub async fn start(
        &self,
        source: &dyn ReplaySource,
        options: &RecordOptions,
    ) -> Result<(), ReplayLoadError> {
        if self.blocked || self.recording.load(Ordering::SeqCst) {
            return Ok(());
        }

        source.load().await?;
        self.recording.store(true, Ordering::SeqCst);

        let events = Arc::clone(&self.events);
        let recording = Arc::clone(&self.recording);
        let emit: EmitFn = Box::new(move |event| {
            if !recording.load(Ordering::SeqCst) {
                return;
            }
            if let Ok(mut events) = events.lock() {
                events.push(event);
            }
        });

        let stop = source.record(emit, options);
        if let Ok(mut slot) = self.stop.lock() {
            *slot = Some(stop);
        }
        Ok(())
    }

    /// Cease capture. Later emissions are dropped.
    pub fn stop(&self) {
        self.recording.store(false, Ordering::SeqCst);
        if let Ok(mut slot) = self.stop.lock() {
            if let Some(stop) = slot.take() {
                stop();
            }
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    /// Everything captured so far, oldest first.
    pub fn events(&self) -> Vec<ReplayEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}
