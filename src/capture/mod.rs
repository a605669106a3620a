//! Diagnostic capture: bounded console and HTTP logs with an explicit
//! session lifecycle.
//!
//! A [`CaptureSession`] owns both ring buffers and the install guards. The
//! host creates it at bootstrap (independent of config loading), mounts the
//! console layer on its subscriber stack, routes application HTTP traffic
//! through a [`RecordedClient`], and snapshots the buffers at submission.

mod console;
mod network;
mod ring;
mod types;


pub use console::ConsoleLayer;
pub use network::RecordedClient;
pub use ring::RingBuffer;
pub use types::{ConsoleLogEntry, HeaderEntry, HttpKind, HttpLogEntry, LogLevel};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::http::HttpTransport;

/// Console ring capacity
pub const CONSOLE_LOG_CAPACITY: usize = 200;
/// HTTP ring capacity
pub const HTTP_LOG_CAPACITY: usize = 100;

static PANIC_HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Whether the process-wide panic hook has been claimed.
pub fn panic_hook_installed() -> bool {
    PANIC_HOOK_INSTALLED.load(Ordering::SeqCst)
}

/// Long-lived owner of the capture buffers and install guards.
pub struct CaptureSession {
    console: Mutex<RingBuffer<ConsoleLogEntry>>,
    http: Mutex<RingBuffer<HttpLogEntry>>,
    console_layer_taken: AtomicBool,
    disposed: AtomicBool,
}

impl CaptureSession {
    pub fn create() -> Arc<Self> {
        Arc::new(Self {
            console: Mutex::new(RingBuffer::new(CONSOLE_LOG_CAPACITY)),
            http: Mutex::new(RingBuffer::new(HTTP_LOG_CAPACITY)),
            console_layer_taken: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        })
    }

    /// Hand out the console capture layer, exactly once per session.
    ///
    /// Returns `None` on every later call, so stacking the layer twice (and
    /// double-logging each event) cannot happen by accident.
    pub fn console_layer(self: &Arc<Self>) -> Option<ConsoleLayer> {
        if self.console_layer_taken.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(ConsoleLayer {
            session: Arc::downgrade(self),
        })
    }

    /// Whether this session's console layer has been handed out.
    pub fn console_layer_taken(&self) -> bool {
        self.console_layer_taken.load(Ordering::SeqCst)
    }

    /// Install the process-wide panic hook, at most once per process.
    ///
    /// The hook records an error-level entry and then delegates to the hook
    /// that was previously installed. Returns whether this call installed it.
    pub fn install_panic_hook(self: &Arc<Self>) -> bool {
        if PANIC_HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
            return false;
        }
        let session = Arc::downgrade(self);
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if let Some(session) = session.upgrade() {
                let message = info
                    .payload()
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| info.payload().downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic payload".to_string());
                let location = info.location().map(|l| l.to_string());
                session.push_console(console::panic_entry(&message, location.as_deref()));
            }
            previous(info);
        }));
        true
    }

    /// Wrap a transport in a recording proxy feeding this session.
    pub fn recorded_client<T: HttpTransport>(self: &Arc<Self>, transport: T) -> RecordedClient<T> {
        RecordedClient::new(transport, Arc::clone(self))
    }

    pub(crate) fn push_console(&self, entry: ConsoleLogEntry) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }
        // a poisoned buffer drops the entry instead of panicking inside a hook
        if let Ok(mut buffer) = self.console.lock() {
            buffer.push(entry);
        }
    }

    pub(crate) fn push_http(&self, entry: HttpLogEntry) {
        if self.disposed.load(Ordering::SeqCst) {
            return;
        }
        if let Ok(mut buffer) = self.http.lock() {
            buffer.push(entry);
        }
    }

    /// Current console entries, oldest first
    pub fn console_snapshot(&self) -> Vec<ConsoleLogEntry> {
        self.console
            .lock()
            .map(|buffer| buffer.snapshot())
            .unwrap_or_default()
    }

    /// Current HTTP entries, oldest first
    pub fn http_snapshot(&self) -> Vec<HttpLogEntry> {
        self.http
            .lock()
            .map(|buffer| buffer.snapshot())
            .unwrap_or_default()
    }

    /// Clear both buffers and stop accepting entries. Hooks that still hold
    /// a handle become no-ops.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        if let Ok(mut buffer) = self.console.lock() {
            buffer.clear();
        }
        if let Ok(mut buffer) = self.http.lock() {
            buffer.clear();
        }
    }
}
