//! OwlReport capture-and-encrypt SDK.
//!
//! Embeds in a host application and buffers its diagnostics (log events,
//! outbound HTTP exchanges, interaction replay) in bounded ring logs. On
//! user submission the buffers are assembled into a report envelope and
//! sealed client-side: the payload travels under a fresh AES-256-GCM key,
//! and only that key travels under the project's RSA-OAEP public key. The
//! backend holding the private key is the only party that can read it.
//!
//! Typical wiring:
//!
//! ```no_run
//! use std::sync::Arc;
//! use owl_report::capture::CaptureSession;
//! use owl_report::config::ConfigClient;
//! use owl_report::transport::IngestClient;
//!
//! # async fn run(replay_engine: &dyn owl_report::replay::ReplaySource) -> Result<(), Box<dyn std::error::Error>> {
//! // at bootstrap, before config is known
//! let session = CaptureSession::create();
//! session.install_panic_hook();
//! // mount `session.console_layer()` on the host's tracing subscriber and
//! // route application HTTP traffic through `session.recorded_client(..)`
//!
//! let widget = owl_report::widget::Widget::init(
//!     owl_report::widget::WidgetOptions {
//!         project_token: "tok".to_string(),
//!         page: owl_report::report::PageContext {
//!             page_url: "https://host.example.com/".to_string(),
//!             user_agent: "host-agent".to_string(),
//!         },
//!         record_options: Default::default(),
//!     },
//!     Arc::clone(&session),
//!     &ConfigClient::new("https://api.owlreport.example")?,
//!     IngestClient::new("https://api.owlreport.example")?,
//!     replay_engine,
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod config;
pub mod crypto;
pub mod error;
pub mod http;
pub mod replay;
pub mod report;
pub mod transport;
pub mod widget;

pub use capture::CaptureSession;
pub use config::{load_config, project_token_from_attrs, ConfigClient, ProjectConfig};
pub use crypto::{seal, EncryptedEnvelope, ProjectKey};
pub use error::{
    ConfigFetchError, EncryptionError, TransportError, ValidationError, WidgetError,
};
pub use replay::{ReplaySource, SessionRecorder};
pub use report::{compose, ReportRequest, SubmitFields};
pub use transport::IngestClient;
pub use widget::{SubmitOutcome, Widget, WidgetOptions};
