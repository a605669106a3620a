use super::*;
use crate::config::{ConfigApi, PublicKeyResponse};
use crate::crypto::{EncryptedEnvelope, AES_KEY_LEN, GCM_NONCE_LEN};
use crate::error::{ConfigFetchError, TransportError};
use crate::http::{HttpFailure, HttpTransport, OutboundRequest, WireResponse};
use crate::replay::{EmitFn, ReplayEvent, ReplayLoadError, StopFn};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{Oaep, RsaPrivateKey};
use serde_json::json;
use sha2::Sha256;
use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;

struct StaticConfigApi {
    response: Result<PublicKeyResponse, ()>,
}

impl ConfigApi for StaticConfigApi {
    async fn fetch(&self, _token: &str) -> Result<PublicKeyResponse, ConfigFetchError> {
        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(()) => Err(ConfigFetchError::Connectivity("backend down".to_string())),
        }
    }
}

enum IngestBehavior {
    Accept,
    Reject { status: u16, detail: String },
}

struct CapturingIngest {
    sent: Arc<Mutex<Vec<(EncryptedEnvelope, String)>>>,
    behavior: IngestBehavior,
}

impl crate::transport::IngestApi for CapturingIngest {
    async fn send(&self, envelope: &EncryptedEnvelope, token: &str) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((envelope.clone(), token.to_string()));
        match &self.behavior {
            IngestBehavior::Accept => Ok(()),
            IngestBehavior::Reject { status, detail } => Err(TransportError::Rejected {
                status: *status,
                detail: detail.clone(),
            }),
        }
    }
}

/// Replay engine stand-in that hands the emit callback back to the test.
#[derive(Default)]
struct FakeEngine {
    emit: Mutex<Option<EmitFn>>,
}

impl FakeEngine {
    fn emit(&self, value: serde_json::Value) {
        if let Some(emit) = self.emit.lock().unwrap().as_ref() {
            emit(ReplayEvent(value));
        }
    }
}

#[async_trait::async_trait]
impl crate::replay::ReplaySource for FakeEngine {
    async fn load(&self) -> Result<(), ReplayLoadError> {
        Ok(())
    }

    fn record(&self, emit: EmitFn, _options: &RecordOptions) -> StopFn {
        *self.emit.lock().unwrap() = Some(emit);
        Box::new(|| {})
    }
}

struct TestBackend {
    private: RsaPrivateKey,
    response: PublicKeyResponse,
}

fn backend(block_console: bool, block_network: bool, block_replay: bool) -> TestBackend {
    let private = RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).expect("generate key pair");
    let pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("pem");
    TestBackend {
        private,
        response: PublicKeyResponse {
            public_key: pem,
            block_console_logs: block_console,
            block_network_logs: block_network,
            block_replay_logs: block_replay,
            categories: vec![crate::config::Category {
                id: "c1".to_string(),
                name: "Bug".to_string(),
            }],
            severities: vec![crate::config::Severity {
                id: "s1".to_string(),
                name: "Critical".to_string(),
            }],
        },
    }
}

fn options() -> WidgetOptions {
    WidgetOptions {
        project_token: "tok-widget".to_string(),
        page: PageContext {
            page_url: "https://shop.example.com/checkout".to_string(),
            user_agent: "Mozilla/5.0 (test)".to_string(),
        },
        record_options: RecordOptions::default(),
    }
}

fn fields() -> SubmitFields {
    SubmitFields {
        comment: "test".to_string(),
        category_id: "c1".to_string(),
        severity_id: "s1".to_string(),
    }
}

fn unseal(envelope: &EncryptedEnvelope, private: &RsaPrivateKey) -> serde_json::Value {
    let wrapped = BASE64.decode(&envelope.encrypted_key).expect("key base64");
    let aes_key = private
        .decrypt(Oaep::new::<Sha256>(), &wrapped)
        .expect("unwrap key");
    assert_eq!(aes_key.len(), AES_KEY_LEN);

    let iv = BASE64.decode(&envelope.iv).expect("iv base64");
    assert_eq!(iv.len(), GCM_NONCE_LEN);

    let ciphertext = BASE64.decode(&envelope.encrypted_data).expect("data base64");
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&aes_key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_ref())
        .expect("decrypt");
    serde_json::from_slice(&plaintext).expect("payload json")
}

#[derive(Clone)]
struct CannedTransport {
    response: WireResponse,
}

impl HttpTransport for CannedTransport {
    async fn execute(&self, _request: OutboundRequest) -> Result<WireResponse, HttpFailure> {
        Ok(self.response.clone())
    }
}

#[tokio::test]
async fn submit_seals_captured_diagnostics() {
    let backend = backend(false, false, false);
    let sent = Arc::new(Mutex::new(Vec::new()));
    let engine = FakeEngine::default();
    let session = CaptureSession::create();

    let widget = Widget::init(
        options(),
        Arc::clone(&session),
        &StaticConfigApi {
            response: Ok(backend.response.clone()),
        },
        CapturingIngest {
            sent: Arc::clone(&sent),
            behavior: IngestBehavior::Accept,
        },
        &engine,
    )
    .await
    .expect("init");

    // host console traffic
    let layer = session.console_layer().expect("layer");
    tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), || {
        tracing::error!(target: "host_app", "checkout failed");
    });

    // host http traffic
    let client = session.recorded_client(CannedTransport {
        response: WireResponse {
            status: 500,
            status_text: "Internal Server Error".to_string(),
            headers: Vec::new(),
            body: b"{}".to_vec(),
        },
    });
    client
        .execute(OutboundRequest::get("https://api.shop.example.com/cart"))
        .await
        .expect("passes through");

    // interaction replay
    engine.emit(json!({ "kind": "click", "x": 10 }));
    engine.emit(json!({ "kind": "scroll", "y": 300 }));

    let outcome = widget.submit(&fields()).await;
    assert!(matches!(outcome, SubmitOutcome::Accepted), "{outcome:?}");

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (envelope, token) = &sent[0];
    assert_eq!(token, "tok-widget");

    let payload = unseal(envelope, &backend.private);
    assert_eq!(payload["token"], "tok-widget");
    assert_eq!(payload["pageUrl"], "https://shop.example.com/checkout");
    assert_eq!(payload["categoryId"], "c1");

    let raw = &payload["rawPayload"];
    assert_eq!(raw["consoleLogs"].as_array().unwrap().len(), 1);
    assert_eq!(raw["consoleLogs"][0]["message"], "checkout failed");
    assert_eq!(raw["consoleLogs"][0]["level"], "error");
    assert_eq!(raw["httpLogs"].as_array().unwrap().len(), 1);
    assert_eq!(raw["httpLogs"][0]["status"], 500);
    assert_eq!(raw["replay"][0]["events"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn empty_buffers_produce_empty_lists() {
    let backend = backend(false, false, false);
    let sent = Arc::new(Mutex::new(Vec::new()));
    let engine = FakeEngine::default();

    let widget = Widget::init(
        options(),
        CaptureSession::create(),
        &StaticConfigApi {
            response: Ok(backend.response.clone()),
        },
        CapturingIngest {
            sent: Arc::clone(&sent),
            behavior: IngestBehavior::Accept,
        },
        &engine,
    )
    .await
    .expect("init");

    let outcome = widget.submit(&fields()).await;
    assert!(matches!(outcome, SubmitOutcome::Accepted));

    let sent = sent.lock().unwrap();
    let payload = unseal(&sent[0].0, &backend.private);
    assert_eq!(payload["userComment"], "test");
    assert_eq!(payload["rawPayload"]["consoleLogs"], json!([]));
    assert_eq!(payload["rawPayload"]["httpLogs"], json!([]));
}

#[tokio::test]
async fn blocked_replay_yields_no_events() {
    let backend = backend(false, false, true);
    let sent = Arc::new(Mutex::new(Vec::new()));
    let engine = FakeEngine::default();

    let widget = Widget::init(
        options(),
        CaptureSession::create(),
        &StaticConfigApi {
            response: Ok(backend.response.clone()),
        },
        CapturingIngest {
            sent: Arc::clone(&sent),
            behavior: IngestBehavior::Accept,
        },
        &engine,
    )
    .await
    .expect("init");

    // the engine was never asked to record, so these go nowhere
    engine.emit(json!({ "kind": "click" }));
    engine.emit(json!({ "kind": "input" }));
    assert!(widget.recorder().events().is_empty());

    widget.submit(&fields()).await;

    let sent = sent.lock().unwrap();
    let payload = unseal(&sent[0].0, &backend.private);
    assert_eq!(payload["rawPayload"]["replay"], json!([]));
}

#[tokio::test]
async fn blocked_console_channel_composes_empty() {
    let backend = backend(true, false, false);
    let sent = Arc::new(Mutex::new(Vec::new()));
    let engine = FakeEngine::default();
    let session = CaptureSession::create();

    let widget = Widget::init(
        options(),
        Arc::clone(&session),
        &StaticConfigApi {
            response: Ok(backend.response.clone()),
        },
        CapturingIngest {
            sent: Arc::clone(&sent),
            behavior: IngestBehavior::Accept,
        },
        &engine,
    )
    .await
    .expect("init");

    let layer = session.console_layer().expect("layer");
    tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), || {
        tracing::error!(target: "host_app", "sensitive log line");
    });
    assert_eq!(session.console_snapshot().len(), 1);

    widget.submit(&fields()).await;

    let sent = sent.lock().unwrap();
    let payload = unseal(&sent[0].0, &backend.private);
    assert_eq!(payload["rawPayload"]["consoleLogs"], json!([]));
}

#[tokio::test]
async fn invalid_submission_never_reaches_ingest() {
    let backend = backend(false, false, false);
    let sent = Arc::new(Mutex::new(Vec::new()));
    let engine = FakeEngine::default();

    let widget = Widget::init(
        options(),
        CaptureSession::create(),
        &StaticConfigApi {
            response: Ok(backend.response.clone()),
        },
        CapturingIngest {
            sent: Arc::clone(&sent),
            behavior: IngestBehavior::Accept,
        },
        &engine,
    )
    .await
    .expect("init");

    let mut fields = fields();
    fields.category_id = String::new();
    let outcome = widget.submit(&fields).await;

    assert!(matches!(
        outcome,
        SubmitOutcome::Invalid(crate::error::ValidationError::MissingCategory)
    ));
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn rejection_surfaces_backend_detail_for_retry() {
    let backend = backend(false, false, false);
    let sent = Arc::new(Mutex::new(Vec::new()));
    let engine = FakeEngine::default();

    let widget = Widget::init(
        options(),
        CaptureSession::create(),
        &StaticConfigApi {
            response: Ok(backend.response.clone()),
        },
        CapturingIngest {
            sent: Arc::clone(&sent),
            behavior: IngestBehavior::Reject {
                status: 503,
                detail: "ingestion paused".to_string(),
            },
        },
        &engine,
    )
    .await
    .expect("init");

    let outcome = widget.submit(&fields()).await;
    match outcome {
        SubmitOutcome::Failed { message } => {
            assert!(message.contains("503"));
            assert!(message.contains("ingestion paused"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!widget.recorder().is_recording());
}

#[tokio::test]
async fn config_failure_disables_the_widget() {
    let engine = FakeEngine::default();
    let result = Widget::init(
        options(),
        CaptureSession::create(),
        &StaticConfigApi { response: Err(()) },
        CapturingIngest {
            sent: Arc::new(Mutex::new(Vec::new())),
            behavior: IngestBehavior::Accept,
        },
        &engine,
    )
    .await;

    assert!(matches!(result, Err(ConfigFetchError::Connectivity(_))));
}

#[tokio::test]
async fn submission_stops_the_recorder() {
    let backend = backend(false, false, false);
    let engine = FakeEngine::default();

    let widget = Widget::init(
        options(),
        CaptureSession::create(),
        &StaticConfigApi {
            response: Ok(backend.response.clone()),
        },
        CapturingIngest {
            sent: Arc::new(Mutex::new(Vec::new())),
            behavior: IngestBehavior::Accept,
        },
        &engine,
    )
    .await
    .expect("init");

    assert!(widget.recorder().is_recording());
    engine.emit(json!({ "kind": "click" }));
    widget.submit(&fields()).await;

    assert!(!widget.recorder().is_recording());
    engine.emit(json!({ "kind": "late" }));
    assert_eq!(widget.recorder().events().len(), 1);
}
