use super::*;
use crate::report::{CollectedBuffers, PageContext, SubmitFields};
use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;

fn key_pair() -> (RsaPrivateKey, ProjectKey) {
    let private = RsaPrivateKey::new(&mut OsRng, 2048).expect("generate key pair");
    let pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("encode pem");
    let public = ProjectKey::from_pem(&pem).expect("import pem");
    (private, public)
}

fn sample_report() -> crate::report::ReportRequest {
    let fields = SubmitFields {
        comment: "the cart forgets items".to_string(),
        category_id: "c1".to_string(),
        severity_id: "s2".to_string(),
    };
    let context = PageContext {
        page_url: "https://shop.example.com/cart".to_string(),
        user_agent: "Mozilla/5.0 (test)".to_string(),
    };
    crate::report::compose("tok-123", &fields, &context, CollectedBuffers::default())
        .expect("composes")
}

fn unseal(envelope: &EncryptedEnvelope, private: &RsaPrivateKey) -> Vec<u8> {
    let wrapped = BASE64.decode(&envelope.encrypted_key).expect("key base64");
    let aes_key = private
        .decrypt(Oaep::new::<Sha256>(), &wrapped)
        .expect("unwrap key");
    assert_eq!(aes_key.len(), AES_KEY_LEN);

    let iv = BASE64.decode(&envelope.iv).expect("iv base64");
    assert_eq!(iv.len(), GCM_NONCE_LEN);

    let ciphertext = BASE64.decode(&envelope.encrypted_data).expect("data base64");
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&aes_key));
    cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_ref())
        .expect("decrypt payload")
}

#[test]
fn sealed_envelope_round_trips() {
    let (private, public) = key_pair();
    let report = sample_report();

    let envelope = seal(&report, &public).expect("seal");
    let plaintext = unseal(&envelope, &private);

    let expected = serde_json::to_vec(&report).expect("serialize");
    assert_eq!(plaintext, expected);

    let decoded: serde_json::Value = serde_json::from_slice(&plaintext).expect("json");
    assert_eq!(decoded["userComment"], "the cart forgets items");
    assert_eq!(decoded["token"], "tok-123");
}

#[test]
fn symmetric_material_is_fresh_per_seal() {
    let (_, public) = key_pair();
    let report = sample_report();

    let first = seal(&report, &public).expect("seal");
    let second = seal(&report, &public).expect("seal");

    assert_ne!(first.iv, second.iv);
    assert_ne!(first.encrypted_key, second.encrypted_key);
    assert_ne!(first.encrypted_data, second.encrypted_data);
}

#[test]
fn pem_import_tolerates_armor_and_whitespace() {
    let private = RsaPrivateKey::new(&mut OsRng, 2048).expect("generate key pair");
    let pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::CRLF)
        .expect("encode pem");
    ProjectKey::from_pem(&pem).expect("crlf pem imports");
}

#[test]
fn garbage_key_material_is_rejected() {
    let err = ProjectKey::from_pem("-----BEGIN PUBLIC KEY-----\nnot base64!!\n-----END PUBLIC KEY-----")
        .expect_err("rejected");
    assert!(matches!(err, ConfigFetchError::Key(_)));

    // valid base64, invalid DER
    let err = ProjectKey::from_pem("AAAA").expect_err("rejected");
    assert!(matches!(err, ConfigFetchError::Key(_)));
}
