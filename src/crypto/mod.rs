//! Hybrid envelope encryption.
//!
//! The serialized report travels under a fresh AES-256-GCM key; only that
//! 32-byte key travels under the project's RSA-OAEP public key. RSA-OAEP
//! cannot carry the payload itself, so this split is load-bearing: the bulk
//! bytes stay symmetric, the asymmetric layer wraps the key alone.

#[cfg(test)]
mod tests;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Oaep, RsaPublicKey};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{ConfigFetchError, EncryptionError};
use crate::report::ReportRequest;

/// AES-256 key length in bytes
pub const AES_KEY_LEN: usize = 32;
/// GCM standard nonce length in bytes
pub const GCM_NONCE_LEN: usize = 12;

/// Encrypt-only handle to a project's RSA public key.
///
/// The backend generated the pair for RSA-OAEP with SHA-256; both the OAEP
/// digest and the MGF1 digest here must stay SHA-256 to match.
#[derive(Debug, Clone)]
pub struct ProjectKey {
    key: RsaPublicKey,
}

impl ProjectKey {
    /// Import PEM key material: strip the armor lines and all newlines,
    /// decode the base64 body, parse the SPKI DER.
    pub fn from_pem(pem: &str) -> Result<Self, ConfigFetchError> {
        let body: String = pem
            .lines()
            .map(str::trim)
            .filter(|line| !line.starts_with("-----"))
            .collect();
        let der = BASE64
            .decode(body)
            .map_err(|err| ConfigFetchError::Key(err.to_string()))?;
        let key = RsaPublicKey::from_public_key_der(&der)
            .map_err(|err| ConfigFetchError::Key(err.to_string()))?;
        Ok(Self { key })
    }
}

/// The wire payload POSTed to the ingestion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEnvelope {
    /// RSA-OAEP-wrapped AES key, base64
    pub encrypted_key: String,
    /// AES-256-GCM ciphertext with appended auth tag, base64
    pub encrypted_data: String,
    /// GCM nonce, base64
    pub iv: String,
}

/// Seal a report.
///
/// Serialize, generate fresh symmetric material, encrypt the payload,
/// wrap the key, base64 the three outputs. Any step failure surfaces as one
/// [`EncryptionError`] and nothing partial escapes.
pub fn seal(report: &ReportRequest, key: &ProjectKey) -> Result<EncryptedEnvelope, EncryptionError> {
    let plaintext =
        serde_json::to_vec(report).map_err(|err| EncryptionError::step("serialize", err))?;

    let mut aes_key = [0u8; AES_KEY_LEN];
    OsRng.fill_bytes(&mut aes_key);
    let mut iv = [0u8; GCM_NONCE_LEN];
    OsRng.fill_bytes(&mut iv);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&aes_key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext.as_ref())
        .map_err(|err| EncryptionError::step("symmetric encrypt", err))?;

    let wrapped_key = key
        .key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), &aes_key)
        .map_err(|err| EncryptionError::step("key wrap", err))?;

    Ok(EncryptedEnvelope {
        encrypted_key: BASE64.encode(wrapped_key),
        encrypted_data: BASE64.encode(ciphertext),
        iv: BASE64.encode(iv),
    })
}
