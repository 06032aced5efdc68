//! Versioned save envelope
//!
//! `{ "version": N, "digest": "<blake3 hex>", "payload": "<json>" }`
//!
//! The payload is stored as a string so the digest covers the exact bytes
//! that were written, independent of key ordering on re-serialization.

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use super::PersistenceError;

/// Current envelope format
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub digest: String,
    pub payload: String,
}

fn digest_hex(payload: &str) -> String {
    blake3::hash(payload.as_bytes()).to_hex().to_string()
}

/// Serialize `value` into a sealed envelope string
pub fn seal<T: Serialize>(value: &T) -> Result<String, PersistenceError> {
    let payload = serde_json::to_string(value)?;
    let envelope = Envelope {
        version: SAVE_VERSION,
        digest: digest_hex(&payload),
        payload,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Verify and decode an envelope string
pub fn open<T: DeserializeOwned>(raw: &str) -> Result<T, PersistenceError> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    if envelope.version != SAVE_VERSION {
        return Err(PersistenceError::UnsupportedVersion(envelope.version));
    }
    if digest_hex(&envelope.payload) != envelope.digest {
        return Err(PersistenceError::DigestMismatch);
    }
    Ok(serde_json::from_str(&envelope.payload)?)
}
