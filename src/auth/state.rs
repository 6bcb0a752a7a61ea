//! Signed OAuth state
//!
//! Uses HMAC-signed tokens, so no server-side storage is needed between
//! the consent redirect and the callback.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Payload carried in the `state` parameter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthState {
    /// Random value, unique per login attempt
    pub nonce: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OAuthState {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// URL-safe random string from `bytes` bytes of entropy
pub(crate) fn random_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

fn mac(secret: &str) -> Result<HmacSha256, AppError> {
    HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid HMAC key: {e}")))
}

/// Create a signed state token
///
/// Token format: base64(payload).base64(hmac_sha256(payload))
pub fn issue_state(secret: &str, ttl_seconds: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let state = OAuthState {
        nonce: random_token(16),
        issued_at: now,
        expires_at: now + Duration::seconds(ttl_seconds),
    };

    let payload = serde_json::to_string(&state).map_err(|e| AppError::Internal(e.into()))?;
    let payload_b64 = general_purpose::URL_SAFE_NO_PAD.encode(payload.as_bytes());

    let mut mac = mac(secret)?;
    mac.update(payload_b64.as_bytes());
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload_b64, signature_b64))
}

/// Verify and decode a state token
///
/// # Errors
/// `InvalidState` if the token is malformed, forged or expired
pub fn verify_state(token: &str, secret: &str) -> Result<OAuthState, AppError> {
    let (payload_b64, signature_b64) = token.split_once('.').ok_or(AppError::InvalidState)?;

    let signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AppError::InvalidState)?;

    let mut mac = mac(secret)?;
    mac.update(payload_b64.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| AppError::InvalidState)?;

    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(payload_b64)
        .map_err(|_| AppError::InvalidState)?;
    let state: OAuthState =
        serde_json::from_slice(&payload).map_err(|_| AppError::InvalidState)?;

    if state.is_expired() {
        return Err(AppError::InvalidState);
    }

    Ok(state)
}
