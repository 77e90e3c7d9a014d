//! Provider webhook signature verification.
//!
//! The provider signs the exact raw request body with HMAC-SHA256 using the
//! shared webhook secret and sends the hex digest in a header, optionally
//! prefixed with `sha256=`. Verification must run on the raw bytes before any
//! parsing.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::WebhookError;

type HmacSha256 = Hmac<Sha256>;

/// Returns true if `signature_header` is a valid signature of `payload`.
///
/// A missing header, bad hex or a digest mismatch all return false.
pub fn verify_signature(payload: &[u8], signature_header: Option<&str>, secret: &str) -> bool {
    let Some(header) = signature_header else {
        return false;
    };
    let provided = header.trim();
    let provided = provided.strip_prefix("sha256=").unwrap_or(provided);
    let Ok(provided) = hex::decode(provided) else {
        return false;
    };
    let Some(expected) = compute_signature(secret, payload) else {
        return false;
    };
    constant_time_compare(&expected, &provided)
}

/// Computes the hex-encoded HMAC-SHA256 signature the provider would send.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    compute_signature(secret, payload)
        .map(hex::encode)
        .unwrap_or_default()
}

fn compute_signature(secret: &str, payload: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Verifier for provider webhook signatures.
///
/// Without a secret the verifier runs in insecure mode and accepts every
/// delivery.
pub struct ProviderSignatureVerifier {
    secret: Option<SecretString>,
}

impl ProviderSignatureVerifier {
    /// Creates a verifier. `None` (or an empty secret) disables verification.
    pub fn new(secret: Option<SecretString>) -> Self {
        let secret = secret.filter(|s| !s.expose_secret().is_empty());
        if secret.is_none() {
            tracing::warn!("Provider webhook secret not configured; signature verification disabled");
        }
        Self { secret }
    }

    /// True when a secret is configured.
    pub fn is_enforcing(&self) -> bool {
        self.secret.is_some()
    }

    /// Verifies a delivery.
    ///
    /// # Errors
    ///
    /// - `MissingSignature` - secret configured, header absent
    /// - `InvalidSignature` - header does not match the body
    pub fn verify(&self, payload: &[u8], signature_header: Option<&str>) -> Result<(), WebhookError> {
        let Some(secret) = &self.secret else {
            tracing::debug!("Accepting unsigned webhook (insecure mode)");
            return Ok(());
        };
        if signature_header.is_none() {
            return Err(WebhookError::MissingSignature);
        }
        if !verify_signature(payload, signature_header, secret.expose_secret()) {
            return Err(WebhookError::InvalidSignature);
        }
        Ok(())
    }
}
