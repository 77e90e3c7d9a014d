//! Voice provider webhook configuration

use axum::http::HeaderName;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Provider webhook configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Shared secret used to sign webhook bodies. Unset = signatures are not
    /// checked.
    pub webhook_secret: Option<SecretString>,

    /// Header carrying the HMAC signature
    #[serde(default = "default_signature_header")]
    pub signature_header: String,
}

impl ProviderConfig {
    /// Parsed signature header name
    pub fn signature_header_name(&self) -> Result<HeaderName, ValidationError> {
        HeaderName::from_bytes(self.signature_header.to_ascii_lowercase().as_bytes())
            .map_err(|_| ValidationError::InvalidSignatureHeader(self.signature_header.clone()))
    }

    /// Whether a non-empty secret is configured
    pub fn has_secret(&self) -> bool {
        self.webhook_secret
            .as_ref()
            .is_some_and(|s| !s.expose_secret().is_empty())
    }

    /// Validate provider configuration
    ///
    /// Production deployments must verify signatures.
    pub fn validate(&self, is_production: bool) -> Result<(), ValidationError> {
        self.signature_header_name()?;
        if is_production && !self.has_secret() {
            return Err(ValidationError::WebhookSecretRequired);
        }
        Ok(())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            signature_header: default_signature_header(),
        }
    }
}

fn default_signature_header() -> String {
    "x-vapi-signature".to_string()
}
