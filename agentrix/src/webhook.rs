//! Webhook signature verification and event parsing.
//!
//! The API signs each delivery with `hex(HMAC-SHA256(secret, raw_body))` and
//! sends the digest in the brand's signature header. [`WebhookHandler`]
//! recomputes it, compares in constant time, and only then parses the body.

use hmac::{Hmac, Mac};
use serde::Serialize;
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::brand::Brand;
use crate::error::{GenericError, Result, ValidationError};

type HmacSha256 = Hmac<Sha256>;

/// Code of the error returned when no secret is configured.
pub const WEBHOOK_SECRET_MISSING: &str = "WEBHOOK_SECRET_MISSING";

/// A verified webhook notification.
///
/// Fields are copied from the payload as-is; any of them may be absent. A
/// numeric `id` is read as its decimal text, while `type` is only read from a
/// JSON string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WebhookEvent {
    /// Event identifier.
    pub id: Option<String>,
    /// Event type, e.g. `payment.succeeded`; `None` unless sent as a string.
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Event payload.
    pub data: Option<Value>,
    /// Emission time, as a number or string depending on the sender.
    pub timestamp: Option<Value>,
}

/// Verifies webhook signatures with a fixed secret.
#[derive(Clone)]
pub struct WebhookHandler {
    secret: String,
    brand: Brand,
}

impl WebhookHandler {
    /// Creates a handler for the default brand.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self::with_brand(secret, Brand::default())
    }

    /// Creates a handler for a specific brand.
    #[must_use]
    pub fn with_brand(secret: impl Into<String>, brand: Brand) -> Self {
        Self {
            secret: secret.into(),
            brand,
        }
    }

    /// Name of the HTTP header carrying the signature.
    #[must_use]
    pub const fn signature_header(&self) -> &'static str {
        self.brand.signature_header
    }

    /// Computes the signature the API would send for `payload`.
    ///
    /// # Errors
    ///
    /// Returns a `WEBHOOK_SECRET_MISSING` error if the secret is empty.
    pub fn sign(&self, payload: &[u8]) -> Result<String> {
        let mac = self.mac(payload)?;
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Checks `signature` against `hex(HMAC-SHA256(secret, payload))`.
    ///
    /// The comparison runs in constant time with respect to the content of
    /// `signature`. A mismatch is `Ok(false)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns a `WEBHOOK_SECRET_MISSING` error if the secret is empty.
    pub fn verify_signature(&self, payload: &[u8], signature: &str) -> Result<bool> {
        let expected = self.sign(payload)?;
        Ok(expected.as_bytes().ct_eq(signature.as_bytes()).into())
    }

    /// Verifies `signature`, then parses `payload` into a [`WebhookEvent`].
    ///
    /// The payload is not parsed unless the signature matches.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad signature or a payload that is
    /// not JSON, and a `WEBHOOK_SECRET_MISSING` error if the secret is empty.
    pub fn construct_event(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent> {
        if !self.verify_signature(payload, signature)? {
            return Err(ValidationError::new("Invalid webhook signature").into());
        }

        let value: Value = serde_json::from_slice(payload).map_err(|e| {
            ValidationError::new("Invalid webhook payload")
                .with_details(Value::String(e.to_string()))
        })?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(event_type = ?value.get("type"), "Verified webhook event");

        Ok(WebhookEvent {
            id: string_field(&value, "id"),
            event_type: value.get("type").and_then(Value::as_str).map(str::to_owned),
            data: present(&value, "data"),
            timestamp: present(&value, "timestamp"),
        })
    }

    fn mac(&self, payload: &[u8]) -> Result<HmacSha256> {
        if self.secret.is_empty() {
            return Err(GenericError::new(
                WEBHOOK_SECRET_MISSING,
                "Webhook secret is not configured",
            )
            .into());
        }
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| GenericError::unknown(e.to_string()))?;
        mac.update(payload);
        Ok(mac)
    }
}

impl std::fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("brand", &self.brand.name)
            .field("has_secret", &!self.secret.is_empty())
            .finish()
    }
}

fn present(value: &Value, key: &str) -> Option<Value> {
    value.get(key).filter(|v| !v.is_null()).cloned()
}

/// Reads a string field, accepting numeric ids as their decimal text.
fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
