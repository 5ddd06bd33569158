// ── Ingestion gate ──
//
// Guards what reaches the event queue. NetBox signs each webhook body
// with HMAC-SHA512 over the shared secret and sends the hex digest in
// `X-Hook-Signature`. Accepted payloads are queued byte-for-byte.
//
// Checks run in order: signature, JSON shape, model, `Protected` tag.
// A VLAN tagged `Protected` is never queued, so the worker never sees it.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sha2::Sha512;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::QueueError;
use crate::model::extract_name;
use crate::queue::EventQueue;

type HmacSha512 = Hmac<Sha512>;

/// Header NetBox puts the body signature in.
pub const SIGNATURE_HEADER: &str = "X-Hook-Signature";

/// Tag that shields a VLAN from automation.
pub const PROTECTED_TAG: &str = "Protected";

#[derive(Debug, Error)]
pub enum GateError {
    #[error("missing X-Hook-Signature header")]
    MissingSignature,

    #[error("signature mismatch")]
    InvalidSignature,

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("unsupported model {model:?}, only vlan is handled")]
    WrongModel { model: String },

    #[error("VLAN {vlan} is tagged Protected")]
    Protected { vlan: String },

    #[error("cannot queue event: {0}")]
    Queue(#[from] QueueError),
}

impl GateError {
    /// HTTP status a webhook endpoint should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingSignature | Self::InvalidSignature | Self::Protected { .. } => 403,
            Self::InvalidPayload(_) | Self::WrongModel { .. } => 400,
            Self::Queue(_) => 503,
        }
    }
}

/// A payload that passed every check and was queued.
#[derive(Debug, Clone)]
pub struct Accepted {
    pub event: String,
    pub vlan_id: Option<u64>,
    pub bytes: usize,
}

impl Accepted {
    /// Status for a queued event.
    pub const STATUS_CODE: u16 = 202;
}

/// Hex HMAC-SHA512 of `body` under `secret`.
pub fn sign(secret: &SecretString, body: &[u8]) -> String {
    let mut mac = new_mac(secret);
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a hex signature against `body`.
pub fn verify_signature(secret: &SecretString, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let mut mac = new_mac(secret);
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

fn new_mac(secret: &SecretString) -> HmacSha512 {
    HmacSha512::new_from_slice(secret.expose_secret().as_bytes())
        .expect("HMAC accepts keys of any length")
}

/// Whether the webhook's current VLAN data carries the `Protected` tag.
pub fn is_protected(payload: &Value) -> bool {
    payload
        .pointer("/data/tags")
        .and_then(Value::as_array)
        .is_some_and(|tags| tags.iter().any(|tag| extract_name(tag) == PROTECTED_TAG))
}

/// Verifies and filters webhook bodies before queuing them.
pub struct IngestGate<Q> {
    secret: SecretString,
    queue: Q,
}

impl<Q: EventQueue> IngestGate<Q> {
    pub fn new(secret: SecretString, queue: Q) -> Self {
        Self { secret, queue }
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Run every check on `body` and queue it if all pass.
    pub async fn accept(&self, body: &[u8], signature: Option<&str>) -> Result<Accepted, GateError> {
        let signature = signature.ok_or_else(|| {
            warn!("webhook rejected: missing signature");
            GateError::MissingSignature
        })?;
        if !verify_signature(&self.secret, body, signature) {
            warn!("webhook rejected: signature mismatch");
            return Err(GateError::InvalidSignature);
        }

        let payload: Value =
            serde_json::from_slice(body).map_err(|e| GateError::InvalidPayload(e.to_string()))?;
        if !payload.is_object() {
            return Err(GateError::InvalidPayload("expected a JSON object".into()));
        }

        let model = payload.get("model").and_then(Value::as_str).unwrap_or("");
        if model != "vlan" {
            warn!(model, "webhook rejected: unsupported model");
            return Err(GateError::WrongModel {
                model: model.to_owned(),
            });
        }

        let vlan_id = payload.pointer("/data/vid").and_then(Value::as_u64);
        if is_protected(&payload) {
            let vlan = payload
                .pointer("/data/name")
                .and_then(Value::as_str)
                .map_or_else(|| vlan_id.map_or_else(|| "?".into(), |id| id.to_string()), str::to_owned);
            warn!(%vlan, "webhook rejected: VLAN is protected");
            return Err(GateError::Protected { vlan });
        }

        self.queue.push(body).await?;

        let event = payload
            .get("event")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_owned();
        info!(%event, vlan_id, bytes = body.len(), "webhook queued");
        Ok(Accepted {
            event,
            vlan_id,
            bytes: body.len(),
        })
    }
}
