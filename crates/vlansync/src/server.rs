//! HTTP front of the ingestion gate.
//!
//! NetBox delivers VLAN webhooks to `POST /webhook/vlan` with the body
//! signature in `X-Hook-Signature`. Every decision is made by
//! [`IngestGate::accept`]; this module only maps its outcome onto a status
//! code and a small JSON body.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tracing::{debug, error};

use vlansync_core::gate::SIGNATURE_HEADER;
use vlansync_core::{Accepted, EventQueue, GateError, IngestGate};

pub const WEBHOOK_PATH: &str = "/webhook/vlan";

pub fn router<Q>(gate: Arc<IngestGate<Q>>) -> Router
where
    Q: EventQueue + 'static,
{
    Router::new()
        .route(WEBHOOK_PATH, post(vlan_webhook::<Q>))
        .with_state(gate)
}

async fn vlan_webhook<Q>(
    State(gate): State<Arc<IngestGate<Q>>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>)
where
    Q: EventQueue + 'static,
{
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    match gate.accept(&body, signature).await {
        Ok(accepted) => {
            debug!(event = %accepted.event, bytes = accepted.bytes, "webhook answered");
            (
                status(Accepted::STATUS_CODE),
                Json(json!({ "status": "Task queued" })),
            )
        }
        Err(err) => {
            if let GateError::Queue(cause) = &err {
                error!(error = %cause, "webhook passed every check but could not be queued");
            }
            (
                status(err.status_code()),
                Json(json!({ "error": err.to_string() })),
            )
        }
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
