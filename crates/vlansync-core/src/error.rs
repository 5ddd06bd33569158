// ── Core error types ──
//
// One enum per failure boundary. Device-level errors (ActuatorError)
// never escalate to event level; event-level errors (EventError) never
// stop the worker loop. The `From<vlansync_api::Error>` impl sorts NetBox
// errors into credential, retryable and query failures.

use thiserror::Error;

use crate::model::{ConfigAction, Device, SiteId};

// ── Event validation ─────────────────────────────────────────────────

/// A queued payload that can never become a valid VLAN event.
///
/// Terminal for the event: logged and dropped, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedEvent {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("missing VLAN data")]
    MissingData,

    #[error("missing or invalid site information")]
    MissingSite,

    #[error("missing site ID")]
    MissingSiteId,

    #[error("missing required VLAN information (vid: {vid}, name: {name})")]
    MissingVlan { vid: String, name: String },

    #[error("invalid VLAN id {value}: expected an integer in 1..=4094")]
    InvalidVlanId { value: String },

    #[error("VLAN name {name:?} contains control characters")]
    InvalidVlanName { name: String },

    #[error("{field} must be a list of tags")]
    InvalidTags { field: &'static str },
}

// ── Inventory ────────────────────────────────────────────────────────

/// Failure of the inventory collaborator itself.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("inventory rejected credentials: {message}")]
    Authentication { message: String },

    #[error("inventory unreachable: {message}")]
    Unreachable { message: String },

    #[error("inventory query failed: {message}")]
    Query { message: String },
}

impl From<vlansync_api::Error> for InventoryError {
    fn from(err: vlansync_api::Error) -> Self {
        if err.is_auth() {
            return Self::Authentication {
                message: err.to_string(),
            };
        }
        if err.is_transient() {
            return Self::Unreachable {
                message: err.to_string(),
            };
        }
        match err {
            vlansync_api::Error::Tls(message) => Self::Unreachable { message },
            other => Self::Query {
                message: other.to_string(),
            },
        }
    }
}

/// Device targeting could not run because the inventory query failed.
#[derive(Debug, Error)]
#[error("inventory unavailable for site {site_id}: {source}")]
pub struct InventoryUnavailable {
    pub site_id: SiteId,
    #[source]
    pub source: InventoryError,
}

// ── Device transport ─────────────────────────────────────────────────

/// Failure inside a device configuration session.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("cannot connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    #[error("authentication to {address} failed: {reason}")]
    Authentication { address: String, reason: String },

    #[error("device rejected command: {message}")]
    CommandRejected { message: String },

    #[error("session error: {0}")]
    Session(String),
}

impl TransportError {
    /// Whether the device reported that the target VLAN does not exist.
    pub fn is_absent_vlan(&self) -> bool {
        match self {
            Self::CommandRejected { message } => {
                let message = message.to_ascii_lowercase();
                message.contains("not found") || message.contains("does not exist")
            }
            _ => false,
        }
    }
}

/// Why a single device action failed.
#[derive(Debug, Error)]
pub enum ActuatorCause {
    #[error("device has no management address")]
    NoManagementAddress,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("session task aborted: {0}")]
    Aborted(String),
}

/// A device-level failure. Never affects sibling devices or later events.
#[derive(Debug, Error)]
#[error("failed to {action} on {device} (#{device_id}): {cause}")]
pub struct ActuatorError {
    pub device_id: u64,
    pub device: String,
    pub action: ConfigAction,
    #[source]
    pub cause: ActuatorCause,
}

impl ActuatorError {
    pub fn new(device: &Device, action: &ConfigAction, cause: ActuatorCause) -> Self {
        Self {
            device_id: device.id,
            device: device.name.clone(),
            action: action.clone(),
            cause,
        }
    }
}

// ── Queue ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue connection failed: {0}")]
    Connection(String),

    #[error("queue command failed: {0}")]
    Command(String),
}

impl From<redis::RedisError> for QueueError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
            Self::Connection(err.to_string())
        } else {
            Self::Command(err.to_string())
        }
    }
}

// ── Event level ──────────────────────────────────────────────────────

/// Why an event was abandoned. Logged; the loop moves on.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed event: {0}")]
    Malformed(#[from] MalformedEvent),

    #[error(transparent)]
    InventoryUnavailable(#[from] InventoryUnavailable),
}
