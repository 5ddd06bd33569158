// ── Device actuator ──
//
// Applies one ConfigAction to one device over a scoped session. The
// session is opened per action and released when it drops, on success
// and failure alike. Device I/O is blocking and runs on the blocking
// thread pool.

pub mod ssh;

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ActuatorCause, ActuatorError, TransportError};
use crate::model::{ConfigAction, Device, VlanId};

/// An open configuration session on one device.
///
/// Dropping the session must release it.
pub trait DeviceSession {
    /// Enter config mode, send `commands` in order, return the device output.
    fn send_config_set(&mut self, commands: &[String]) -> Result<String, TransportError>;
}

/// Opens configuration sessions to devices by management address.
pub trait DeviceTransport: Send + Sync + 'static {
    type Session: DeviceSession;

    fn open(&self, address: &str) -> Result<Self::Session, TransportError>;
}

/// Pushes VLAN changes to devices.
pub struct Actuator<T> {
    transport: Arc<T>,
}

impl<T> Clone for Actuator<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: DeviceTransport> Actuator<T> {
    pub fn new(transport: T) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    /// Share a transport that the caller also holds (tests inspect it).
    pub fn from_arc(transport: Arc<T>) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Create the VLAN on the device, or rename it if it exists.
    pub async fn apply_add(
        &self,
        device: &Device,
        vlan_id: VlanId,
        vlan_name: &str,
    ) -> Result<(), ActuatorError> {
        self.apply(device, &ConfigAction::add(vlan_id, vlan_name)).await
    }

    /// Delete the VLAN from the device. A VLAN that is already absent
    /// counts as removed.
    pub async fn apply_remove(&self, device: &Device, vlan_id: VlanId) -> Result<(), ActuatorError> {
        self.apply(device, &ConfigAction::remove(vlan_id)).await
    }

    pub async fn apply(&self, device: &Device, action: &ConfigAction) -> Result<(), ActuatorError> {
        let Some(address) = device.management_address.clone() else {
            return Err(ActuatorError::new(
                device,
                action,
                ActuatorCause::NoManagementAddress,
            ));
        };

        debug!(device = %device.name, %address, %action, "opening device session");

        let transport = Arc::clone(&self.transport);
        let commands = action.commands();
        let joined = tokio::task::spawn_blocking(move || {
            run_session(&*transport, &address, &commands)
        })
        .await;

        let result = match joined {
            Ok(result) => result,
            Err(e) => {
                return Err(ActuatorError::new(
                    device,
                    action,
                    ActuatorCause::Aborted(e.to_string()),
                ));
            }
        };

        match result {
            Ok(output) => {
                debug!(device = %device.name, %action, output_len = output.len(), "config applied");
                Ok(())
            }
            Err(e) if action.is_remove() && e.is_absent_vlan() => {
                info!(device = %device.name, %action, "VLAN already absent");
                Ok(())
            }
            Err(e) => Err(ActuatorError::new(device, action, e.into())),
        }
    }
}

fn run_session<T: DeviceTransport>(
    transport: &T,
    address: &str,
    commands: &[String],
) -> Result<String, TransportError> {
    let mut session = transport.open(address)?;
    session.send_config_set(commands)
}
