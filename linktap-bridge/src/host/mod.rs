//! Host interface
//!
//! The host owns device storage and drives the bridge through callbacks.
//! [`DeviceHost`] is what the bridge needs from the host, [`HostPlugin`] is
//! what the host calls on the bridge.

mod memory;

use async_trait::async_trait;
use shared::{DeviceUpdate, HostDevice, NewDevice};

use crate::core::BridgeResult;

pub use memory::{MemoryDevice, MemoryHost};

/// Device storage of the host
pub trait DeviceHost: Send + Sync {
    /// Every device currently registered for this hardware
    fn devices(&self) -> Vec<HostDevice>;

    fn device(&self, unit: u8) -> Option<HostDevice> {
        self.devices().into_iter().find(|device| device.unit == unit)
    }

    fn create_device(&mut self, device: &NewDevice) -> BridgeResult<()>;

    fn update_device(&mut self, unit: u8, update: &DeviceUpdate) -> BridgeResult<()>;
}

/// Callbacks the host invokes, one at a time, each run to completion
#[async_trait]
pub trait HostPlugin: Send {
    async fn on_start(&mut self, host: &mut dyn DeviceHost);

    async fn on_heartbeat(&mut self, host: &mut dyn DeviceHost);

    /// User action on the device at `unit`
    async fn on_command(&mut self, host: &mut dyn DeviceHost, unit: u8, command: &str, level: i32);

    async fn on_stop(&mut self);
}
