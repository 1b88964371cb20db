// linktap-bridge/src/host/memory.rs
// In-memory host used by the stand-alone binary and the tests

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use shared::{DeviceUpdate, HostDevice, NewDevice};

use super::DeviceHost;
use crate::core::{BridgeError, BridgeResult};

/// Device record kept by [`MemoryHost`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryDevice {
    pub device: NewDevice,
    #[serde(default)]
    pub last_update: Option<DeviceUpdate>,
}

/// Device table held in memory, optionally persisted as JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryHost {
    devices: BTreeMap<u8, MemoryDevice>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a device table written by [`MemoryHost::save`]; a missing file is an empty host
    pub fn load(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let data = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::host(format!("Failed to read {}: {e}", path.display())))?;
        serde_json::from_str(&data)
            .map_err(|e| BridgeError::host(format!("Failed to parse {}: {e}", path.display())))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> BridgeResult<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| BridgeError::host(format!("Failed to serialize devices: {e}")))?;
        std::fs::write(path, data)
            .map_err(|e| BridgeError::host(format!("Failed to write {}: {e}", path.display())))
    }

    pub fn get(&self, unit: u8) -> Option<&MemoryDevice> {
        self.devices.get(&unit)
    }

    /// Drop a device, as a user deleting it in the host UI would
    pub fn remove(&mut self, unit: u8) -> Option<MemoryDevice> {
        self.devices.remove(&unit)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl DeviceHost for MemoryHost {
    fn devices(&self) -> Vec<HostDevice> {
        self.devices
            .values()
            .map(|d| d.device.as_host_device())
            .collect()
    }

    fn device(&self, unit: u8) -> Option<HostDevice> {
        self.devices.get(&unit).map(|d| d.device.as_host_device())
    }

    fn create_device(&mut self, device: &NewDevice) -> BridgeResult<()> {
        if device.unit == 0 {
            return Err(BridgeError::host("Unit 0 is not a valid device slot"));
        }
        if self.devices.contains_key(&device.unit) {
            return Err(BridgeError::host(format!(
                "Unit {} is already in use",
                device.unit
            )));
        }
        tracing::debug!(unit = device.unit, name = %device.name, "Host device created");
        self.devices.insert(
            device.unit,
            MemoryDevice {
                device: device.clone(),
                last_update: None,
            },
        );
        Ok(())
    }

    fn update_device(&mut self, unit: u8, update: &DeviceUpdate) -> BridgeResult<()> {
        let entry = self
            .devices
            .get_mut(&unit)
            .ok_or(BridgeError::UnknownUnit(unit))?;
        entry.last_update = Some(update.clone());
        Ok(())
    }
}
