//! Shared types for the LinkTap bridge
//!
//! Records exchanged between the cloud client and the bridge: the remote
//! inventory (gateways and taplinkers), the device kinds a valve is exposed
//! as, and the host-side device records.

pub mod error;
pub mod models;

// Re-exports
pub use error::UnknownKind;
pub use models::{
    DeviceKey, DeviceKind, DeviceUpdate, Gateway, HostDevice, Inventory, NewDevice, Taplinker,
    TypeCode,
};
pub use serde::{Deserialize, Serialize};
