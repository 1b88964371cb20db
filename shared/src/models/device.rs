//! Host Device Model
//!
//! Each taplinker is exposed to the host as one device per [`DeviceKind`].
//! The host identifies devices by a unit slot (1..=255) and remembers the
//! remote identity plus the type/subtype pair each device was created with.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownKind;

/// Host device type/subtype pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeCode {
    pub device_type: u8,
    pub sub_type: u8,
}

impl TypeCode {
    pub const fn new(device_type: u8, sub_type: u8) -> Self {
        Self {
            device_type,
            sub_type,
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.device_type, self.sub_type)
    }
}

/// Logical device role derived from a single taplinker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Water flow counter (telemetry)
    Counters,
    /// Watering mode selector switch
    Modes,
}

impl DeviceKind {
    /// Every kind, in creation order
    pub const ALL: [DeviceKind; 2] = [DeviceKind::Counters, DeviceKind::Modes];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Counters => "counters",
            DeviceKind::Modes => "modes",
        }
    }

    /// Host type/subtype the device is created with
    pub fn type_code(&self) -> TypeCode {
        match self {
            DeviceKind::Counters => TypeCode::new(243, 30),
            DeviceKind::Modes => TypeCode::new(244, 62),
        }
    }

    pub fn from_type_code(code: TypeCode) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_code() == code)
    }

    /// Host switch type, only selectors have one
    pub fn switch_type(&self) -> Option<u8> {
        match self {
            DeviceKind::Counters => None,
            DeviceKind::Modes => Some(18),
        }
    }

    /// Host image index
    pub fn image(&self) -> u8 {
        match self {
            DeviceKind::Counters => 1,
            DeviceKind::Modes => 20,
        }
    }

    /// Suffix appended to `"<gateway> - <taplinker>"` to name the device
    pub fn name_suffix(&self) -> &'static str {
        match self {
            DeviceKind::Counters => " Counters",
            DeviceKind::Modes => " Watering Modes",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counters" => Ok(DeviceKind::Counters),
            "modes" => Ok(DeviceKind::Modes),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Composite key binding a host slot: remote identity + type code
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceKey {
    pub device_id: String,
    pub type_code: TypeCode,
}

impl DeviceKey {
    pub fn new(device_id: impl Into<String>, type_code: TypeCode) -> Self {
        Self {
            device_id: device_id.into(),
            type_code,
        }
    }

    pub fn for_kind(device_id: impl Into<String>, kind: DeviceKind) -> Self {
        Self::new(device_id, kind.type_code())
    }

    pub fn kind(&self) -> Option<DeviceKind> {
        DeviceKind::from_type_code(self.type_code)
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.device_id, self.type_code)
    }
}

/// Device as the host reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDevice {
    pub unit: u8,
    /// Remote identity the device is bound to (taplinker id)
    pub device_id: String,
    pub name: String,
    pub type_code: TypeCode,
}

impl HostDevice {
    pub fn key(&self) -> DeviceKey {
        DeviceKey::new(self.device_id.clone(), self.type_code)
    }
}

/// Device creation request handed to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDevice {
    pub unit: u8,
    pub device_id: String,
    pub name: String,
    pub kind: DeviceKind,
    pub type_code: TypeCode,
    pub switch_type: Option<u8>,
    pub image: u8,
    /// Host display options (selector levels etc.)
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    /// Whether the device shows up on the host dashboard right away
    pub used: bool,
}

impl NewDevice {
    pub fn key(&self) -> DeviceKey {
        DeviceKey::new(self.device_id.clone(), self.type_code)
    }

    pub fn as_host_device(&self) -> HostDevice {
        HostDevice {
            unit: self.unit,
            device_id: self.device_id.clone(),
            name: self.name.clone(),
            type_code: self.type_code,
        }
    }
}

/// Value update pushed to a host device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceUpdate {
    pub n_value: i64,
    pub s_value: String,
    pub signal_level: Option<u8>,
    pub battery_level: Option<u8>,
}
