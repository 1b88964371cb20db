//! Gateway / Taplinker Model
//!
//! Shapes follow the `getAllDevices` response of the LinkTap API:
//!
//! ```json
//! {"devices": [{"gatewayId": "...", "name": "...", "taplinker": [
//!     {"taplinkerId": "...", "taplinkerName": "...", "signal": 82, "batteryStatus": "85%"}
//! ]}]}
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Remote inventory: every gateway of the account with its taplinkers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub devices: Vec<Gateway>,
}

impl Inventory {
    pub fn new(devices: Vec<Gateway>) -> Self {
        Self { devices }
    }

    /// Every taplinker paired with the gateway it belongs to
    pub fn taplinkers(&self) -> impl Iterator<Item = (&Gateway, &Taplinker)> {
        self.devices
            .iter()
            .flat_map(|gateway| gateway.taplinker.iter().map(move |t| (gateway, t)))
    }

    pub fn taplinker_count(&self) -> usize {
        self.devices.iter().map(|g| g.taplinker.len()).sum()
    }
}

/// Gateway entity (hub aggregating one or more valves)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gateway {
    pub gateway_id: String,
    pub name: String,
    /// Valves paired with this gateway
    #[serde(default)]
    pub taplinker: Vec<Taplinker>,
}

/// Taplinker entity (one remote-controlled valve)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taplinker {
    pub taplinker_id: String,
    pub taplinker_name: String,
    /// Radio signal quality; the API sends it as a number or a numeric string
    #[serde(default, deserialize_with = "lenient_level")]
    pub signal: Option<u8>,
    /// Battery level with its unit suffix, e.g. `"85%"`
    #[serde(default)]
    pub battery_status: Option<String>,
}

impl Taplinker {
    /// Battery percentage with the trailing unit character stripped
    pub fn battery_level(&self) -> Option<u8> {
        let raw = self.battery_status.as_deref()?.trim();
        let digits = match raw.chars().last() {
            Some(c) if !c.is_ascii_digit() => &raw[..raw.len() - c.len_utf8()],
            _ => raw,
        };
        digits.trim().parse::<f64>().ok().map(clamp_level)
    }
}

fn clamp_level(value: f64) -> u8 {
    value.round().clamp(0.0, f64::from(u8::MAX)) as u8
}

fn lenient_level<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().map(clamp_level),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(clamp_level),
        _ => None,
    })
}
