//! Request and response shapes of the LinkTap API.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{ClientError, ClientResult};

pub const GET_ALL_DEVICES: &str = "getAllDevices";
pub const GET_WATERING_STATUS: &str = "getWateringStatus";

/// Request body: credentials plus the optional scope of the call
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiRequest<'a> {
    pub username: &'a str,
    pub api_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taplinker_id: Option<&'a str>,
}

/// Watering modes a taplinker can be switched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WateringMode {
    Interval,
    OddEven,
    SevenDay,
    Month,
}

impl WateringMode {
    /// Remote method activating this mode
    pub fn method(&self) -> &'static str {
        match self {
            WateringMode::Interval => "activateIntervalMode",
            WateringMode::OddEven => "activateOddEvenMode",
            WateringMode::SevenDay => "activateSevenDayMode",
            WateringMode::Month => "activateMonthMode",
        }
    }

    /// Label shown on the host selector
    pub fn label(&self) -> &'static str {
        match self {
            WateringMode::Interval => "Intervals",
            WateringMode::OddEven => "Odd-Even",
            WateringMode::SevenDay => "Seven days",
            WateringMode::Month => "Months",
        }
    }
}

/// Current watering state of a taplinker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WateringStatus {
    /// Flow velocity in milli-units
    #[serde(deserialize_with = "lenient_i64")]
    pub vel: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WateringStatusResponse {
    #[serde(default)]
    pub status: Option<WateringStatus>,
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|v| v as i64))
            .ok_or_else(|| serde::de::Error::custom("vel out of range")),
        Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected integer vel, got {other}"
        ))),
    }
}

/// Whether a body carries a `result` field at all
pub fn has_envelope(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .map(|value| value.get("result").is_some())
        .unwrap_or(false)
}

/// Unwrap the `{"result": ...}` envelope of a response body
///
/// `ok` deserializes the whole body into `T`, `error` yields
/// [`ClientError::Api`] with the service message, anything else yields
/// [`ClientError::UnexpectedResult`] with the raw code.
pub fn parse_envelope<T: DeserializeOwned>(body: &str) -> ClientResult<T> {
    let value: Value = serde_json::from_str(body)?;

    let result = match value.get("result") {
        Some(Value::String(result)) => result.as_str(),
        Some(other) => return Err(ClientError::UnexpectedResult(other.to_string())),
        None => {
            return Err(ClientError::InvalidResponse(
                "Missing result field".to_string(),
            ));
        }
    };

    match result {
        "ok" => Ok(serde_json::from_value(value)?),
        "error" => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("no message")
                .to_string();
            Err(ClientError::Api(message))
        }
        other => Err(ClientError::UnexpectedResult(other.to_string())),
    }
}
