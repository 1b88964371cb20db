//! Watering mode commands
//!
//! The modes selector of a taplinker sends levels 10/20/30/40; each maps to
//! one `activate*Mode` call addressed to the taplinker and its gateway.

use linktap_client::{LinkTapApi, WateringMode};

use crate::core::{BridgeError, BridgeResult, BridgeState};
use crate::host::DeviceHost;

/// Selector level → watering mode
pub fn mode_for_level(level: i32) -> BridgeResult<WateringMode> {
    match level {
        10 => Ok(WateringMode::Interval),
        20 => Ok(WateringMode::OddEven),
        30 => Ok(WateringMode::SevenDay),
        40 => Ok(WateringMode::Month),
        other => Err(BridgeError::UnknownLevel(other)),
    }
}

/// Send the mode selected on the device at `unit`
///
/// Nothing is sent unless the level is known and the taplinker's gateway
/// was recorded by a previous discovery.
pub async fn dispatch<A>(
    state: &BridgeState,
    host: &dyn DeviceHost,
    api: &A,
    unit: u8,
    level: i32,
) -> BridgeResult<WateringMode>
where
    A: LinkTapApi + ?Sized,
{
    let mode = mode_for_level(level)?;

    let device = host.device(unit).ok_or(BridgeError::UnknownUnit(unit))?;
    let taplinker_id = device.device_id;
    let gateway_id = state
        .gateway_of(&taplinker_id)
        .ok_or_else(|| BridgeError::GatewayUnknown(taplinker_id.clone()))?;

    api.send_command(mode, gateway_id, &taplinker_id).await?;

    tracing::info!(
        unit,
        taplinker = %taplinker_id,
        mode = mode.label(),
        "Command sent successfully to taplinker {}",
        state.taplinker_name(&taplinker_id)
    );
    Ok(mode)
}
