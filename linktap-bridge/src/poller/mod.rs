//! Heartbeat handling and status refresh
//!
//! Every heartbeat advances the tick counter. On status ticks (~30s) a
//! discovery attempt runs (it gates itself to ~5min) followed by a watering
//! status refresh of every taplinker that has a counter device.

mod cadence;
mod flow;

use linktap_client::LinkTapApi;
use shared::{DeviceKind, DeviceUpdate};

use crate::core::BridgeState;
use crate::host::DeviceHost;
use crate::reconcile::{self, Discovery};

pub use cadence::{Cadence, DISCOVERY_INTERVAL, STATUS_INTERVAL};
pub use flow::FlowReading;

/// What a heartbeat did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeartbeatReport {
    pub tick: u64,
    /// Discovery ran (successfully or not) on this tick
    pub discovered: bool,
    pub refresh: Option<RefreshReport>,
}

/// Outcome of one status refresh pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub updated: usize,
    pub failed: usize,
}

/// Handle one host heartbeat
pub async fn on_heartbeat<A>(
    state: &mut BridgeState,
    host: &mut dyn DeviceHost,
    api: &A,
    cadence: &Cadence,
) -> HeartbeatReport
where
    A: LinkTapApi + ?Sized,
{
    let tick = state.advance_tick();
    let mut report = HeartbeatReport {
        tick,
        ..Default::default()
    };

    if !cadence.is_status_tick(tick) {
        return report;
    }

    match reconcile::reconcile(state, host, api, cadence, tick).await {
        Ok(Discovery::Skipped) => {}
        Ok(Discovery::Completed(created)) => {
            report.discovered = true;
            if !created.is_empty() {
                tracing::info!(tick, created = created.len(), "Discovery created devices");
            }
        }
        Err(e) => {
            report.discovered = true;
            tracing::error!(tick, "Discovery failed: {e}");
        }
    }

    report.refresh = Some(refresh_status(state, host, api).await);
    report
}

/// Push the current flow of every taplinker with a counter device
///
/// A failing taplinker is logged and skipped until the next pass.
pub async fn refresh_status<A>(
    state: &BridgeState,
    host: &mut dyn DeviceHost,
    api: &A,
) -> RefreshReport
where
    A: LinkTapApi + ?Sized,
{
    let mut report = RefreshReport::default();

    for (_, taplinker) in state.inventory().taplinkers() {
        let taplinker_id = taplinker.taplinker_id.as_str();
        let Some(unit) = state.slot_of(taplinker_id, DeviceKind::Counters) else {
            continue;
        };

        let status = match api.watering_status(taplinker_id).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(
                    taplinker = %taplinker_id,
                    "Error while retrieving watering status: {e}"
                );
                report.failed += 1;
                continue;
            }
        };

        let flow = FlowReading::from_status(status.as_ref());
        let update = DeviceUpdate {
            n_value: flow.n_value(),
            s_value: flow.s_value(),
            signal_level: taplinker.signal,
            battery_level: taplinker.battery_level(),
        };

        if let Err(e) = host.update_device(unit, &update) {
            tracing::error!(unit, taplinker = %taplinker_id, "Failed to update device: {e}");
            report.failed += 1;
            continue;
        }

        tracing::info!(
            unit,
            taplinker = %taplinker_id,
            "Updated device {}, flow is {}",
            taplinker.taplinker_name,
            update.s_value
        );
        report.updated += 1;
    }

    report
}
