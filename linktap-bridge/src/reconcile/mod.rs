//! Device identity reconciliation
//!
//! Aligns the host's unit slots with the LinkTap inventory:
//!
//! ```text
//! host devices ──► SlotTable (seed)
//! getAllDevices ──► Inventory ──► missing (taplinker, kind) keys
//!                                   └─► next free slot ─► NewDevice ─► host
//! ```

mod slots;

use std::collections::BTreeMap;

use linktap_client::{LinkTapApi, WateringMode};
use shared::{DeviceKey, DeviceKind, Gateway, Inventory, NewDevice, Taplinker};

use crate::core::{BridgeError, BridgeResult, BridgeState};
use crate::host::DeviceHost;
use crate::poller::Cadence;

pub use slots::{next_free_slot, SlotTable};

/// Outcome of a reconciliation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// Out of cadence: nothing was called or changed
    Skipped,
    /// Discovery ran; the devices created in this run
    Completed(Vec<NewDevice>),
}

/// Creations needed to cover an inventory
#[derive(Debug)]
pub struct CreationPlan {
    pub creations: Vec<NewDevice>,
    /// Set when allocation stopped early; creations before it still stand
    pub halted: Option<BridgeError>,
}

/// Allocate a slot for every (taplinker, kind) pair missing from `slots`
///
/// Allocated keys are recorded in `slots` as they are planned.
pub fn plan_creations(slots: &mut SlotTable, inventory: &Inventory) -> CreationPlan {
    let mut creations = Vec::new();

    for (gateway, taplinker) in inventory.taplinkers() {
        for kind in DeviceKind::ALL {
            let key = DeviceKey::for_kind(taplinker.taplinker_id.clone(), kind);
            if slots.contains(&key) {
                continue;
            }

            let unit = match slots.next_free_slot() {
                Ok(unit) => unit,
                Err(e) => {
                    return CreationPlan {
                        creations,
                        halted: Some(e),
                    };
                }
            };

            slots.insert(key, unit);
            creations.push(new_device(kind, unit, gateway, taplinker));
        }
    }

    CreationPlan {
        creations,
        halted: None,
    }
}

/// Host device for one kind of a taplinker
pub fn new_device(kind: DeviceKind, unit: u8, gateway: &Gateway, taplinker: &Taplinker) -> NewDevice {
    let name = format!(
        "{} - {}{}",
        gateway.name,
        taplinker.taplinker_name,
        kind.name_suffix()
    );

    let (options, used) = match kind {
        DeviceKind::Counters => (BTreeMap::new(), false),
        DeviceKind::Modes => (mode_selector_options(), true),
    };

    NewDevice {
        unit,
        device_id: taplinker.taplinker_id.clone(),
        name,
        kind,
        type_code: kind.type_code(),
        switch_type: kind.switch_type(),
        image: kind.image(),
        options,
        used,
    }
}

/// Selector with the four watering modes at levels 10..40, level 0 hidden
fn mode_selector_options() -> BTreeMap<String, String> {
    let modes = [
        WateringMode::Interval,
        WateringMode::OddEven,
        WateringMode::SevenDay,
        WateringMode::Month,
    ];
    let level_names = std::iter::once("0")
        .chain(modes.iter().map(|m| m.label()))
        .collect::<Vec<_>>()
        .join("|");

    BTreeMap::from([
        ("Scenes".to_string(), "||||".to_string()),
        ("LevelActions".to_string(), "||||".to_string()),
        ("LevelNames".to_string(), level_names),
        ("LevelOffHidden".to_string(), "true".to_string()),
        ("SelectorStyle".to_string(), "1".to_string()),
    ])
}

/// Reconcile host devices with the remote inventory
///
/// Refuses silently when `tick` is not a discovery tick, so the 5 minute
/// limit of `getAllDevices` holds whatever the caller does. Otherwise the
/// slot table is rebuilt from the host, the inventory fetched and every
/// missing device created.
pub async fn reconcile<A>(
    state: &mut BridgeState,
    host: &mut dyn DeviceHost,
    api: &A,
    cadence: &Cadence,
    tick: u64,
) -> BridgeResult<Discovery>
where
    A: LinkTapApi + ?Sized,
{
    if !cadence.is_discovery_tick(tick) {
        tracing::debug!(tick, "Discovery skipped, rate limiting is 5 minutes");
        return Ok(Discovery::Skipped);
    }

    state.replace_slots(SlotTable::from_host(&host.devices()));

    let inventory = api.list_devices().await?;
    let plan = plan_creations(state.slots_mut(), &inventory);
    state.record_inventory(inventory);

    for (index, device) in plan.creations.iter().enumerate() {
        if let Err(e) = host.create_device(device) {
            // forget the slots the host never filled
            for skipped in &plan.creations[index..] {
                state.slots_mut().remove(&skipped.key());
            }
            return Err(e);
        }
        tracing::info!(
            unit = device.unit,
            kind = %device.kind,
            taplinker = %device.device_id,
            "Device {} created",
            device.name
        );
    }

    if let Some(e) = plan.halted {
        tracing::error!("{e}");
        return Err(e);
    }

    Ok(Discovery::Completed(plan.creations))
}
