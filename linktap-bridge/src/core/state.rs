use std::collections::HashMap;

use shared::{DeviceKey, DeviceKind, Inventory};

use crate::reconcile::SlotTable;

/// Mutable state of one bridge instance
///
/// Owned by [`LinkTapBridge`](crate::LinkTapBridge) and only touched from
/// inside a host callback, one callback at a time.
#[derive(Debug, Default)]
pub struct BridgeState {
    /// Heartbeats seen since start
    ticks: u64,
    slots: SlotTable,
    /// taplinker id → gateway id
    gateways: HashMap<String, String>,
    /// taplinker id → display name
    taplinker_names: HashMap<String, String>,
    /// Last inventory returned by discovery
    inventory: Inventory,
}

impl BridgeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the heartbeat counter, returning the new tick
    pub fn advance_tick(&mut self) -> u64 {
        self.ticks += 1;
        self.ticks
    }

    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut SlotTable {
        &mut self.slots
    }

    pub fn replace_slots(&mut self, slots: SlotTable) {
        self.slots = slots;
    }

    pub fn slot_of(&self, taplinker_id: &str, kind: DeviceKind) -> Option<u8> {
        self.slots.get(&DeviceKey::for_kind(taplinker_id, kind))
    }

    pub fn gateway_of(&self, taplinker_id: &str) -> Option<&str> {
        self.gateways.get(taplinker_id).map(String::as_str)
    }

    /// Display name of a taplinker, falling back to its id
    pub fn taplinker_name<'a>(&'a self, taplinker_id: &'a str) -> &'a str {
        self.taplinker_names
            .get(taplinker_id)
            .map(String::as_str)
            .unwrap_or(taplinker_id)
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Remember a fresh inventory along with the gateway and name of every valve
    pub fn record_inventory(&mut self, inventory: Inventory) {
        for (gateway, taplinker) in inventory.taplinkers() {
            self.gateways
                .insert(taplinker.taplinker_id.clone(), gateway.gateway_id.clone());
            self.taplinker_names.insert(
                taplinker.taplinker_id.clone(),
                taplinker.taplinker_name.clone(),
            );
        }
        self.inventory = inventory;
    }

    /// Log the slot table and the known valves at debug level
    pub fn dump(&self) {
        tracing::debug!(
            ticks = self.ticks,
            slots = self.slots.len(),
            taplinkers = self.gateways.len(),
            "Bridge state"
        );

        let mut slots: Vec<_> = self.slots.iter().collect();
        slots.sort_by_key(|(_, slot)| *slot);
        for (key, slot) in slots {
            let kind = key.kind().map(|k| k.as_str()).unwrap_or("foreign");
            tracing::debug!(slot, key = %key, kind, "Device slot");
        }

        for (taplinker_id, gateway_id) in &self.gateways {
            tracing::debug!(
                taplinker = %taplinker_id,
                name = %self.taplinker_name(taplinker_id),
                gateway = %gateway_id,
                "Known taplinker"
            );
        }
    }
}
