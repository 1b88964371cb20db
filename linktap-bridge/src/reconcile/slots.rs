//! Slot table: composite device key → host unit slot

use std::collections::{BTreeSet, HashMap};

use shared::{DeviceKey, HostDevice};

use crate::core::error::{BridgeError, BridgeResult, MAX_SLOT};

/// Mapping of every host device key to the unit slot it occupies
///
/// Rebuilt from the host's device list on each discovery; between
/// discoveries it is a cache of that list plus the devices created since.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotTable {
    slots: HashMap<DeviceKey, u8>,
    /// Every unit in use, including units whose key is shared with another device
    occupied: BTreeSet<u8>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the table from the devices the host currently knows
    pub fn from_host(devices: &[HostDevice]) -> Self {
        let slots = devices
            .iter()
            .map(|device| (device.key(), device.unit))
            .collect();
        let occupied = devices.iter().map(|device| device.unit).collect();
        Self { slots, occupied }
    }

    pub fn get(&self, key: &DeviceKey) -> Option<u8> {
        self.slots.get(key).copied()
    }

    pub fn contains(&self, key: &DeviceKey) -> bool {
        self.slots.contains_key(key)
    }

    pub fn insert(&mut self, key: DeviceKey, slot: u8) -> Option<u8> {
        self.occupied.insert(slot);
        self.slots.insert(key, slot)
    }

    /// Forget a key and free its unit
    pub fn remove(&mut self, key: &DeviceKey) -> Option<u8> {
        let slot = self.slots.remove(key)?;
        if !self.slots.values().any(|s| *s == slot) {
            self.occupied.remove(&slot);
        }
        Some(slot)
    }

    /// Whether any device holds `slot`
    pub fn is_occupied(&self, slot: u8) -> bool {
        self.occupied.contains(&slot)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DeviceKey, u8)> {
        self.slots.iter().map(|(key, slot)| (key, *slot))
    }

    /// Lowest unit not taken by the contiguous run starting at 1
    pub fn next_free_slot(&self) -> BridgeResult<u8> {
        next_free_slot(self.occupied.iter().copied())
    }
}

/// Find the first hole in the occupied slots
///
/// Walks the sorted slots tracking the expected next value: the first slot
/// that skips a value yields the skipped value, otherwise the slot after the
/// maximum. No slots yields 1. Past [`MAX_SLOT`] is a capacity error.
pub fn next_free_slot(occupied: impl IntoIterator<Item = u8>) -> BridgeResult<u8> {
    let mut sorted: Vec<u8> = occupied.into_iter().filter(|slot| *slot > 0).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut expected: u16 = 1;
    for slot in sorted {
        if u16::from(slot) != expected {
            break;
        }
        expected += 1;
    }

    u8::try_from(expected).map_err(|_| BridgeError::CapacityExceeded { max: MAX_SLOT })
}
