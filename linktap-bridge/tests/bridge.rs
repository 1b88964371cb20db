//! End-to-end plugin behavior against a scripted LinkTap API and the in-memory host

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use linktap_bridge::reconcile::{self, Discovery};
use linktap_bridge::{
    BridgeError, BridgeState, Cadence, Config, DeviceHost, HostPlugin, LinkTapBridge, MemoryHost,
};
use linktap_client::{ClientError, ClientResult, LinkTapApi, WateringMode, WateringStatus};
use shared::{DeviceKind, Gateway, Inventory, NewDevice, Taplinker, TypeCode};

#[derive(Default)]
struct ScriptedApi {
    calls: Mutex<Vec<String>>,
    inventory: Mutex<Inventory>,
    /// taplinker id → flow or error message; unknown ids report no status
    statuses: Mutex<HashMap<String, Result<i64, String>>>,
    command_error: Mutex<Option<String>>,
    list_error: Mutex<Option<String>>,
}

impl ScriptedApi {
    fn with_inventory(inventory: Inventory) -> Self {
        Self {
            inventory: Mutex::new(inventory),
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn set_status(&self, taplinker_id: &str, status: Result<i64, String>) {
        self.statuses
            .lock()
            .unwrap()
            .insert(taplinker_id.to_string(), status);
    }
}

#[async_trait]
impl LinkTapApi for ScriptedApi {
    async fn list_devices(&self) -> ClientResult<Inventory> {
        self.calls.lock().unwrap().push("getAllDevices".to_string());
        if let Some(message) = self.list_error.lock().unwrap().clone() {
            return Err(ClientError::Api(message));
        }
        Ok(self.inventory.lock().unwrap().clone())
    }

    async fn watering_status(&self, taplinker_id: &str) -> ClientResult<Option<WateringStatus>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("getWateringStatus {taplinker_id}"));
        match self.statuses.lock().unwrap().get(taplinker_id) {
            Some(Ok(vel)) => Ok(Some(WateringStatus { vel: *vel })),
            Some(Err(message)) => Err(ClientError::Api(message.clone())),
            None => Ok(None),
        }
    }

    async fn send_command(
        &self,
        mode: WateringMode,
        gateway_id: &str,
        taplinker_id: &str,
    ) -> ClientResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {gateway_id} {taplinker_id}", mode.method()));
        match self.command_error.lock().unwrap().clone() {
            Some(message) => Err(ClientError::Api(message)),
            None => Ok(()),
        }
    }
}

fn taplinker(id: &str, name: &str) -> Taplinker {
    Taplinker {
        taplinker_id: id.to_string(),
        taplinker_name: name.to_string(),
        signal: Some(82),
        battery_status: Some("85%".to_string()),
    }
}

fn garden(taplinkers: Vec<Taplinker>) -> Inventory {
    Inventory::new(vec![Gateway {
        gateway_id: "GW01".to_string(),
        name: "Garden".to_string(),
        taplinker: taplinkers,
    }])
}

fn bridge(api: ScriptedApi) -> LinkTapBridge<ScriptedApi> {
    LinkTapBridge::new(api, &Config::new("alice", "0123456789abcdef"))
}

fn foreign_device(unit: u8) -> NewDevice {
    NewDevice {
        unit,
        device_id: format!("switch-{unit}"),
        name: format!("Switch {unit}"),
        kind: DeviceKind::Counters,
        type_code: TypeCode::new(244, 73),
        switch_type: Some(0),
        image: 0,
        options: Default::default(),
        used: true,
    }
}

async fn heartbeats(bridge: &mut LinkTapBridge<ScriptedApi>, host: &mut MemoryHost, n: usize) {
    for _ in 0..n {
        bridge.on_heartbeat(host).await;
    }
}

#[tokio::test]
async fn test_start_creates_two_devices_per_taplinker() {
    let mut host = MemoryHost::new();
    let mut bridge = bridge(ScriptedApi::with_inventory(garden(vec![
        taplinker("TL01", "Roses"),
        taplinker("TL02", "Hedge"),
    ])));

    bridge.on_start(&mut host).await;

    assert_eq!(host.len(), 4);
    assert_eq!(bridge.api().count("getAllDevices"), 1);

    let counters = host.get(1).unwrap();
    assert_eq!(counters.device.name, "Garden - Roses Counters");
    assert_eq!(counters.device.type_code, TypeCode::new(243, 30));

    let modes = host.get(2).unwrap();
    assert_eq!(modes.device.name, "Garden - Roses Watering Modes");
    assert_eq!(modes.device.type_code, TypeCode::new(244, 62));
    assert_eq!(modes.device.switch_type, Some(18));

    assert_eq!(host.get(3).unwrap().device.device_id, "TL02");
    assert_eq!(bridge.state().gateway_of("TL02"), Some("GW01"));
}

#[tokio::test]
async fn test_start_fills_slot_holes() {
    let mut host = MemoryHost::new();
    for unit in [1, 2, 4] {
        host.create_device(&foreign_device(unit)).unwrap();
    }
    let mut bridge = bridge(ScriptedApi::with_inventory(garden(vec![taplinker(
        "TL01", "Roses",
    )])));

    bridge.on_start(&mut host).await;

    assert_eq!(host.get(3).unwrap().device.kind, DeviceKind::Counters);
    assert_eq!(host.get(5).unwrap().device.kind, DeviceKind::Modes);
    assert_eq!(host.len(), 5);
}

#[tokio::test]
async fn test_restart_keeps_existing_slots() {
    let inventory = garden(vec![taplinker("TL01", "Roses")]);
    let mut host = MemoryHost::new();

    let mut first = bridge(ScriptedApi::with_inventory(inventory.clone()));
    first.on_start(&mut host).await;
    let before = host.devices();

    let mut second = bridge(ScriptedApi::with_inventory(inventory));
    second.on_start(&mut host).await;

    assert_eq!(host.devices(), before);
    assert_eq!(second.state().slot_of("TL01", DeviceKind::Counters), Some(1));
    assert_eq!(second.state().slot_of("TL01", DeviceKind::Modes), Some(2));
}

#[tokio::test]
async fn test_discovery_respects_cadence() {
    let mut host = MemoryHost::new();
    let mut bridge = bridge(ScriptedApi::with_inventory(garden(vec![taplinker(
        "TL01", "Roses",
    )])));

    bridge.on_start(&mut host).await;
    heartbeats(&mut bridge, &mut host, 19).await;
    assert_eq!(bridge.api().count("getAllDevices"), 1);

    heartbeats(&mut bridge, &mut host, 1).await;
    assert_eq!(bridge.api().count("getAllDevices"), 2);
}

#[tokio::test]
async fn test_status_only_on_status_ticks() {
    let mut host = MemoryHost::new();
    let mut bridge = bridge(ScriptedApi::with_inventory(garden(vec![taplinker(
        "TL01", "Roses",
    )])));

    bridge.on_start(&mut host).await;
    heartbeats(&mut bridge, &mut host, 1).await;
    assert_eq!(bridge.api().count("getWateringStatus"), 0);

    heartbeats(&mut bridge, &mut host, 1).await;
    assert_eq!(bridge.api().count("getWateringStatus"), 1);
}

#[tokio::test]
async fn test_refresh_pushes_flow_signal_and_battery() {
    let api = ScriptedApi::with_inventory(garden(vec![
        taplinker("TL01", "Roses"),
        taplinker("TL02", "Hedge"),
    ]));
    api.set_status("TL01", Ok(12345));

    let mut host = MemoryHost::new();
    let mut bridge = bridge(api);
    bridge.on_start(&mut host).await;
    heartbeats(&mut bridge, &mut host, 2).await;

    let flowing = host.get(1).unwrap().last_update.clone().unwrap();
    assert_eq!(flowing.n_value, 12);
    assert_eq!(flowing.s_value, "12.3");
    assert_eq!(flowing.signal_level, Some(82));
    assert_eq!(flowing.battery_level, Some(85));

    // no status reported
    let idle = host.get(3).unwrap().last_update.clone().unwrap();
    assert_eq!(idle.n_value, 0);
    assert_eq!(idle.s_value, "0.0");

    // selectors are never refreshed
    assert!(host.get(2).unwrap().last_update.is_none());
}

#[tokio::test]
async fn test_refresh_skips_failing_taplinker() {
    let api = ScriptedApi::with_inventory(garden(vec![
        taplinker("TL01", "Roses"),
        taplinker("TL02", "Hedge"),
    ]));
    api.set_status("TL01", Err("device offline".to_string()));
    api.set_status("TL02", Ok(2000));

    let mut host = MemoryHost::new();
    let mut bridge = bridge(api);
    bridge.on_start(&mut host).await;
    bridge.on_heartbeat(&mut host).await;
    let report = bridge.heartbeat(&mut host).await;

    let refresh = report.refresh.unwrap();
    assert_eq!(refresh.updated, 1);
    assert_eq!(refresh.failed, 1);
    assert!(host.get(1).unwrap().last_update.is_none());
    assert_eq!(host.get(3).unwrap().last_update.as_ref().unwrap().s_value, "2.0");
}

#[tokio::test]
async fn test_capacity_exhaustion_stops_creation() {
    let mut host = MemoryHost::new();
    for unit in 1..=254 {
        host.create_device(&foreign_device(unit)).unwrap();
    }
    let mut bridge = bridge(ScriptedApi::with_inventory(garden(vec![
        taplinker("TL01", "Roses"),
        taplinker("TL02", "Hedge"),
    ])));

    let result = bridge.start(&mut host).await;

    assert!(matches!(
        result,
        Err(BridgeError::CapacityExceeded { max: 255 })
    ));
    assert_eq!(host.len(), 255);
    assert_eq!(host.get(255).unwrap().device.device_id, "TL01");

    // the plugin callback logs the same failure and carries on
    bridge.on_heartbeat(&mut host).await;
}

#[tokio::test]
async fn test_command_unknown_level_sends_nothing() {
    let mut host = MemoryHost::new();
    let mut bridge = bridge(ScriptedApi::with_inventory(garden(vec![taplinker(
        "TL01", "Roses",
    )])));
    bridge.on_start(&mut host).await;
    let before = bridge.api().calls().len();

    let result = bridge.command(&host, 2, 25).await;

    assert!(matches!(result, Err(BridgeError::UnknownLevel(25))));
    assert_eq!(bridge.api().calls().len(), before);
}

#[tokio::test]
async fn test_command_before_discovery_is_rejected() {
    let mut host = MemoryHost::new();
    let inventory = garden(vec![taplinker("TL01", "Roses")]);

    // devices exist from a previous run, but this instance never discovered
    let mut previous = bridge(ScriptedApi::with_inventory(inventory.clone()));
    previous.on_start(&mut host).await;

    let fresh = bridge(ScriptedApi::with_inventory(inventory));
    let result = fresh.command(&host, 2, 10).await;

    assert!(matches!(result, Err(BridgeError::GatewayUnknown(id)) if id == "TL01"));
    assert!(fresh.api().calls().is_empty());
}

#[tokio::test]
async fn test_command_sends_mode_to_gateway() {
    let mut host = MemoryHost::new();
    let mut bridge = bridge(ScriptedApi::with_inventory(garden(vec![taplinker(
        "TL01", "Roses",
    )])));
    bridge.on_start(&mut host).await;

    bridge.on_command(&mut host, 2, "Set Level", 40).await;
    let mode = bridge.command(&host, 2, 20).await.unwrap();

    assert_eq!(mode, WateringMode::OddEven);
    let calls = bridge.api().calls();
    assert!(calls.contains(&"activateMonthMode GW01 TL01".to_string()));
    assert!(calls.contains(&"activateOddEvenMode GW01 TL01".to_string()));
}

#[tokio::test]
async fn test_command_reports_api_error() {
    let api = ScriptedApi::with_inventory(garden(vec![taplinker("TL01", "Roses")]));
    *api.command_error.lock().unwrap() = Some("taplinker offline".to_string());

    let mut host = MemoryHost::new();
    let mut bridge = bridge(api);
    bridge.on_start(&mut host).await;

    let result = bridge.command(&host, 2, 30).await;
    assert!(matches!(
        result,
        Err(BridgeError::Client(ClientError::Api(ref message))) if message == "taplinker offline"
    ));
}

#[tokio::test]
async fn test_command_unknown_unit() {
    let mut host = MemoryHost::new();
    let mut bridge = bridge(ScriptedApi::with_inventory(garden(vec![taplinker(
        "TL01", "Roses",
    )])));
    bridge.on_start(&mut host).await;

    let result = bridge.command(&host, 42, 10).await;
    assert!(matches!(result, Err(BridgeError::UnknownUnit(42))));
}

#[tokio::test]
async fn test_removed_device_is_recreated_in_freed_slot() {
    let mut host = MemoryHost::new();
    let mut bridge = bridge(ScriptedApi::with_inventory(garden(vec![
        taplinker("TL01", "Roses"),
        taplinker("TL02", "Hedge"),
    ])));
    bridge.on_start(&mut host).await;

    host.remove(1);
    heartbeats(&mut bridge, &mut host, 20).await;

    let recreated = host.get(1).unwrap();
    assert_eq!(recreated.device.device_id, "TL01");
    assert_eq!(recreated.device.kind, DeviceKind::Counters);
    assert_eq!(host.len(), 4);
}

#[tokio::test]
async fn test_shared_host_key_does_not_hide_occupied_units() {
    let mut host = MemoryHost::new();
    for unit in [1, 2] {
        host.create_device(&NewDevice {
            device_id: "dup".to_string(),
            ..foreign_device(unit)
        })
        .unwrap();
    }
    let mut bridge = bridge(ScriptedApi::with_inventory(garden(vec![taplinker(
        "TL01", "Roses",
    )])));

    let created = bridge.start(&mut host).await.unwrap();

    assert!(matches!(created, Discovery::Completed(ref devices) if devices.len() == 2));
    assert_eq!(host.len(), 4);
    assert_eq!(host.get(3).unwrap().device.kind, DeviceKind::Counters);
    assert_eq!(host.get(4).unwrap().device.kind, DeviceKind::Modes);
}

#[tokio::test]
async fn test_failed_discovery_is_retried_and_refresh_continues() {
    let api = ScriptedApi::with_inventory(garden(vec![taplinker("TL01", "Roses")]));
    api.set_status("TL01", Ok(3000));

    let mut host = MemoryHost::new();
    let mut bridge = bridge(api);
    bridge.on_start(&mut host).await;
    assert_eq!(host.len(), 2);

    *bridge.api().list_error.lock().unwrap() = Some("Too many requests".to_string());
    host.remove(2);
    heartbeats(&mut bridge, &mut host, 19).await;
    let report = bridge.heartbeat(&mut host).await;

    // discovery failed but the cached inventory still drives the refresh
    assert!(report.discovered);
    assert_eq!(report.refresh.unwrap().updated, 1);
    assert_eq!(host.get(1).unwrap().last_update.as_ref().unwrap().s_value, "3.0");
    assert!(host.get(2).is_none());
    assert_eq!(bridge.api().count("getAllDevices"), 2);

    *bridge.api().list_error.lock().unwrap() = None;
    heartbeats(&mut bridge, &mut host, 20).await;

    assert_eq!(bridge.api().count("getAllDevices"), 3);
    assert_eq!(host.get(2).unwrap().device.kind, DeviceKind::Modes);
}

#[tokio::test]
async fn test_off_cadence_reconcile_leaves_slots_untouched() {
    let api = ScriptedApi::with_inventory(garden(vec![taplinker("TL01", "Roses")]));
    let cadence = Cadence::default();
    let mut state = BridgeState::new();
    let mut host = MemoryHost::new();

    reconcile::reconcile(&mut state, &mut host, &api, &cadence, 0)
        .await
        .unwrap();
    let before = state.slots().clone();

    host.remove(1);
    for tick in 1..cadence.discovery_every() {
        let outcome = reconcile::reconcile(&mut state, &mut host, &api, &cadence, tick)
            .await
            .unwrap();
        assert_eq!(outcome, Discovery::Skipped);
    }

    assert_eq!(state.slots(), &before);
    assert_eq!(api.count("getAllDevices"), 1);
    assert!(host.get(1).is_none());
}
