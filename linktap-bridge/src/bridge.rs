//! LinkTap bridge plugin driven by the host
//!
//! Holds the API client, the cadence and the single [`BridgeState`]. The
//! plain `start` / `heartbeat` / `command` methods return their outcome; the
//! [`HostPlugin`] impl wraps them for the host and logs every failure.

use async_trait::async_trait;
use linktap_client::{LinkTapApi, WateringMode};

use crate::command;
use crate::core::{BridgeResult, BridgeState, Config};
use crate::host::{DeviceHost, HostPlugin};
use crate::poller::{self, Cadence, HeartbeatReport};
use crate::reconcile::{self, Discovery};

pub struct LinkTapBridge<A> {
    api: A,
    cadence: Cadence,
    state: BridgeState,
    restore_previous_mode: bool,
}

impl<A: LinkTapApi> LinkTapBridge<A> {
    pub fn new(api: A, config: &Config) -> Self {
        Self {
            api,
            cadence: Cadence::from_heartbeat(config.heartbeat()),
            state: BridgeState::new(),
            restore_previous_mode: config.restore_previous_mode,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn cadence(&self) -> &Cadence {
        &self.cadence
    }

    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    /// Discovery at the current tick (tick 0 on start)
    pub async fn start(&mut self, host: &mut dyn DeviceHost) -> BridgeResult<Discovery> {
        let tick = self.state.ticks();
        reconcile::reconcile(&mut self.state, host, &self.api, &self.cadence, tick).await
    }

    pub async fn heartbeat(&mut self, host: &mut dyn DeviceHost) -> HeartbeatReport {
        poller::on_heartbeat(&mut self.state, host, &self.api, &self.cadence).await
    }

    pub async fn command(
        &self,
        host: &dyn DeviceHost,
        unit: u8,
        level: i32,
    ) -> BridgeResult<WateringMode> {
        command::dispatch(&self.state, host, &self.api, unit, level).await
    }
}

#[async_trait]
impl<A: LinkTapApi> HostPlugin for LinkTapBridge<A> {
    async fn on_start(&mut self, host: &mut dyn DeviceHost) {
        tracing::info!(
            heartbeat_secs = self.cadence.heartbeat().as_secs(),
            status_every = self.cadence.status_every(),
            discovery_every = self.cadence.discovery_every(),
            restore_previous_mode = self.restore_previous_mode,
            "LinkTap bridge starting"
        );

        match self.start(host).await {
            Ok(Discovery::Completed(created)) => {
                tracing::info!(
                    created = created.len(),
                    taplinkers = self.state.inventory().taplinker_count(),
                    "Initial discovery done"
                );
            }
            Ok(Discovery::Skipped) => {}
            Err(e) => tracing::error!("Initial discovery failed: {e}"),
        }
        self.state.dump();
    }

    async fn on_heartbeat(&mut self, host: &mut dyn DeviceHost) {
        let report = self.heartbeat(host).await;
        tracing::debug!(tick = report.tick, discovered = report.discovered, "Heartbeat");
        if report.discovered {
            self.state.dump();
        }
    }

    async fn on_command(&mut self, host: &mut dyn DeviceHost, unit: u8, command: &str, level: i32) {
        tracing::info!(unit, command, level, "Command received");
        if let Err(e) = self.command(host, unit, level).await {
            tracing::error!(unit, level, "Error sending command: {e}");
        }
    }

    async fn on_stop(&mut self) {
        tracing::info!(ticks = self.state.ticks(), "LinkTap bridge stopped");
    }
}
