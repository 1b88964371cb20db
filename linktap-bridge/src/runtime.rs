//! Host loop for the stand-alone binary
//!
//! Plays the host's part: fires the heartbeat, forwards user commands and
//! calls `on_stop` on shutdown. Events are handled one at a time; a slow
//! remote call delays the next event instead of overlapping with it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::core::{BridgeError, BridgeResult};
use crate::host::{DeviceHost, HostPlugin};

/// User action on a device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCommand {
    pub unit: u8,
    pub command: String,
    pub level: i32,
}

impl UserCommand {
    /// Parse `"<unit> <level>"`
    pub fn parse(line: &str) -> BridgeResult<Self> {
        let mut parts = line.split_whitespace();
        let (Some(unit), Some(level), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(BridgeError::host(format!(
                "Expected '<unit> <level>', got '{}'",
                line.trim()
            )));
        };

        let unit = unit
            .parse()
            .map_err(|_| BridgeError::host(format!("Invalid unit '{unit}'")))?;
        let level = level
            .parse()
            .map_err(|_| BridgeError::host(format!("Invalid level '{level}'")))?;

        Ok(Self {
            unit,
            command: "Set Level".to_string(),
            level,
        })
    }
}

/// Drive `plugin` until `shutdown` fires
pub async fn run<P, H>(
    plugin: &mut P,
    host: &mut H,
    heartbeat: Duration,
    mut commands: mpsc::Receiver<UserCommand>,
    shutdown: CancellationToken,
) where
    P: HostPlugin + ?Sized,
    H: DeviceHost,
{
    plugin.on_start(&mut *host).await;

    let mut ticker = tokio::time::interval(heartbeat);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await; // skip immediate tick

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                tracing::info!("Shutdown requested");
                break;
            }

            _ = ticker.tick() => {
                plugin.on_heartbeat(&mut *host).await;
            }

            Some(cmd) = commands.recv() => {
                plugin.on_command(&mut *host, cmd.unit, &cmd.command, cmd.level).await;
            }
        }
    }

    plugin.on_stop().await;
}
