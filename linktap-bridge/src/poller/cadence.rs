use std::time::Duration;

/// Shortest period LinkTap accepts between status calls
pub const STATUS_INTERVAL: Duration = Duration::from_secs(30);
/// Shortest period LinkTap accepts between `getAllDevices` calls
pub const DISCOVERY_INTERVAL: Duration = Duration::from_secs(300);

/// Heartbeat multiples at which the rate-limited calls may run
///
/// Both periods are rounded up to whole heartbeats, and discovery to whole
/// status periods, so every discovery tick is also a status tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    heartbeat: Duration,
    status_every: u64,
    discovery_every: u64,
}

impl Cadence {
    pub fn from_heartbeat(heartbeat: Duration) -> Self {
        let beat = heartbeat.as_secs().max(1);
        let status_every = STATUS_INTERVAL.as_secs().div_ceil(beat).max(1);
        let discovery_every = DISCOVERY_INTERVAL
            .as_secs()
            .div_ceil(beat)
            .div_ceil(status_every)
            * status_every;

        Self {
            heartbeat: Duration::from_secs(beat),
            status_every,
            discovery_every,
        }
    }

    pub fn heartbeat(&self) -> Duration {
        self.heartbeat
    }

    pub fn status_every(&self) -> u64 {
        self.status_every
    }

    pub fn discovery_every(&self) -> u64 {
        self.discovery_every
    }

    pub fn is_status_tick(&self, tick: u64) -> bool {
        tick % self.status_every == 0
    }

    /// Tick 0 (start) always qualifies
    pub fn is_discovery_tick(&self, tick: u64) -> bool {
        tick % self.discovery_every == 0
    }
}

impl Default for Cadence {
    fn default() -> Self {
        Self::from_heartbeat(Duration::from_secs(15))
    }
}
