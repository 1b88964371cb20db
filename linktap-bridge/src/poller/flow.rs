//! Flow conversion from the raw `vel` reading
//!
//! LinkTap reports flow as an integer scaled by 1000. The host counter
//! shows it rounded to one decimal.

use linktap_client::WateringStatus;
use rust_decimal::prelude::*;

const RAW_SCALE: u32 = 3;
const DISPLAY_PLACES: u32 = 1;

/// Flow value as pushed to the host counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowReading(Decimal);

impl FlowReading {
    pub const ZERO: FlowReading = FlowReading(Decimal::ZERO);

    pub fn from_raw(raw: i64) -> Self {
        Self(
            Decimal::new(raw, RAW_SCALE)
                .round_dp_with_strategy(DISPLAY_PLACES, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// No status (nothing watering) reads as zero flow
    pub fn from_status(status: Option<&WateringStatus>) -> Self {
        status.map_or(Self::ZERO, |s| Self::from_raw(s.vel))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Integer value of the counter
    pub fn n_value(&self) -> i64 {
        self.0
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .unwrap_or_default()
    }

    /// Decimal string of the counter
    pub fn s_value(&self) -> String {
        format!("{:.1}", self.0)
    }
}
