use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settle time of the shift registers after a column has been latched.
pub const DEFAULT_COLUMN_DELAY_US: u64 = 2_000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// SPI bus number (`/dev/spidev<bus>.<device>`)
    pub bus: u8,
    pub device: u8,
    /// Optional clock limit applied after the bus is opened; zero is ignored
    pub max_speed_hz: Option<u32>,
    /// 0 = quiet, 1 = print every buffered frame, 2 = also print every packet
    pub debug: u8,
    /// Reverse the row order of incoming frames
    pub mirror: bool,
    pub column_delay_us: u64,
    /// Draw repetitions per frame; commands pick their own default when unset
    pub iterations: Option<u32>,
}

impl Config {
    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }

    pub fn column_delay(&self) -> Duration {
        Duration::from_micros(self.column_delay_us)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bus: 0,
            device: 0,
            max_speed_hz: None,
            debug: 0,
            mirror: true,
            column_delay_us: DEFAULT_COLUMN_DELAY_US,
            iterations: None,
        }
    }
}
