//! Pin assignments for the shared SPI bus and its readers.
//!
//! Pins are plain GPIO numbers. They are fixed at startup and never change
//! while the process runs.

use crate::{HardwareError, Result};
use cardpoll_core::constants::{
    DEFAULT_READER1_RST, DEFAULT_READER1_SS, DEFAULT_READER2_RST, DEFAULT_READER2_SS,
    DEFAULT_SPI_MISO, DEFAULT_SPI_MOSI, DEFAULT_SPI_SCK,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three signal roles of the shared SPI bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusPins {
    /// Clock.
    pub sck: u8,

    /// Data in (MISO).
    pub miso: u8,

    /// Data out (MOSI).
    pub mosi: u8,
}

impl Default for BusPins {
    fn default() -> Self {
        Self {
            sck: DEFAULT_SPI_SCK,
            miso: DEFAULT_SPI_MISO,
            mosi: DEFAULT_SPI_MOSI,
        }
    }
}

impl fmt::Display for BusPins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "sck={} miso={} mosi={}", self.sck, self.miso, self.mosi)
    }
}

/// Chip-select and reset lines of one reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReaderPins {
    /// Chip select (SS).
    pub ss: u8,

    /// Reset (RST).
    pub rst: u8,
}

impl ReaderPins {
    /// Create a new pin pair.
    pub fn new(ss: u8, rst: u8) -> Self {
        Self { ss, rst }
    }

    /// Default pins of reader 1.
    pub fn reader1() -> Self {
        Self::new(DEFAULT_READER1_SS, DEFAULT_READER1_RST)
    }

    /// Default pins of reader 2.
    pub fn reader2() -> Self {
        Self::new(DEFAULT_READER2_SS, DEFAULT_READER2_RST)
    }
}

impl fmt::Display for ReaderPins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ss={} rst={}", self.ss, self.rst)
    }
}

/// Check that no GPIO is claimed twice by the bus and the readers.
///
/// Two readers may not share a chip-select line, and no reader line may
/// double as a bus signal.
///
/// # Errors
///
/// Returns [`HardwareError::ConfigurationError`] naming the first clash.
pub fn validate_pin_map(bus: &BusPins, readers: &[ReaderPins]) -> Result<()> {
    let mut claimed: Vec<(u8, String)> = vec![
        (bus.sck, "bus sck".to_string()),
        (bus.miso, "bus miso".to_string()),
        (bus.mosi, "bus mosi".to_string()),
    ];

    for (i, pins) in readers.iter().enumerate() {
        let n = i + 1;
        claimed.push((pins.ss, format!("reader {n} ss")));
        claimed.push((pins.rst, format!("reader {n} rst")));
    }

    for (i, (pin, role)) in claimed.iter().enumerate() {
        if let Some((_, other)) = claimed[..i].iter().find(|(p, _)| p == pin) {
            return Err(HardwareError::configuration(format!(
                "GPIO {pin} assigned to both {other} and {role}"
            )));
        }
    }

    Ok(())
}
