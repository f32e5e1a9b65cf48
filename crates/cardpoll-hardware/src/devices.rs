//! Enum wrappers for hardware device dispatch.
//!
//! Native `async fn` in traits (RPITIT - Rust Edition 2024) are not
//! object-safe, so `Box<dyn CardReader>` is not available. These enums give
//! the binary one concrete bus type and one concrete reader type to build a
//! [`ReaderBank`](crate::bank::ReaderBank) from, whichever backend is chosen
//! at startup.
//!
//! # Examples
//!
//! ```
//! use cardpoll_hardware::devices::{AnyCardReader, AnySpiBus};
//! use cardpoll_hardware::mock::{MockCardReader, MockSpiBus};
//! use cardpoll_hardware::types::ReaderPins;
//!
//! let (bus, _bus_handle) = MockSpiBus::new();
//! let (reader, _reader_handle) = MockCardReader::new(ReaderPins::reader1());
//!
//! let bus = AnySpiBus::Mock(bus);
//! let reader = AnyCardReader::Mock(reader);
//! ```

use crate::mock::{MockCardReader, MockSpiBus};
use crate::traits::{CardReader, SpiBus};
use crate::types::{BusPins, ReaderPins};
use crate::{HardwareError, Result};
use cardpoll_core::CardUid;

/// Enum wrapper for SPI bus dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnySpiBus {
    /// Simulated bus for development and testing.
    Mock(MockSpiBus),
}

impl SpiBus for AnySpiBus {
    async fn begin(&mut self, pins: BusPins) -> Result<()> {
        match self {
            Self::Mock(bus) => bus.begin(pins).await,
        }
    }

    fn is_ready(&self) -> bool {
        match self {
            Self::Mock(bus) => bus.is_ready(),
        }
    }
}

/// Enum wrapper for card reader dispatch.
///
/// A reader variant only talks over the matching bus variant; pairing a
/// reader with a different backend's bus is a wiring error reported as
/// [`HardwareError::ConfigurationError`].
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyCardReader {
    /// Simulated reader for development and testing.
    Mock(MockCardReader),
}

impl AnyCardReader {
    fn mock_bus(bus: &mut AnySpiBus) -> Result<&mut MockSpiBus> {
        match bus {
            AnySpiBus::Mock(bus) => Ok(bus),
            #[allow(unreachable_patterns)]
            _ => Err(HardwareError::configuration(
                "Mock reader attached to a non-mock bus",
            )),
        }
    }
}

impl CardReader for AnyCardReader {
    type Bus = AnySpiBus;

    fn pins(&self) -> ReaderPins {
        match self {
            Self::Mock(device) => device.pins(),
        }
    }

    async fn init(&mut self, bus: &mut AnySpiBus) -> Result<()> {
        match self {
            Self::Mock(device) => device.init(Self::mock_bus(bus)?).await,
        }
    }

    async fn is_new_card_present(&mut self, bus: &mut AnySpiBus) -> bool {
        match self {
            Self::Mock(device) => match Self::mock_bus(bus) {
                Ok(bus) => device.is_new_card_present(bus).await,
                Err(_) => false,
            },
        }
    }

    async fn read_card_serial(&mut self, bus: &mut AnySpiBus) -> Result<CardUid> {
        match self {
            Self::Mock(device) => device.read_card_serial(Self::mock_bus(bus)?).await,
        }
    }

    async fn halt_card(&mut self, bus: &mut AnySpiBus) -> Result<()> {
        match self {
            Self::Mock(device) => device.halt_card(Self::mock_bus(bus)?).await,
        }
    }

    async fn stop_crypto(&mut self, bus: &mut AnySpiBus) -> Result<()> {
        match self {
            Self::Mock(device) => device.stop_crypto(Self::mock_bus(bus)?).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_any_devices_mock() {
        let (bus, bus_handle) = MockSpiBus::new();
        let (reader, reader_handle) = MockCardReader::new(ReaderPins::reader2());

        let mut bus = AnySpiBus::Mock(bus);
        let mut reader = AnyCardReader::Mock(reader);

        bus.begin(BusPins::default()).await.unwrap();
        reader.init(&mut bus).await.unwrap();
        assert_eq!(reader.pins(), ReaderPins::reader2());

        reader_handle.present_card(vec![0xCA, 0xFE, 0xBA, 0xBE]).unwrap();
        assert!(reader.is_new_card_present(&mut bus).await);

        let uid = reader.read_card_serial(&mut bus).await.unwrap();
        assert_eq!(uid.to_hex(), "CAFEBABE");

        reader.halt_card(&mut bus).await.unwrap();
        reader.stop_crypto(&mut bus).await.unwrap();
        assert!(reader_handle.is_card_halted());
        assert_eq!(bus_handle.journal().len(), 6);
    }
}
