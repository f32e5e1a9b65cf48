//! Reader bank and bus bring-up.
//!
//! A [`ReaderBank`] owns the shared bus and both readers before anything has
//! been initialized. [`ReaderBank::initialize`] consumes it, brings the bus up
//! and then initializes reader 1 and reader 2 in that order, returning a
//! [`ReadyBank`]. Only a `ReadyBank` can be handed to the poll loop, so the
//! loop can never run against hardware that was not brought up.
//!
//! ```text
//!  ReaderBank ──initialize()──► bus.begin(pins)
//!                               reader 1 init
//!                               reader 2 init ──► ReadyBank ──► PollLoop
//! ```

use crate::traits::{CardReader, SpiBus};
use crate::types::{BusPins, ReaderPins, validate_pin_map};
use crate::{HardwareError, Result};
use cardpoll_core::ReaderId;
use cardpoll_core::constants::READER_COUNT;
use tracing::{debug, info};

/// One physical reader and its fixed identity on the bus.
#[derive(Debug)]
pub struct ReaderHandle<R> {
    id: ReaderId,
    device: R,
}

impl<R: CardReader> ReaderHandle<R> {
    /// Bind a device to its identity.
    pub fn new(id: ReaderId, device: R) -> Self {
        Self { id, device }
    }

    /// Reader identity.
    pub fn id(&self) -> ReaderId {
        self.id
    }

    /// Pins the device is wired to.
    pub fn pins(&self) -> ReaderPins {
        self.device.pins()
    }

    /// Borrow the device.
    pub fn device(&self) -> &R {
        &self.device
    }

    pub(crate) fn device_mut(&mut self) -> &mut R {
        &mut self.device
    }
}

/// Bus and readers before bring-up.
#[derive(Debug)]
pub struct ReaderBank<B, R> {
    bus: B,
    bus_pins: BusPins,
    readers: [ReaderHandle<R>; READER_COUNT],
}

impl<B, R> ReaderBank<B, R>
where
    B: SpiBus,
    R: CardReader<Bus = B>,
{
    /// Assemble the bank. `first` becomes reader 1 and `second` reader 2.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::ConfigurationError`] if two lines share a GPIO.
    pub fn new(bus: B, bus_pins: BusPins, first: R, second: R) -> Result<Self> {
        validate_pin_map(&bus_pins, &[first.pins(), second.pins()])?;

        Ok(Self {
            bus,
            bus_pins,
            readers: [
                ReaderHandle::new(ReaderId::FIRST, first),
                ReaderHandle::new(ReaderId::SECOND, second),
            ],
        })
    }

    /// Bring the bus up, then each reader in identity order.
    ///
    /// Consumes the bank, so bring-up runs at most once.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::BusInit`] if the bus fails, without touching
    /// any reader, or [`HardwareError::ReaderInit`] naming the first reader
    /// that fails. Both are fatal.
    pub async fn initialize(self) -> Result<ReadyBank<B, R>> {
        let Self {
            mut bus,
            bus_pins,
            mut readers,
        } = self;

        bus.begin(bus_pins).await.map_err(|e| match e {
            e @ HardwareError::BusInit { .. } => e,
            other => HardwareError::bus_init(other.to_string()),
        })?;
        info!(pins = %bus_pins, "SPI bus ready");

        for reader in readers.iter_mut() {
            let id = reader.id();
            let pins = reader.pins();
            reader
                .device_mut()
                .init(&mut bus)
                .await
                .map_err(|e| HardwareError::reader_init(id, e.to_string()))?;
            info!(reader = %id, pins = %pins, "Reader initialized");
        }

        debug!("Bus bring-up complete");
        Ok(ReadyBank { bus, readers })
    }
}

/// Bus and readers after a successful bring-up.
///
/// Only obtainable from [`ReaderBank::initialize`].
#[derive(Debug)]
pub struct ReadyBank<B, R> {
    bus: B,
    readers: [ReaderHandle<R>; READER_COUNT],
}

impl<B, R> ReadyBank<B, R>
where
    B: SpiBus,
    R: CardReader<Bus = B>,
{
    /// Reader identities in polling order.
    pub fn reader_ids(&self) -> [ReaderId; READER_COUNT] {
        std::array::from_fn(|i| self.readers[i].id())
    }

    /// Borrow the shared bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Split out the bus and one reader for a single transaction.
    pub(crate) fn reader_mut(&mut self, id: ReaderId) -> (&mut B, &mut ReaderHandle<R>) {
        (&mut self.bus, &mut self.readers[id.index()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{BusTransaction, MockCardReader, MockSpiBus};

    fn mock_bank() -> (
        ReaderBank<MockSpiBus, MockCardReader>,
        crate::mock::MockSpiBusHandle,
        crate::mock::MockCardReaderHandle,
        crate::mock::MockCardReaderHandle,
    ) {
        let (bus, bus_handle) = MockSpiBus::new();
        let (first, first_handle) = MockCardReader::new(ReaderPins::reader1());
        let (second, second_handle) = MockCardReader::new(ReaderPins::reader2());

        let bank = ReaderBank::new(bus, BusPins::default(), first, second).unwrap();
        (bank, bus_handle, first_handle, second_handle)
    }

    #[tokio::test]
    async fn test_initialize_order() {
        let (bank, bus_handle, first, second) = mock_bank();

        let ready = bank.initialize().await.unwrap();

        assert_eq!(
            bus_handle.journal(),
            vec![
                BusTransaction::Begin(BusPins::default()),
                BusTransaction::ReaderInit { ss: 5 },
                BusTransaction::ReaderInit { ss: 27 },
            ]
        );
        assert!(first.is_initialized());
        assert!(second.is_initialized());
        assert!(ready.bus().is_ready());
        assert_eq!(ready.reader_ids(), [ReaderId::FIRST, ReaderId::SECOND]);
    }

    #[tokio::test]
    async fn test_bus_failure_skips_readers() {
        let (bank, bus_handle, first, second) = mock_bank();
        bus_handle.fail_begin();

        let result = bank.initialize().await;

        assert!(matches!(result, Err(HardwareError::BusInit { .. })));
        assert!(!first.is_initialized());
        assert!(!second.is_initialized());
        assert!(bus_handle.journal().is_empty());
    }

    #[tokio::test]
    async fn test_reader_failure_names_reader() {
        let (bank, bus_handle, first, second) = mock_bank();
        second.fail_init();

        let error = bank.initialize().await.unwrap_err();

        assert!(matches!(
            error,
            HardwareError::ReaderInit { reader, .. } if reader == ReaderId::SECOND
        ));
        assert!(error.is_fatal());
        assert!(first.is_initialized());
        assert!(!second.is_initialized());
        assert_eq!(
            bus_handle.count(|t| *t == BusTransaction::ReaderInit { ss: 27 }),
            0
        );
    }

    #[test]
    fn test_new_rejects_pin_clash() {
        let (bus, _) = MockSpiBus::new();
        let (first, _) = MockCardReader::new(ReaderPins::new(5, 26));
        let (second, _) = MockCardReader::new(ReaderPins::new(5, 25));

        let result = ReaderBank::new(bus, BusPins::default(), first, second);
        assert!(matches!(
            result,
            Err(HardwareError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_reader_handle_accessors() {
        let (device, _) = MockCardReader::new(ReaderPins::reader2());
        let handle = ReaderHandle::new(ReaderId::SECOND, device);

        assert_eq!(handle.id(), ReaderId::SECOND);
        assert_eq!(handle.pins(), ReaderPins::reader2());
        assert_eq!(handle.device().pins(), ReaderPins::reader2());
    }
}
