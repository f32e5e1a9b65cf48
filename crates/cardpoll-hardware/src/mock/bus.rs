//! Mock SPI bus implementation for testing and development.
//!
//! The mock bus keeps a journal of every transaction issued over it. Tests
//! use the journal to check initialization order and polling order without
//! a logic analyzer.

use crate::{
    HardwareError, Result,
    traits::SpiBus,
    types::BusPins,
};
use std::sync::{Arc, Mutex, PoisonError};

/// One transaction seen by the mock bus.
///
/// Reader-level transactions carry the chip-select pin of the reader that
/// issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusTransaction {
    /// Bus brought up with the given pins.
    Begin(BusPins),

    /// Reader reset and configured.
    ReaderInit { ss: u8 },

    /// REQA sent to detect a card.
    Request { ss: u8 },

    /// Anticollision/select run to read a UID.
    Select { ss: u8 },

    /// HLTA sent to the selected card.
    Halt { ss: u8 },

    /// Crypto1 state cleared.
    StopCrypto { ss: u8 },
}

impl BusTransaction {
    /// Chip-select pin of the reader that issued the transaction, if any.
    pub fn chip_select(&self) -> Option<u8> {
        match self {
            Self::Begin(_) => None,
            Self::ReaderInit { ss }
            | Self::Request { ss }
            | Self::Select { ss }
            | Self::Halt { ss }
            | Self::StopCrypto { ss } => Some(*ss),
        }
    }
}

#[derive(Debug, Default)]
struct BusState {
    journal: Vec<BusTransaction>,
    fail_begin: bool,
}

/// Mock SPI bus for testing and development.
///
/// # Examples
///
/// ```
/// use cardpoll_hardware::mock::{BusTransaction, MockSpiBus};
/// use cardpoll_hardware::traits::SpiBus;
/// use cardpoll_hardware::types::BusPins;
///
/// #[tokio::main]
/// async fn main() -> cardpoll_hardware::Result<()> {
///     let (mut bus, handle) = MockSpiBus::new();
///
///     bus.begin(BusPins::default()).await?;
///
///     assert!(bus.is_ready());
///     assert_eq!(handle.journal(), vec![BusTransaction::Begin(BusPins::default())]);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockSpiBus {
    state: Arc<Mutex<BusState>>,
    pins: Option<BusPins>,
}

impl MockSpiBus {
    /// Create a new mock bus.
    ///
    /// Returns a tuple of (MockSpiBus, MockSpiBusHandle) where the handle
    /// can inspect the journal after the bus has been moved into a bank.
    pub fn new() -> (Self, MockSpiBusHandle) {
        let state = Arc::new(Mutex::new(BusState::default()));

        let bus = Self {
            state: Arc::clone(&state),
            pins: None,
        };

        (bus, MockSpiBusHandle { state })
    }

    /// Pins the bus was started with, if started.
    pub fn pins(&self) -> Option<BusPins> {
        self.pins
    }

    pub(crate) fn record(&self, transaction: BusTransaction) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .journal
            .push(transaction);
    }
}

impl SpiBus for MockSpiBus {
    async fn begin(&mut self, pins: BusPins) -> Result<()> {
        let fail = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_begin;

        if fail {
            return Err(HardwareError::bus_init(format!(
                "Mock bus refused to start on {pins}"
            )));
        }

        self.pins = Some(pins);
        self.record(BusTransaction::Begin(pins));
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.pins.is_some()
    }
}

/// Handle for inspecting and steering a mock bus.
#[derive(Debug, Clone)]
pub struct MockSpiBusHandle {
    state: Arc<Mutex<BusState>>,
}

impl MockSpiBusHandle {
    /// Make the next `begin()` fail.
    pub fn fail_begin(&self) {
        self.lock().fail_begin = true;
    }

    /// Snapshot of every transaction so far.
    pub fn journal(&self) -> Vec<BusTransaction> {
        self.lock().journal.clone()
    }

    /// Number of transactions matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&BusTransaction) -> bool) -> usize {
        self.lock().journal.iter().filter(|t| predicate(t)).count()
    }

    /// Forget all recorded transactions.
    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
