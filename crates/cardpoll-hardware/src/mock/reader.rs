//! Mock MFRC522 card reader implementation for testing and development.
//!
//! This module provides a simulated reader whose field can be controlled
//! programmatically. It follows the ISO14443A presence rules the real chip
//! exposes: a card is reported as new while it is idle in the field, and a
//! halted card stays silent until it is taken away and presented again.

use super::bus::{BusTransaction, MockSpiBus};
use crate::{
    HardwareError, Result,
    traits::{CardReader, SpiBus},
    types::ReaderPins,
};
use cardpoll_core::CardUid;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Card currently in the reader field.
#[derive(Debug, Clone)]
struct FieldCard {
    uid: Vec<u8>,
    halted: bool,
}

#[derive(Debug, Default)]
struct ReaderState {
    card: Option<FieldCard>,
    pending_read_failures: u32,
    fail_init: bool,
    ignore_halt: bool,
    initialized: bool,
    // Set by a successful select. The real chip only enables Crypto1 after
    // authentication, which the mock folds into the read.
    crypto_active: bool,
}

/// Mock card reader for testing and development.
///
/// # Examples
///
/// ```
/// use cardpoll_hardware::mock::{MockCardReader, MockSpiBus};
/// use cardpoll_hardware::traits::{CardReader, SpiBus};
/// use cardpoll_hardware::types::{BusPins, ReaderPins};
///
/// #[tokio::main]
/// async fn main() -> cardpoll_hardware::Result<()> {
///     let (mut bus, _bus_handle) = MockSpiBus::new();
///     let (mut reader, handle) = MockCardReader::new(ReaderPins::reader1());
///
///     bus.begin(BusPins::default()).await?;
///     reader.init(&mut bus).await?;
///
///     handle.present_card(vec![0xDE, 0xAD, 0xBE, 0xEF])?;
///
///     assert!(reader.is_new_card_present(&mut bus).await);
///     let uid = reader.read_card_serial(&mut bus).await?;
///     assert_eq!(uid.to_hex(), "DEADBEEF");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockCardReader {
    pins: ReaderPins,
    state: Arc<Mutex<ReaderState>>,
}

impl MockCardReader {
    /// Create a new mock reader wired to `pins`.
    ///
    /// Returns a tuple of (MockCardReader, MockCardReaderHandle) where the
    /// handle can be used to simulate card presentations.
    pub fn new(pins: ReaderPins) -> (Self, MockCardReaderHandle) {
        let state = Arc::new(Mutex::new(ReaderState::default()));

        let reader = Self {
            pins,
            state: Arc::clone(&state),
        };

        (reader, MockCardReaderHandle { pins, state })
    }

    fn lock(&self) -> MutexGuard<'_, ReaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CardReader for MockCardReader {
    type Bus = MockSpiBus;

    fn pins(&self) -> ReaderPins {
        self.pins
    }

    async fn init(&mut self, bus: &mut MockSpiBus) -> Result<()> {
        if !bus.is_ready() {
            return Err(HardwareError::bus_not_ready(format!(
                "init of reader on ss={}",
                self.pins.ss
            )));
        }

        let mut state = self.lock();
        if state.fail_init {
            return Err(HardwareError::communication(format!(
                "No answer from reader on ss={}",
                self.pins.ss
            )));
        }

        bus.record(BusTransaction::ReaderInit { ss: self.pins.ss });
        state.initialized = true;
        Ok(())
    }

    async fn is_new_card_present(&mut self, bus: &mut MockSpiBus) -> bool {
        let state = self.lock();
        if !state.initialized || !bus.is_ready() {
            return false;
        }

        bus.record(BusTransaction::Request { ss: self.pins.ss });
        state.card.as_ref().is_some_and(|card| !card.halted)
    }

    async fn read_card_serial(&mut self, bus: &mut MockSpiBus) -> Result<CardUid> {
        let mut state = self.lock();
        bus.record(BusTransaction::Select { ss: self.pins.ss });

        if state.pending_read_failures > 0 {
            state.pending_read_failures -= 1;
            return Err(HardwareError::card_read("Anticollision timed out"));
        }

        let card = state
            .card
            .as_ref()
            .filter(|card| !card.halted)
            .ok_or_else(|| HardwareError::card_read("No card in field"))?;

        let uid = CardUid::new(card.uid.clone())?;
        state.crypto_active = true;
        Ok(uid)
    }

    async fn halt_card(&mut self, bus: &mut MockSpiBus) -> Result<()> {
        let mut state = self.lock();
        bus.record(BusTransaction::Halt { ss: self.pins.ss });

        let ignore_halt = state.ignore_halt;
        if let Some(card) = state.card.as_mut()
            && !ignore_halt
        {
            card.halted = true;
        }
        Ok(())
    }

    async fn stop_crypto(&mut self, bus: &mut MockSpiBus) -> Result<()> {
        let mut state = self.lock();
        bus.record(BusTransaction::StopCrypto { ss: self.pins.ss });
        state.crypto_active = false;
        Ok(())
    }
}

/// Handle for controlling a mock card reader.
///
/// The handle stays usable after the reader has been moved into a bank, so
/// tests and the console can keep presenting cards while the loop runs.
#[derive(Debug, Clone)]
pub struct MockCardReaderHandle {
    pins: ReaderPins,
    state: Arc<Mutex<ReaderState>>,
}

impl MockCardReaderHandle {
    /// Place a card in the reader field.
    ///
    /// Presenting a card again (even the same UID) puts it back into the
    /// idle state, as if it had left and re-entered the field.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID is empty.
    pub fn present_card(&self, uid: impl Into<Vec<u8>>) -> Result<()> {
        let uid = uid.into();
        if uid.is_empty() {
            return Err(HardwareError::invalid_data("Card UID cannot be empty"));
        }

        self.lock().card = Some(FieldCard { uid, halted: false });
        Ok(())
    }

    /// Take the card out of the field.
    pub fn remove_card(&self) {
        self.lock().card = None;
    }

    /// Make the next `count` serial reads fail as if the card slipped away.
    pub fn fail_next_reads(&self, count: u32) {
        self.lock().pending_read_failures += count;
    }

    /// Make `init()` fail.
    pub fn fail_init(&self) {
        self.lock().fail_init = true;
    }

    /// Simulate a card that does not honor HLTA and is reported again on
    /// every request.
    pub fn set_ignore_halt(&self, ignore: bool) {
        self.lock().ignore_halt = ignore;
    }

    /// Check if a card is in the field.
    pub fn is_card_presented(&self) -> bool {
        self.lock().card.is_some()
    }

    /// Check if the card in the field has been halted.
    pub fn is_card_halted(&self) -> bool {
        self.lock().card.as_ref().is_some_and(|card| card.halted)
    }

    /// Get the UID of the card in the field, if any.
    pub fn current_card_uid(&self) -> Option<Vec<u8>> {
        self.lock().card.as_ref().map(|card| card.uid.clone())
    }

    /// Check if the reader completed `init()`.
    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    /// Check if the reader is still in the authenticated state.
    ///
    /// The mock enters this state on every successful serial read, since it
    /// has no separate authentication step. Only `stop_crypto` leaves it.
    pub fn is_crypto_active(&self) -> bool {
        self.lock().crypto_active
    }

    /// Pins of the controlled reader.
    pub fn pins(&self) -> ReaderPins {
        self.pins
    }

    fn lock(&self) -> MutexGuard<'_, ReaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
