//! Hardware device trait definitions.
//!
//! This module defines the contract between the poll loop and the hardware:
//! one [`SpiBus`] shared by several [`CardReader`]s. Readers never own the
//! bus. Every reader operation borrows it mutably for the length of one
//! transaction, so two transactions on the same bus cannot overlap.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{BusPins, ReaderPins};
use cardpoll_core::CardUid;

/// Shared SPI bus.
///
/// # Examples
///
/// ```
/// use cardpoll_hardware::traits::SpiBus;
/// use cardpoll_hardware::types::BusPins;
/// use cardpoll_hardware::Result;
///
/// async fn bring_up<B: SpiBus>(bus: &mut B) -> Result<()> {
///     bus.begin(BusPins::default()).await?;
///     assert!(bus.is_ready());
///     Ok(())
/// }
/// ```
pub trait SpiBus: Send {
    /// Configure the clock, data-in and data-out lines and enable the bus.
    ///
    /// # Errors
    ///
    /// Returns an error if the peripheral cannot be claimed. Callers treat
    /// this as fatal.
    async fn begin(&mut self, pins: BusPins) -> Result<()>;

    /// Returns `true` once [`begin`](SpiBus::begin) has succeeded.
    fn is_ready(&self) -> bool;
}

/// Contactless card reader (PCD) attached to a shared bus.
///
/// The method set mirrors the MFRC522 driver calls used by the poll loop:
/// REQA to detect a card, anticollision/select to read its UID, HLTA to put
/// it to sleep and finally leaving the authenticated (Crypto1) state.
///
/// # Examples
///
/// ```
/// use cardpoll_hardware::traits::CardReader;
/// use cardpoll_core::CardUid;
///
/// async fn read_once<R: CardReader>(reader: &mut R, bus: &mut R::Bus) -> Option<CardUid> {
///     if !reader.is_new_card_present(bus).await {
///         return None;
///     }
///     let uid = reader.read_card_serial(bus).await.ok()?;
///     reader.halt_card(bus).await.ok();
///     reader.stop_crypto(bus).await.ok();
///     Some(uid)
/// }
/// ```
pub trait CardReader: Send {
    /// Bus type this reader talks over.
    type Bus: SpiBus;

    /// Chip-select and reset lines this reader is wired to.
    fn pins(&self) -> ReaderPins;

    /// Reset and configure the reader. The bus must already be up.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader does not respond. Callers treat this
    /// as fatal.
    async fn init(&mut self, bus: &mut Self::Bus) -> Result<()>;

    /// Ask whether a card that has not been halted is in the field.
    ///
    /// Any bus failure during the request reads as "no card".
    async fn is_new_card_present(&mut self, bus: &mut Self::Bus) -> bool;

    /// Run anticollision and select, returning the card UID.
    ///
    /// # Errors
    ///
    /// Returns an error if the card left the field or the transaction was
    /// corrupted. These failures are transient.
    async fn read_card_serial(&mut self, bus: &mut Self::Bus) -> Result<CardUid>;

    /// Send HLTA to the selected card.
    async fn halt_card(&mut self, bus: &mut Self::Bus) -> Result<()>;

    /// Leave the authenticated state so the next card can be selected.
    async fn stop_crypto(&mut self, bus: &mut Self::Bus) -> Result<()>;
}
