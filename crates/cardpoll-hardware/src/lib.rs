//! Hardware layer of the dual-reader card poller.
//!
//! This crate drives two contactless card readers that share one SPI bus.
//! It brings the bus and the readers up in a fixed order, polls the readers
//! one after the other on a fixed cadence, and hands every card it reads to a
//! consumer as a normalized [`RfidEvent`](cardpoll_core::RfidEvent) without
//! ever waiting on that consumer.
//!
//! # Design Philosophy
//!
//! - **Async-first**: device operations are native `async fn` in traits
//!   (Rust 1.90 + Edition 2024 RPITIT).
//! - **Single owner**: the bus and the readers are owned by one
//!   [`ReadyBank`], which is moved into one [`PollLoop`]. Each reader call
//!   borrows the bus mutably, so overlapping transactions do not compile.
//! - **Typestate bring-up**: a [`ReaderBank`] has to be initialized into a
//!   `ReadyBank` before it can be polled.
//! - **Fire-and-forget dispatch**: events are offered through
//!   [`EventSink::offer`]; a full channel drops the event and polling goes on.
//!
//! # Bring-up and Polling
//!
//! ```no_run
//! use cardpoll_hardware::{PollLoop, PollSchedule, ReaderBank};
//! use cardpoll_hardware::mock::{MockCardReader, MockSpiBus};
//! use cardpoll_hardware::types::{BusPins, ReaderPins};
//!
//! #[tokio::main]
//! async fn main() -> cardpoll_hardware::Result<()> {
//!     let (bus, _) = MockSpiBus::new();
//!     let (first, first_handle) = MockCardReader::new(ReaderPins::reader1());
//!     let (second, _) = MockCardReader::new(ReaderPins::reader2());
//!
//!     let bank = ReaderBank::new(bus, BusPins::default(), first, second)?
//!         .initialize()
//!         .await?;
//!
//!     let (tx, mut rx) = tokio::sync::mpsc::channel(10);
//!     let mut poller = PollLoop::new(bank, tx, PollSchedule::default());
//!
//!     first_handle.present_card(vec![0xDE, 0xAD, 0xBE, 0xEF])?;
//!     poller.run_cycle().await;
//!
//!     let event = rx.recv().await.unwrap();
//!     assert_eq!(event.uid_str(), "DEADBEEF");
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! Bring-up returns [`HardwareError`] and callers abort on it. Once polling
//! has started, read failures and dispatch failures are absorbed by the loop
//! and only show up in [`PollStats`] and `trace`/`debug` logs.

pub mod bank;
pub mod devices;
pub mod error;
pub mod mock;
pub mod poller;
pub mod sink;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use bank::{ReaderBank, ReaderHandle, ReadyBank};
pub use error::{HardwareError, Result};
pub use poller::{PollLoop, PollSchedule, PollStats};
pub use sink::{DispatchOutcome, EventSink};
pub use traits::{CardReader, SpiBus};
pub use types::{BusPins, ReaderPins};
