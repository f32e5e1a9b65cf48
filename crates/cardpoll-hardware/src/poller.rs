//! Poll-and-dispatch loop.
//!
//! This module provides the [`PollLoop`], which owns the initialized bank and
//! walks the readers in identity order on a fixed cadence, turning every
//! detected card into an [`RfidEvent`] for the consumer.
//!
//! # Architecture
//!
//! A single loop owns the bus and both readers. Readers are never polled
//! concurrently; each transaction borrows the bus exclusively.
//!
//! ```text
//!               ┌──────────────── PollLoop ───────────────┐
//!               │                                          │
//! ┌──────────┐  │  reader 1 ─┐                             │   ┌──────────┐
//! │ SPI bus  │◄─┤            ├─► RfidEvent ──► try_send ───┼──►│ Consumer │
//! └──────────┘  │  reader 2 ─┘                             │   └──────────┘
//!               │  sleep(interval)                         │
//!               └──────────────────────────────────────────┘
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use cardpoll_hardware::bank::ReaderBank;
//! use cardpoll_hardware::mock::{MockCardReader, MockSpiBus};
//! use cardpoll_hardware::poller::{PollLoop, PollSchedule};
//! use cardpoll_hardware::types::{BusPins, ReaderPins};
//!
//! #[tokio::main]
//! async fn main() -> cardpoll_hardware::Result<()> {
//!     let (bus, _) = MockSpiBus::new();
//!     let (first, _) = MockCardReader::new(ReaderPins::reader1());
//!     let (second, _) = MockCardReader::new(ReaderPins::reader2());
//!
//!     let bank = ReaderBank::new(bus, BusPins::default(), first, second)?
//!         .initialize()
//!         .await?;
//!
//!     let (tx, mut rx) = tokio::sync::mpsc::channel(10);
//!     tokio::spawn(async move {
//!         while let Some(event) = rx.recv().await {
//!             println!("{event}");
//!         }
//!     });
//!
//!     let mut poller = PollLoop::new(bank, tx, PollSchedule::default());
//!     poller.run().await;
//!     Ok(())
//! }
//! ```

use crate::bank::ReadyBank;
use crate::sink::{DispatchOutcome, EventSink};
use crate::traits::{CardReader, SpiBus};
use cardpoll_core::constants::DEFAULT_POLL_INTERVAL_MS;
use cardpoll_core::{ReaderId, RfidEvent};
use std::time::Duration;
use tracing::{debug, trace};

/// Cadence of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    /// Delay after each full pass over the readers.
    pub interval: Duration,
}

impl PollSchedule {
    /// Create a schedule with the given delay between cycles.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Create a schedule from a delay in milliseconds.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self::from_millis(DEFAULT_POLL_INTERVAL_MS)
    }
}

/// Counters kept by the poll loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollStats {
    /// Completed passes over all readers.
    pub cycles: u64,

    /// Cards reported as new by a reader.
    pub cards_detected: u64,

    /// Detections whose serial read failed.
    pub read_failures: u64,

    /// Events accepted by the handoff channel.
    pub events_dispatched: u64,

    /// Events discarded because the channel was full or closed.
    pub events_dropped: u64,
}

/// Polls every reader of a [`ReadyBank`] and dispatches detected cards.
///
/// # Lifecycle
///
/// 1. Build and initialize a [`ReaderBank`](crate::bank::ReaderBank)
/// 2. Create the loop with a sink and a schedule
/// 3. Call `run()`; it only returns when its future is dropped
#[derive(Debug)]
pub struct PollLoop<B, R, S> {
    bank: ReadyBank<B, R>,
    sink: S,
    schedule: PollSchedule,
    stats: PollStats,
}

impl<B, R, S> PollLoop<B, R, S>
where
    B: SpiBus,
    R: CardReader<Bus = B>,
    S: EventSink,
{
    /// Create a loop over an initialized bank.
    pub fn new(bank: ReadyBank<B, R>, sink: S, schedule: PollSchedule) -> Self {
        Self {
            bank,
            sink,
            schedule,
            stats: PollStats::default(),
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    /// Cadence in use.
    pub fn schedule(&self) -> PollSchedule {
        self.schedule
    }

    /// Poll forever: one pass over the readers, then sleep.
    ///
    /// There is no stop condition; drop the future to stop polling.
    pub async fn run(&mut self) {
        debug!(interval = ?self.schedule.interval, "Poll loop started");

        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.schedule.interval).await;
        }
    }

    /// One pass over every reader in identity order, without the sleep.
    ///
    /// Returns the number of cards processed during the pass.
    pub async fn run_cycle(&mut self) -> usize {
        let mut processed = 0;

        for id in self.bank.reader_ids() {
            if self.poll_and_extract(id).await {
                processed += 1;
            }
        }

        self.stats.cycles += 1;
        processed
    }

    /// Detect, read, dispatch and release a card on one reader.
    ///
    /// Returns `true` if a card was read and processed. A failed read
    /// produces no event and leaves the card un-halted, so the next cycle
    /// sees it again.
    pub async fn poll_and_extract(&mut self, id: ReaderId) -> bool {
        let (bus, reader) = self.bank.reader_mut(id);
        let device = reader.device_mut();

        if !device.is_new_card_present(bus).await {
            return false;
        }
        self.stats.cards_detected += 1;

        let uid = match device.read_card_serial(bus).await {
            Ok(uid) => uid,
            Err(e) => {
                self.stats.read_failures += 1;
                trace!(reader = %id, error = %e, "Card read failed");
                return false;
            }
        };

        let event = RfidEvent::new(id, &uid);
        match self.sink.offer(event) {
            DispatchOutcome::Delivered => {
                self.stats.events_dispatched += 1;
                debug!(reader = %id, uid = %event.uid, "Card dispatched");
            }
            DispatchOutcome::Dropped => {
                self.stats.events_dropped += 1;
                debug!(reader = %id, uid = %event.uid, "Channel full, event dropped");
            }
            DispatchOutcome::Disconnected => {
                self.stats.events_dropped += 1;
                debug!(reader = %id, uid = %event.uid, "Consumer gone, event dropped");
            }
        }

        if let Err(e) = device.halt_card(bus).await {
            trace!(reader = %id, error = %e, "Halt failed");
        }
        if let Err(e) = device.stop_crypto(bus).await {
            trace!(reader = %id, error = %e, "Stop crypto failed");
        }

        true
    }
}
