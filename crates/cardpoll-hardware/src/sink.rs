//! Handoff of normalized events to the consumer.
//!
//! The poll loop never waits for the consumer. It offers each event once
//! through [`EventSink::offer`] and moves on; the returned
//! [`DispatchOutcome`] only feeds statistics and logs.

use cardpoll_core::RfidEvent;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Result of offering one event to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The event was queued.
    Delivered,

    /// The queue was full; the event was discarded.
    Dropped,

    /// The consumer is gone; the event was discarded.
    Disconnected,
}

impl DispatchOutcome {
    /// Returns `true` if the event reached the queue.
    pub fn is_delivered(self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Non-blocking producer side of the handoff channel.
///
/// Implementations must return in constant time and must not retry.
pub trait EventSink: Send {
    /// Offer one event without waiting for capacity.
    fn offer(&self, event: RfidEvent) -> DispatchOutcome;
}

impl EventSink for mpsc::Sender<RfidEvent> {
    fn offer(&self, event: RfidEvent) -> DispatchOutcome {
        match self.try_send(event) {
            Ok(()) => DispatchOutcome::Delivered,
            Err(TrySendError::Full(_)) => DispatchOutcome::Dropped,
            Err(TrySendError::Closed(_)) => DispatchOutcome::Disconnected,
        }
    }
}
