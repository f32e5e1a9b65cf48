//! Core constants for the dual-reader polling core.
//!
//! This module collects the fixed values shared by the hardware layer and
//! the binary: reader identities, UID limits, the size of the normalized UID
//! buffer, the default poll cadence and the default pin assignments of the
//! shared SPI bus.
//!
//! # Usage
//!
//! ```
//! use cardpoll_core::constants::*;
//!
//! // Every UID the driver can report fits the event buffer.
//! assert_eq!(UID_TEXT_CAPACITY, MAX_UID_LENGTH * 2 + 1);
//!
//! // Reader identity validation
//! fn is_valid_reader(id: u8) -> bool {
//!     (MIN_READER_ID..=MAX_READER_ID).contains(&id)
//! }
//! assert!(is_valid_reader(2));
//! assert!(!is_valid_reader(3));
//! ```
//!
//! # Pin Assignments
//!
//! The defaults target the VSPI peripheral of an ESP32 with two MFRC522
//! modules on the same bus:
//!
//! | Signal | Bus | Reader 1 | Reader 2 |
//! |--------|-----|----------|----------|
//! | SCK    | 18  |          |          |
//! | MISO   | 19  |          |          |
//! | MOSI   | 23  |          |          |
//! | SS     |     | 5        | 27       |
//! | RST    |     | 26       | 25       |
//!
//! Deployments override them through the configuration file.

// ============================================================================
// Reader Identity
// ============================================================================

/// Lowest valid reader identity.
pub const MIN_READER_ID: u8 = 1;

/// Highest valid reader identity.
pub const MAX_READER_ID: u8 = 2;

/// Number of readers sharing the bus.
pub const READER_COUNT: usize = (MAX_READER_ID - MIN_READER_ID + 1) as usize;

// ============================================================================
// Card Identifiers
// ============================================================================

/// Minimum UID length in bytes accepted from a driver.
pub const MIN_UID_LENGTH: usize = 1;

/// Maximum UID length in bytes reported by ISO14443A drivers.
///
/// Single, double and triple size UIDs are 4, 7 and 10 bytes.
pub const MAX_UID_LENGTH: usize = 10;

/// Capacity of the normalized UID buffer carried by an event.
///
/// Two hex characters per byte of the longest UID plus the NUL terminator.
pub const UID_TEXT_CAPACITY: usize = MAX_UID_LENGTH * 2 + 1;

// ============================================================================
// Polling
// ============================================================================

/// Default delay between poll cycles, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 40;

/// Default capacity of the handoff channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10;

// ============================================================================
// Default Pin Assignments
// ============================================================================

/// SPI clock pin.
pub const DEFAULT_SPI_SCK: u8 = 18;

/// SPI data-in pin (MISO).
pub const DEFAULT_SPI_MISO: u8 = 19;

/// SPI data-out pin (MOSI).
pub const DEFAULT_SPI_MOSI: u8 = 23;

/// Chip-select pin of reader 1.
pub const DEFAULT_READER1_SS: u8 = 5;

/// Reset pin of reader 1.
pub const DEFAULT_READER1_RST: u8 = 26;

/// Chip-select pin of reader 2.
pub const DEFAULT_READER2_SS: u8 = 27;

/// Reset pin of reader 2.
pub const DEFAULT_READER2_RST: u8 = 25;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_count() {
        assert_eq!(READER_COUNT, 2);
    }

    #[test]
    fn test_uid_text_capacity_fits_longest_uid() {
        assert_eq!(UID_TEXT_CAPACITY, 21);
        assert!(UID_TEXT_CAPACITY > MAX_UID_LENGTH * 2);
    }

    #[test]
    fn test_default_pins_are_distinct() {
        let pins = [
            DEFAULT_SPI_SCK,
            DEFAULT_SPI_MISO,
            DEFAULT_SPI_MOSI,
            DEFAULT_READER1_SS,
            DEFAULT_READER1_RST,
            DEFAULT_READER2_SS,
            DEFAULT_READER2_RST,
        ];

        for (i, a) in pins.iter().enumerate() {
            for b in &pins[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
