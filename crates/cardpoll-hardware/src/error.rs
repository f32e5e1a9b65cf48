//! Error types for hardware operations.
//!
//! This module defines error types specific to the shared bus and the card
//! readers attached to it. Initialization errors are fatal and abort startup;
//! card read errors are transient and are absorbed by the poll loop.

use cardpoll_core::ReaderId;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// The shared bus could not be brought up.
    #[error("Bus initialization failed: {message}")]
    BusInit { message: String },

    /// A reader did not come up after bus bring-up.
    #[error("Reader {reader} initialization failed: {message}")]
    ReaderInit { reader: ReaderId, message: String },

    /// A device was used before the bus was ready.
    #[error("Bus not ready: {operation}")]
    BusNotReady { operation: String },

    /// Bus transaction failed.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Card read error.
    #[error("Card read error: {message}")]
    CardReadError { message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Error from the core domain types.
    #[error(transparent)]
    Core(#[from] cardpoll_core::Error),
}

impl HardwareError {
    /// Create a new bus initialization error.
    pub fn bus_init(message: impl Into<String>) -> Self {
        Self::BusInit {
            message: message.into(),
        }
    }

    /// Create a new reader initialization error.
    pub fn reader_init(reader: ReaderId, message: impl Into<String>) -> Self {
        Self::ReaderInit {
            reader,
            message: message.into(),
        }
    }

    /// Create a new bus not ready error.
    pub fn bus_not_ready(operation: impl Into<String>) -> Self {
        Self::BusNotReady {
            operation: operation.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new card read error.
    pub fn card_read(message: impl Into<String>) -> Self {
        Self::CardReadError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Returns `true` for errors that must abort startup.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::BusInit { .. } | Self::ReaderInit { .. } | Self::ConfigurationError { .. }
        )
    }
}
