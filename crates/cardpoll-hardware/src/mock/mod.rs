//! Mock device implementations for testing and development.
//!
//! This module provides a simulated SPI bus and simulated card readers that
//! can be controlled programmatically without requiring physical hardware.

pub mod bus;
pub mod reader;

// Re-export commonly used types
pub use bus::{BusTransaction, MockSpiBus, MockSpiBusHandle};
pub use reader::{MockCardReader, MockCardReaderHandle};
