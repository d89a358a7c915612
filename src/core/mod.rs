//! Core types and errors for the pothole link
//!
//! This module contains the fundamental building blocks used throughout the library.

pub mod config;
pub mod error;
pub mod serde;
pub mod types;

pub use self::config::{LinkConfig, SpiConfig, TransportKind};
pub use self::error::{Error, MalformedFrame, Result};
pub use self::types::{ClockState, PotholeReport, TimeSyncFrame};

/// Default spidev device wired to the controller
pub const DEFAULT_SPI_DEVICE: &str = "/dev/spidev0.0";

/// Default SPI clock (1 MHz)
pub const DEFAULT_SPI_SPEED_HZ: u32 = 1_000_000;

/// Default bounded wait per listener poll
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
