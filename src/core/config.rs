use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::error::{Error, Result};

/// Which driver carries the link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportKind {
    /// Linux spidev character device
    Spi {
        /// Device path, e.g. `/dev/spidev0.0`
        device: String,
    },
    /// UART via the `serialport` crate
    Serial {
        /// Device path, e.g. `/dev/ttyAMA0`
        device: String,
        /// Baud rate
        baud_rate: u32,
    },
}

impl TransportKind {
    /// Device path of the configured transport
    pub fn device(&self) -> &str {
        match self {
            TransportKind::Spi { device } => device,
            TransportKind::Serial { device, .. } => device,
        }
    }
}

/// SPI bus parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiConfig {
    /// Clock rate in Hz
    pub speed_hz: u32,
    /// Word size; the framing assumes 8
    pub bits_per_word: u8,
    /// SPI mode 0..=3 (CPOL/CPHA)
    pub mode: u8,
}

impl Default for SpiConfig {
    fn default() -> Self {
        SpiConfig {
            speed_hz: super::DEFAULT_SPI_SPEED_HZ,
            bits_per_word: 8,
            mode: 0,
        }
    }
}

/// Configuration for a pothole link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Transport selection
    pub transport: TransportKind,
    /// SPI parameters (ignored for serial transports)
    pub spi: SpiConfig,
    /// Bounded wait per listener poll
    #[serde(serialize_with = "super::serde::serialize_duration_ms")]
    #[serde(deserialize_with = "super::serde::deserialize_duration_ms")]
    pub poll_interval: Duration,
    /// Consecutive read failures tolerated before the listener gives up
    pub max_consecutive_read_errors: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            transport: TransportKind::Spi {
                device: super::DEFAULT_SPI_DEVICE.to_string(),
            },
            spi: SpiConfig::default(),
            poll_interval: Duration::from_millis(super::DEFAULT_POLL_INTERVAL_MS),
            max_consecutive_read_errors: 10,
        }
    }
}

impl LinkConfig {
    /// Parses a configuration from JSON and validates it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: LinkConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file and validates it
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.transport.device().is_empty() {
            return Err(Error::config("Device path is empty"));
        }

        if self.poll_interval < Duration::from_millis(1) {
            return Err(Error::config("Poll interval too small"));
        }
        if self.poll_interval > Duration::from_secs(10) {
            return Err(Error::config("Poll interval too large"));
        }

        if self.max_consecutive_read_errors == 0 {
            return Err(Error::config("max_consecutive_read_errors must be at least 1"));
        }

        match &self.transport {
            TransportKind::Spi { .. } => {
                if self.spi.bits_per_word != 8 {
                    return Err(Error::config(format!(
                        "Unsupported word size {}, framing needs 8-bit words",
                        self.spi.bits_per_word
                    )));
                }
                if self.spi.mode > 3 {
                    return Err(Error::config(format!("Invalid SPI mode {}", self.spi.mode)));
                }
                if self.spi.speed_hz == 0 {
                    return Err(Error::config("SPI speed must be non-zero"));
                }
            }
            TransportKind::Serial { baud_rate, .. } => {
                if *baud_rate == 0 {
                    return Err(Error::config("Baud rate must be non-zero"));
                }
            }
        }

        Ok(())
    }
}
